use super::parse_max_age;
use crate::error::{HelmetError, Result};
use crate::handler::SetHeader;
use axum::http::header::STRICT_TRANSPORT_SECURITY;
use serde::Deserialize;

const UNIT: &str = "Strict-Transport-Security";

/// 180 days
const DEFAULT_MAX_AGE: f64 = 180.0 * 24.0 * 60.0 * 60.0;

/// Strict-Transport-Security (HSTS) options
///
/// Absent fields fall back to `max-age=15552000; includeSubDomains`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawStrictTransportSecurityConfig")]
pub struct StrictTransportSecurityConfig {
    /// Max age in seconds. Fractions are floored.
    pub max_age: Option<f64>,

    /// Append `includeSubDomains` (default true)
    pub include_sub_domains: Option<bool>,

    /// Append `preload` (default false)
    pub preload: Option<bool>,
}

/// Wire shape, including the historical spellings that are rejected
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStrictTransportSecurityConfig {
    max_age: Option<f64>,
    include_sub_domains: Option<bool>,
    preload: Option<bool>,
    #[serde(rename = "maxage")]
    lowercase_max_age: Option<serde_json::Value>,
    #[serde(rename = "includeSubdomains")]
    lowercase_include_sub_domains: Option<serde_json::Value>,
    set_if: Option<serde_json::Value>,
}

impl TryFrom<RawStrictTransportSecurityConfig> for StrictTransportSecurityConfig {
    type Error = HelmetError;

    fn try_from(raw: RawStrictTransportSecurityConfig) -> Result<Self> {
        if raw.lowercase_max_age.is_some() {
            return Err(HelmetError::invalid_option(
                UNIT,
                "Strict-Transport-Security received an unsupported property, `maxage`. Did you mean to pass `maxAge`?",
            ));
        }
        if raw.lowercase_include_sub_domains.is_some() {
            return Err(HelmetError::invalid_option(
                UNIT,
                "Strict-Transport-Security middleware should use `includeSubDomains` instead of `includeSubdomains`. (The correct one has an uppercase \"D\".)",
            ));
        }
        if raw.set_if.is_some() {
            return Err(HelmetError::invalid_option(
                UNIT,
                "Strict-Transport-Security middleware no longer supports the `setIf` parameter. Wrap the handler in your own condition instead.",
            ));
        }
        Ok(Self {
            max_age: raw.max_age,
            include_sub_domains: raw.include_sub_domains,
            preload: raw.preload,
        })
    }
}

impl StrictTransportSecurityConfig {
    pub fn builder() -> StrictTransportSecurityConfigBuilder {
        StrictTransportSecurityConfigBuilder::new()
    }
}

/// Builder for StrictTransportSecurityConfig
#[must_use = "builder does nothing until you call build()"]
pub struct StrictTransportSecurityConfigBuilder {
    config: StrictTransportSecurityConfig,
}

impl StrictTransportSecurityConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StrictTransportSecurityConfig::default(),
        }
    }

    pub fn max_age(mut self, seconds: impl Into<f64>) -> Self {
        self.config.max_age = Some(seconds.into());
        self
    }

    pub fn include_sub_domains(mut self, include: bool) -> Self {
        self.config.include_sub_domains = Some(include);
        self
    }

    pub fn preload(mut self, preload: bool) -> Self {
        self.config.preload = Some(preload);
        self
    }

    pub fn build(self) -> StrictTransportSecurityConfig {
        self.config
    }
}

impl Default for StrictTransportSecurityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the Strict-Transport-Security unit
pub fn build_strict_transport_security(config: &StrictTransportSecurityConfig) -> Result<SetHeader> {
    let max_age = parse_max_age(UNIT, config.max_age.unwrap_or(DEFAULT_MAX_AGE))?;

    let mut value = format!("max-age={}", max_age);
    if config.include_sub_domains.unwrap_or(true) {
        value.push_str("; includeSubDomains");
    }
    if config.preload.unwrap_or(false) {
        value.push_str("; preload");
    }

    SetHeader::from_string(UNIT, STRICT_TRANSPORT_SECURITY, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_for(config: StrictTransportSecurityConfig) -> String {
        build_strict_transport_security(&config)
            .unwrap()
            .value()
            .to_str()
            .unwrap()
            .to_string()
    }

    fn from_json(value: serde_json::Value) -> std::result::Result<StrictTransportSecurityConfig, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_default_header() {
        assert_eq!(
            header_for(StrictTransportSecurityConfig::default()),
            "max-age=15552000; includeSubDomains"
        );
        assert_eq!(
            header_for(from_json(json!({})).unwrap()),
            "max-age=15552000; includeSubDomains"
        );
    }

    #[test]
    fn test_max_age_is_floored() {
        let config = StrictTransportSecurityConfig::builder().max_age(123.5).build();
        assert_eq!(header_for(config), "max-age=123; includeSubDomains");
    }

    #[test]
    fn test_all_directives() {
        let config = StrictTransportSecurityConfig::builder()
            .max_age(31536000)
            .include_sub_domains(true)
            .preload(true)
            .build();
        assert_eq!(header_for(config), "max-age=31536000; includeSubDomains; preload");

        let config = StrictTransportSecurityConfig::builder()
            .max_age(0)
            .include_sub_domains(false)
            .build();
        assert_eq!(header_for(config), "max-age=0");
    }

    #[test]
    fn test_invalid_max_age() {
        for max_age in [-1.0, f64::NAN, f64::INFINITY] {
            let config = StrictTransportSecurityConfig::builder().max_age(max_age).build();
            assert!(build_strict_transport_security(&config).is_err());
        }
        let err = build_strict_transport_security(&StrictTransportSecurityConfig::builder().max_age(-1).build())
            .unwrap_err();
        assert!(err.to_string().contains("-1 is not a valid value for maxAge"));
    }

    #[test]
    fn test_non_numeric_max_age() {
        let err = from_json(json!({ "maxAge": "1234" })).unwrap_err();
        assert!(err.to_string().contains("1234"));
    }

    #[test]
    fn test_misspelled_properties() {
        let err = from_json(json!({ "maxage": 10 })).unwrap_err();
        assert!(err.to_string().contains("Did you mean to pass `maxAge`?"));

        let err = from_json(json!({ "includeSubdomains": true })).unwrap_err();
        assert!(err.to_string().contains("instead of `includeSubdomains`"));

        let err = from_json(json!({ "setIf": {} })).unwrap_err();
        assert!(err.to_string().contains("`setIf`"));
    }
}
