use super::parse_max_age;
use crate::error::Result;
use crate::handler::SetHeader;
use axum::http::HeaderName;
use serde::Deserialize;

const UNIT: &str = "Expect-CT";

/// Expect-CT options. The header is deprecated, so the unit is opt-in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectCtConfig {
    /// Max age in seconds (default 0). Fractions are floored.
    #[serde(default)]
    pub max_age: Option<f64>,

    #[serde(default)]
    pub enforce: bool,

    #[serde(default)]
    pub report_uri: Option<String>,
}

impl ExpectCtConfig {
    pub fn builder() -> ExpectCtConfigBuilder {
        ExpectCtConfigBuilder::new()
    }
}

/// Builder for ExpectCtConfig
#[must_use = "builder does nothing until you call build()"]
pub struct ExpectCtConfigBuilder {
    config: ExpectCtConfig,
}

impl ExpectCtConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ExpectCtConfig::default(),
        }
    }

    pub fn max_age(mut self, seconds: impl Into<f64>) -> Self {
        self.config.max_age = Some(seconds.into());
        self
    }

    pub fn enforce(mut self, enforce: bool) -> Self {
        self.config.enforce = enforce;
        self
    }

    pub fn report_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.report_uri = Some(uri.into());
        self
    }

    pub fn build(self) -> ExpectCtConfig {
        self.config
    }
}

impl Default for ExpectCtConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the Expect-CT unit
pub fn build_expect_ct(config: &ExpectCtConfig) -> Result<SetHeader> {
    let max_age = parse_max_age(UNIT, config.max_age.unwrap_or(0.0))?;

    let mut parts = vec![format!("max-age={}", max_age)];
    if config.enforce {
        parts.push("enforce".to_string());
    }
    if let Some(ref uri) = config.report_uri {
        parts.push(format!("report-uri=\"{}\"", uri));
    }

    SetHeader::from_string(UNIT, HeaderName::from_static("expect-ct"), parts.join(", "))
}
