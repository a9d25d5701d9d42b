use crate::error::{HelmetError, Result};
use crate::handler::SetHeader;
use axum::http::HeaderName;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

const UNIT: &str = "Permissions-Policy";

/// Tokens written without quotes
const BARE_TOKENS: [&str; 3] = ["self", "src", "*"];

/// Ordered feature name -> allowlist pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(Vec<(String, Vec<String>)>);

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature<I, S>(mut self, name: impl Into<String>, allowlist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .push((name.into(), allowlist.into_iter().map(Into::into).collect()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(name, list)| (name.as_str(), list.as_slice()))
    }
}

impl<'de> Deserialize<'de> for Features {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FeaturesVisitor;

        impl<'de> Visitor<'de> for FeaturesVisitor {
            type Value = Features;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature names to allowlists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Features, A::Error> {
                let mut features = Vec::new();
                while let Some((name, allowlist)) = map.next_entry::<String, Vec<String>>()? {
                    features.push((name, allowlist));
                }
                Ok(Features(features))
            }
        }

        deserializer.deserialize_map(FeaturesVisitor)
    }
}

/// Permissions-Policy options. `features` is required and must not be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PermissionsPolicyConfig {
    #[serde(default)]
    pub features: Option<Features>,
}

impl PermissionsPolicyConfig {
    pub fn new(features: Features) -> Self {
        Self {
            features: Some(features),
        }
    }
}

fn is_valid_feature_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn render_allowlist(feature: &str, allowlist: &[String]) -> Result<String> {
    if allowlist.len() == 1 && allowlist[0] == "*" {
        return Ok(format!("{}=*", feature));
    }

    let mut tokens = Vec::with_capacity(allowlist.len());
    for token in allowlist {
        if BARE_TOKENS.contains(&token.as_str()) {
            tokens.push(token.clone());
        } else if token.is_empty() || token.contains(['"', '(', ')', ',']) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!(
                    "Permissions-Policy received an invalid allowlist value {:?} for {:?}",
                    token, feature
                ),
            ));
        } else {
            tokens.push(format!("\"{}\"", token));
        }
    }

    Ok(format!("{}=({})", feature, tokens.join(" ")))
}

/// Build the Permissions-Policy unit
pub fn build_permissions_policy(config: &PermissionsPolicyConfig) -> Result<SetHeader> {
    let features = match config.features {
        Some(ref features) if !features.is_empty() => features,
        _ => {
            return Err(HelmetError::invalid_option(
                UNIT,
                "Permissions-Policy requires at least one feature",
            ));
        }
    };

    let mut seen = HashSet::new();
    let mut directives = Vec::new();
    for (name, allowlist) in features.iter() {
        if !is_valid_feature_name(name) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!("Permissions-Policy received an invalid feature name {:?}", name),
            ));
        }
        if !seen.insert(name) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!("Permissions-Policy received a duplicate feature {:?}", name),
            ));
        }
        directives.push(render_allowlist(name, allowlist)?);
    }

    SetHeader::from_string(
        UNIT,
        HeaderName::from_static("permissions-policy"),
        directives.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_for(config: &PermissionsPolicyConfig) -> String {
        build_permissions_policy(config).unwrap().value().to_str().unwrap().to_string()
    }

    #[test]
    fn test_quoting_rules() {
        let config: PermissionsPolicyConfig = serde_json::from_value(json!({
            "features": { "geolocation": ["self", "https://example.com"] }
        }))
        .unwrap();
        assert_eq!(header_for(&config), "geolocation=(self \"https://example.com\")");
    }

    #[test]
    fn test_empty_and_wildcard_allowlists() {
        let features = Features::new()
            .feature("camera", Vec::<String>::new())
            .feature("fullscreen", ["*"])
            .feature("payment", ["self", "src", "*"]);
        assert_eq!(
            header_for(&PermissionsPolicyConfig::new(features)),
            "camera=(), fullscreen=*, payment=(self src *)"
        );
    }

    #[test]
    fn test_feature_order_is_preserved() {
        let config: PermissionsPolicyConfig = serde_json::from_value(json!({
            "features": { "microphone": [], "camera": [], "autoplay": ["self"] }
        }))
        .unwrap();
        assert_eq!(header_for(&config), "microphone=(), camera=(), autoplay=(self)");
    }

    #[test]
    fn test_missing_or_empty_features() {
        let err = build_permissions_policy(&PermissionsPolicyConfig::default()).unwrap_err();
        assert!(err.to_string().contains("at least one feature"));

        let config: PermissionsPolicyConfig = serde_json::from_value(json!({ "features": {} })).unwrap();
        assert!(build_permissions_policy(&config).is_err());
    }

    #[test]
    fn test_invalid_feature_names_and_values() {
        let config = PermissionsPolicyConfig::new(Features::new().feature("geo location", ["self"]));
        assert!(
            build_permissions_policy(&config)
                .unwrap_err()
                .to_string()
                .contains("invalid feature name \"geo location\"")
        );

        let config = PermissionsPolicyConfig::new(Features::new().feature("camera", ["a\"b"]));
        assert!(build_permissions_policy(&config).is_err());

        let config = PermissionsPolicyConfig::new(
            Features::new().feature("camera", ["self"]).feature("camera", ["*"]),
        );
        assert!(
            build_permissions_policy(&config)
                .unwrap_err()
                .to_string()
                .contains("duplicate feature")
        );
    }

    #[test]
    fn test_allowlist_must_be_a_list() {
        let result = serde_json::from_value::<PermissionsPolicyConfig>(json!({
            "features": { "camera": "self" }
        }));
        assert!(result.is_err());
    }
}
