use crate::error::{HelmetError, Result};
use crate::handler::SetHeader;
use axum::http::header::X_FRAME_OPTIONS;
use serde::Deserialize;

const UNIT: &str = "X-Frame-Options";

/// X-Frame-Options options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct XFrameOptionsConfig {
    /// `DENY`, `SAMEORIGIN` or `SAME-ORIGIN`, case-insensitive. Defaults to `SAMEORIGIN`.
    #[serde(default)]
    pub action: Option<String>,
}

impl XFrameOptionsConfig {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
        }
    }

    /// Don't allow framing at all
    pub fn deny() -> Self {
        Self::new("DENY")
    }

    /// Allow framing from the same origin
    pub fn same_origin() -> Self {
        Self::new("SAMEORIGIN")
    }
}

/// Build the X-Frame-Options unit
pub fn build_x_frame_options(config: &XFrameOptionsConfig) -> Result<SetHeader> {
    let action = config.action.as_deref().unwrap_or("SAMEORIGIN").to_uppercase();

    let value = match action.as_str() {
        "SAMEORIGIN" | "SAME-ORIGIN" => "SAMEORIGIN",
        "DENY" => "DENY",
        "ALLOW-FROM" => {
            return Err(HelmetError::invalid_option(
                UNIT,
                "X-Frame-Options no longer supports `ALLOW-FROM` due to poor browser support. Use the Content-Security-Policy `frame-ancestors` directive instead.",
            ));
        }
        _ => {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!(
                    "X-Frame-Options received an invalid action {:?}",
                    config.action.as_deref().unwrap_or_default()
                ),
            ));
        }
    };

    SetHeader::from_string(UNIT, X_FRAME_OPTIONS, value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_for(config: &XFrameOptionsConfig) -> String {
        build_x_frame_options(config).unwrap().value().to_str().unwrap().to_string()
    }

    #[test]
    fn test_default_action() {
        assert_eq!(header_for(&XFrameOptionsConfig::default()), "SAMEORIGIN");
        let config: XFrameOptionsConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(header_for(&config), "SAMEORIGIN");
    }

    #[test]
    fn test_actions_are_case_insensitive() {
        for action in ["deny", "DENY", "Deny"] {
            assert_eq!(header_for(&XFrameOptionsConfig::new(action)), "DENY");
        }
        for action in ["sameorigin", "SAMEORIGIN", "same-origin", "SAME-ORIGIN", "SameOrigin"] {
            assert_eq!(header_for(&XFrameOptionsConfig::new(action)), "SAMEORIGIN");
        }
        assert_eq!(header_for(&XFrameOptionsConfig::deny()), "DENY");
        assert_eq!(header_for(&XFrameOptionsConfig::same_origin()), "SAMEORIGIN");
    }

    #[test]
    fn test_allow_from_is_rejected() {
        for action in ["ALLOW-FROM", "allow-from"] {
            let err = build_x_frame_options(&XFrameOptionsConfig::new(action)).unwrap_err();
            assert!(err.to_string().contains("no longer supports `ALLOW-FROM`"));
        }
    }

    #[test]
    fn test_invalid_actions() {
        for action in ["", "garbage", "allow from", " DENY"] {
            let err = build_x_frame_options(&XFrameOptionsConfig::new(action)).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("X-Frame-Options received an invalid action {:?}", action)
            );
        }
    }

    #[test]
    fn test_non_string_action() {
        assert!(serde_json::from_value::<XFrameOptionsConfig>(json!({ "action": 123 })).is_err());
    }
}
