use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for hardhat
///
/// Everything except [`HelmetError::InvalidDynamicValue`] and
/// [`HelmetError::ChainHalted`] is raised while a unit or a stack is being
/// built. Those two only occur while a request is flowing through a chain.
#[derive(Debug, thiserror::Error)]
pub enum HelmetError {
    /// A unit rejected its options. The message names the unit and the offending value.
    #[error("{message}")]
    InvalidOption {
        unit: &'static str,
        message: String,
    },

    #[error(
        "hardhat no longer supports `true` for `{unit}`. Remove the property to use the default, or pass an options object"
    )]
    LegacyTrue { unit: &'static str },

    #[error("`{unit}` was removed: {guidance}")]
    RemovedUnit {
        unit: &'static str,
        guidance: &'static str,
    },

    #[error(
        "It appears a request was passed where the security header configuration belongs. Build the stack once with `HelmetConfig::from_value(config)` and reuse the resulting handler for every request"
    )]
    RequestAsConfig,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Content-Security-Policy received an invalid directive value for {directive:?}: {value:?}")]
    InvalidDynamicValue { directive: String, value: String },

    #[error("security header chain stopped before reaching the downstream service")]
    ChainHalted,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl HelmetError {
    pub fn invalid_option(unit: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            unit,
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns true for errors that can only happen while serving a request.
    pub fn is_request_time(&self) -> bool {
        matches!(self, Self::InvalidDynamicValue { .. } | Self::ChainHalted)
    }
}

impl IntoResponse for HelmetError {
    fn into_response(self) -> Response {
        // Full detail stays in the server logs (CWE-209)
        tracing::error!(error = %self, "security header chain failed");

        let body = Json(ErrorResponse {
            error: "Internal server error".to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Result type alias for hardhat builders and handlers
pub type Result<T> = std::result::Result<T, HelmetError>;

impl From<serde_json::Error> for HelmetError {
    fn from(err: serde_json::Error) -> Self {
        HelmetError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_displays_message_only() {
        let err = HelmetError::invalid_option("X-Frame-Options", "X-Frame-Options received an invalid action \"NOPE\"");
        assert_eq!(err.to_string(), "X-Frame-Options received an invalid action \"NOPE\"");
    }

    #[test]
    fn test_legacy_true_names_the_unit() {
        let err = HelmetError::LegacyTrue { unit: "xFrameOptions" };
        let message = err.to_string();
        assert!(message.contains("no longer supports `true`"));
        assert!(message.contains("xFrameOptions"));
    }

    #[test]
    fn test_request_time_classification() {
        assert!(HelmetError::ChainHalted.is_request_time());
        assert!(
            HelmetError::InvalidDynamicValue {
                directive: "script-src".to_string(),
                value: "'self';".to_string(),
            }
            .is_request_time()
        );
        assert!(!HelmetError::RequestAsConfig.is_request_time());
    }

    #[test]
    fn test_into_response_hides_details() {
        let response = HelmetError::InvalidDynamicValue {
            directive: "script-src".to_string(),
            value: "'self';".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_anyhow_conversion() {
        fn custom_check() -> Result<()> {
            Err(anyhow::anyhow!("origin lookup failed"))?
        }
        let err = custom_check().unwrap_err();
        assert!(matches!(err, HelmetError::Anyhow(_)));
        assert_eq!(err.to_string(), "origin lookup failed");
    }
}
