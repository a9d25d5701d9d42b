//! Units with a fixed behavior and no options.

use crate::handler::{RemoveHeader, SetHeader};
use axum::http::{
    HeaderName, HeaderValue,
    header::{X_CONTENT_TYPE_OPTIONS, X_XSS_PROTECTION},
};

/// Options object accepted for backwards compatibility by units that no
/// longer take options. Its content is ignored.
pub type LegacyOptions = serde_json::Map<String, serde_json::Value>;

/// `X-Content-Type-Options: nosniff`
pub fn build_x_content_type_options() -> SetHeader {
    SetHeader::new(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"))
}

/// `X-Download-Options: noopen`
pub fn build_x_download_options() -> SetHeader {
    SetHeader::new(
        HeaderName::from_static("x-download-options"),
        HeaderValue::from_static("noopen"),
    )
}

/// `X-XSS-Protection: 0`, disabling the buggy legacy XSS auditor
pub fn build_x_xss_protection() -> SetHeader {
    SetHeader::new(X_XSS_PROTECTION, HeaderValue::from_static("0"))
}

/// `Origin-Agent-Cluster: ?1`
pub fn build_origin_agent_cluster() -> SetHeader {
    SetHeader::new(
        HeaderName::from_static("origin-agent-cluster"),
        HeaderValue::from_static("?1"),
    )
}

/// Removes `X-Powered-By`
pub fn build_x_powered_by() -> RemoveHeader {
    RemoveHeader::new(HeaderName::from_static("x-powered-by"))
}
