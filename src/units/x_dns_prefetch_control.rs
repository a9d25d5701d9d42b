use crate::error::Result;
use crate::handler::SetHeader;
use axum::http::header::X_DNS_PREFETCH_CONTROL;
use serde::Deserialize;

const UNIT: &str = "X-DNS-Prefetch-Control";

/// X-DNS-Prefetch-Control options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct XDnsPrefetchControlConfig {
    /// `on` when true, `off` otherwise
    #[serde(default)]
    pub allow: bool,
}

/// Build the X-DNS-Prefetch-Control unit
pub fn build_x_dns_prefetch_control(config: &XDnsPrefetchControlConfig) -> Result<SetHeader> {
    let value = if config.allow { "on" } else { "off" };
    SetHeader::from_string(UNIT, X_DNS_PREFETCH_CONTROL, value.to_string())
}
