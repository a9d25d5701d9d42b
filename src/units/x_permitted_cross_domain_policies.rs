use super::one_of;
use crate::error::Result;
use crate::handler::SetHeader;
use axum::http::HeaderName;
use serde::Deserialize;

const UNIT: &str = "X-Permitted-Cross-Domain-Policies";

const PERMITTED_POLICIES: [&str; 4] = ["none", "master-only", "by-content-type", "all"];

/// X-Permitted-Cross-Domain-Policies options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XPermittedCrossDomainPoliciesConfig {
    /// Defaults to `none`
    #[serde(default)]
    pub permitted_policies: Option<String>,
}

impl XPermittedCrossDomainPoliciesConfig {
    pub fn new(permitted_policies: impl Into<String>) -> Self {
        Self {
            permitted_policies: Some(permitted_policies.into()),
        }
    }
}

/// Build the X-Permitted-Cross-Domain-Policies unit
pub fn build_x_permitted_cross_domain_policies(
    config: &XPermittedCrossDomainPoliciesConfig,
) -> Result<SetHeader> {
    let policy = config.permitted_policies.as_deref().unwrap_or("none");
    let policy = one_of(UNIT, &PERMITTED_POLICIES, policy, |policy| {
        format!("X-Permitted-Cross-Domain-Policies does not support {:?}", policy)
    })?;

    SetHeader::from_string(
        UNIT,
        HeaderName::from_static("x-permitted-cross-domain-policies"),
        policy.to_string(),
    )
}
