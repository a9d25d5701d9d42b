//! Cross-Origin-Embedder-Policy, Cross-Origin-Opener-Policy and
//! Cross-Origin-Resource-Policy. All three take a single `policy` from a
//! small closed set.

use super::one_of;
use crate::error::Result;
use crate::handler::SetHeader;
use axum::http::HeaderName;
use serde::Deserialize;

const COEP: &str = "Cross-Origin-Embedder-Policy";
const COOP: &str = "Cross-Origin-Opener-Policy";
const CORP: &str = "Cross-Origin-Resource-Policy";

const COEP_POLICIES: [&str; 2] = ["require-corp", "credentialless"];
const COOP_POLICIES: [&str; 3] = ["same-origin", "same-origin-allow-popups", "unsafe-none"];
const CORP_POLICIES: [&str; 3] = ["same-origin", "same-site", "cross-origin"];

/// Cross-Origin-Embedder-Policy options (default `require-corp`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrossOriginEmbedderPolicyConfig {
    #[serde(default)]
    pub policy: Option<String>,
}

/// Cross-Origin-Opener-Policy options (default `same-origin`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrossOriginOpenerPolicyConfig {
    #[serde(default)]
    pub policy: Option<String>,
}

/// Cross-Origin-Resource-Policy options (default `same-origin`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrossOriginResourcePolicyConfig {
    #[serde(default)]
    pub policy: Option<String>,
}

macro_rules! policy_constructor {
    ($config:ident) => {
        impl $config {
            pub fn new(policy: impl Into<String>) -> Self {
                Self {
                    policy: Some(policy.into()),
                }
            }
        }
    };
}

policy_constructor!(CrossOriginEmbedderPolicyConfig);
policy_constructor!(CrossOriginOpenerPolicyConfig);
policy_constructor!(CrossOriginResourcePolicyConfig);

fn build_policy_header(
    unit: &'static str,
    header: &'static str,
    allowed: &[&'static str],
    policy: &str,
) -> Result<SetHeader> {
    let policy = one_of(unit, allowed, policy, |policy| {
        format!("{} does not support the {:?} policy", unit, policy)
    })?;
    SetHeader::from_string(unit, HeaderName::from_static(header), policy.to_string())
}

/// Build the Cross-Origin-Embedder-Policy unit
pub fn build_cross_origin_embedder_policy(config: &CrossOriginEmbedderPolicyConfig) -> Result<SetHeader> {
    build_policy_header(
        COEP,
        "cross-origin-embedder-policy",
        &COEP_POLICIES,
        config.policy.as_deref().unwrap_or("require-corp"),
    )
}

/// Build the Cross-Origin-Opener-Policy unit
pub fn build_cross_origin_opener_policy(config: &CrossOriginOpenerPolicyConfig) -> Result<SetHeader> {
    build_policy_header(
        COOP,
        "cross-origin-opener-policy",
        &COOP_POLICIES,
        config.policy.as_deref().unwrap_or("same-origin"),
    )
}

/// Build the Cross-Origin-Resource-Policy unit
pub fn build_cross_origin_resource_policy(config: &CrossOriginResourcePolicyConfig) -> Result<SetHeader> {
    build_policy_header(
        CORP,
        "cross-origin-resource-policy",
        &CORP_POLICIES,
        config.policy.as_deref().unwrap_or("same-origin"),
    )
}
