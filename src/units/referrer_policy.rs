use crate::error::{HelmetError, Result};
use crate::handler::SetHeader;
use axum::http::header::REFERRER_POLICY;
use serde::Deserialize;
use std::collections::HashSet;

const UNIT: &str = "Referrer-Policy";

const ALLOWED_TOKENS: [&str; 9] = [
    "no-referrer",
    "no-referrer-when-downgrade",
    "same-origin",
    "origin",
    "strict-origin",
    "origin-when-cross-origin",
    "strict-origin-when-cross-origin",
    "unsafe-url",
    "",
];

/// One policy token, or an ordered fallback list of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PolicyTokens {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for PolicyTokens {
    fn from(token: &str) -> Self {
        Self::One(token.to_string())
    }
}

impl From<Vec<&str>> for PolicyTokens {
    fn from(tokens: Vec<&str>) -> Self {
        Self::Many(tokens.into_iter().map(str::to_string).collect())
    }
}

/// Referrer-Policy options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReferrerPolicyConfig {
    /// Defaults to `no-referrer`
    #[serde(default)]
    pub policy: Option<PolicyTokens>,
}

impl ReferrerPolicyConfig {
    pub fn new(policy: impl Into<PolicyTokens>) -> Self {
        Self {
            policy: Some(policy.into()),
        }
    }
}

/// Build the Referrer-Policy unit
pub fn build_referrer_policy(config: &ReferrerPolicyConfig) -> Result<SetHeader> {
    let tokens: Vec<&str> = match config.policy {
        None => vec!["no-referrer"],
        Some(PolicyTokens::One(ref token)) => vec![token.as_str()],
        Some(PolicyTokens::Many(ref tokens)) => tokens.iter().map(String::as_str).collect(),
    };

    if tokens.is_empty() {
        return Err(HelmetError::invalid_option(UNIT, "Referrer-Policy received no policy tokens"));
    }

    let mut seen = HashSet::new();
    for token in &tokens {
        if !ALLOWED_TOKENS.contains(token) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!("Referrer-Policy received an unexpected policy token {:?}", token),
            ));
        }
        if !seen.insert(*token) {
            return Err(HelmetError::invalid_option(
                UNIT,
                format!("Referrer-Policy received a duplicate policy token {:?}", token),
            ));
        }
    }

    SetHeader::from_string(UNIT, REFERRER_POLICY, tokens.join(","))
}
