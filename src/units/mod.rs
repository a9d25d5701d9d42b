//! Header units.
//!
//! Each unit validates its own options once, computes a header value and
//! returns a handler that sets (or removes) that header on every response.

mod cross_origin;
mod expect_ct;
mod fixed;
mod permissions_policy;
mod referrer_policy;
mod removed;
mod strict_transport_security;
mod x_dns_prefetch_control;
mod x_frame_options;
mod x_permitted_cross_domain_policies;

pub use cross_origin::{
    CrossOriginEmbedderPolicyConfig, CrossOriginOpenerPolicyConfig, CrossOriginResourcePolicyConfig,
    build_cross_origin_embedder_policy, build_cross_origin_opener_policy,
    build_cross_origin_resource_policy,
};
pub use expect_ct::{ExpectCtConfig, ExpectCtConfigBuilder, build_expect_ct};
pub use fixed::{
    LegacyOptions, build_origin_agent_cluster, build_x_content_type_options,
    build_x_download_options, build_x_powered_by, build_x_xss_protection,
};
pub use permissions_policy::{Features, PermissionsPolicyConfig, build_permissions_policy};
pub use referrer_policy::{PolicyTokens, ReferrerPolicyConfig, build_referrer_policy};
pub use removed::RemovedUnit;
pub use strict_transport_security::{
    StrictTransportSecurityConfig, StrictTransportSecurityConfigBuilder,
    build_strict_transport_security,
};
pub use x_dns_prefetch_control::{XDnsPrefetchControlConfig, build_x_dns_prefetch_control};
pub use x_frame_options::{XFrameOptionsConfig, build_x_frame_options};
pub use x_permitted_cross_domain_policies::{
    XPermittedCrossDomainPoliciesConfig, build_x_permitted_cross_domain_policies,
};

use crate::error::{HelmetError, Result};

/// Floors a `maxAge` option, rejecting negative and non-finite values.
pub(crate) fn parse_max_age(unit: &'static str, value: f64) -> Result<u64> {
    if value >= 0.0 && value.is_finite() {
        Ok(value.floor() as u64)
    } else {
        Err(HelmetError::invalid_option(
            unit,
            format!(
                "{}: {} is not a valid value for maxAge. Please choose a positive integer.",
                unit, value
            ),
        ))
    }
}

/// Checks `value` against a closed set of header tokens.
pub(crate) fn one_of<'a>(
    unit: &'static str,
    allowed: &[&'static str],
    value: &'a str,
    describe: impl FnOnce(&str) -> String,
) -> Result<&'a str> {
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(HelmetError::invalid_option(unit, describe(value)))
    }
}
