//! Unit registry: which units exist, the order they run in, and how each is
//! resolved from a [`HelmetConfig`].

use super::config::{HelmetConfig, UnitSetting};
use crate::csp::build_content_security_policy;
use crate::error::{HelmetError, Result};
use crate::handler::Handler;
use crate::units::{
    LegacyOptions, RemovedUnit, build_cross_origin_embedder_policy, build_cross_origin_opener_policy,
    build_cross_origin_resource_policy, build_expect_ct, build_origin_agent_cluster,
    build_permissions_policy, build_referrer_policy, build_strict_transport_security,
    build_x_content_type_options, build_x_dns_prefetch_control, build_x_download_options,
    build_x_frame_options, build_x_permitted_cross_domain_policies, build_x_powered_by,
    build_x_xss_protection,
};
use std::fmt;

/// Identifies a unit in configuration, logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitName {
    ContentSecurityPolicy,
    CrossOriginEmbedderPolicy,
    CrossOriginOpenerPolicy,
    CrossOriginResourcePolicy,
    ExpectCt,
    OriginAgentCluster,
    PermissionsPolicy,
    ReferrerPolicy,
    StrictTransportSecurity,
    XContentTypeOptions,
    XDnsPrefetchControl,
    XDownloadOptions,
    XFrameOptions,
    XPermittedCrossDomainPolicies,
    XPoweredBy,
    XXssProtection,
    FeaturePolicy,
    Hpkp,
    NoCache,
}

impl UnitName {
    /// Every unit, in registry order
    pub const ALL: [UnitName; 19] = [
        Self::ContentSecurityPolicy,
        Self::CrossOriginEmbedderPolicy,
        Self::CrossOriginOpenerPolicy,
        Self::CrossOriginResourcePolicy,
        Self::ExpectCt,
        Self::OriginAgentCluster,
        Self::PermissionsPolicy,
        Self::ReferrerPolicy,
        Self::StrictTransportSecurity,
        Self::XContentTypeOptions,
        Self::XDnsPrefetchControl,
        Self::XDownloadOptions,
        Self::XFrameOptions,
        Self::XPermittedCrossDomainPolicies,
        Self::XPoweredBy,
        Self::XXssProtection,
        Self::FeaturePolicy,
        Self::Hpkp,
        Self::NoCache,
    ];

    /// Configuration key
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContentSecurityPolicy => "contentSecurityPolicy",
            Self::CrossOriginEmbedderPolicy => "crossOriginEmbedderPolicy",
            Self::CrossOriginOpenerPolicy => "crossOriginOpenerPolicy",
            Self::CrossOriginResourcePolicy => "crossOriginResourcePolicy",
            Self::ExpectCt => "expectCt",
            Self::OriginAgentCluster => "originAgentCluster",
            Self::PermissionsPolicy => "permissionsPolicy",
            Self::ReferrerPolicy => "referrerPolicy",
            Self::StrictTransportSecurity => "strictTransportSecurity",
            Self::XContentTypeOptions => "xContentTypeOptions",
            Self::XDnsPrefetchControl => "xDnsPrefetchControl",
            Self::XDownloadOptions => "xDownloadOptions",
            Self::XFrameOptions => "xFrameOptions",
            Self::XPermittedCrossDomainPolicies => "xPermittedCrossDomainPolicies",
            Self::XPoweredBy => "xPoweredBy",
            Self::XXssProtection => "xXssProtection",
            Self::FeaturePolicy => "featurePolicy",
            Self::Hpkp => "hpkp",
            Self::NoCache => "noCache",
        }
    }

    /// Environment variable stem, e.g. `X_FRAME_OPTIONS`
    pub fn env_key(self) -> String {
        let mut key = String::new();
        for c in self.as_str().chars() {
            if c.is_ascii_uppercase() {
                key.push('_');
            }
            key.push(c.to_ascii_uppercase());
        }
        key
    }

    /// Whether the unit runs when its setting is absent
    pub const fn default_enabled(self) -> bool {
        !matches!(
            self,
            Self::ContentSecurityPolicy
                | Self::ExpectCt
                | Self::PermissionsPolicy
                | Self::FeaturePolicy
                | Self::Hpkp
                | Self::NoCache
        )
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves one unit's setting. The flag says whether an absent setting
/// includes the unit.
pub type BuildFn = fn(&HelmetConfig, bool) -> Result<Option<Box<dyn Handler>>>;

/// One registry entry
#[derive(Clone, Copy)]
pub struct UnitDescriptor {
    pub name: UnitName,
    pub default_enabled: bool,
    pub build: BuildFn,
}

impl UnitDescriptor {
    pub fn resolve(&self, config: &HelmetConfig) -> Result<Option<Box<dyn Handler>>> {
        (self.build)(config, self.default_enabled)
    }
}

impl fmt::Debug for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDescriptor")
            .field("name", &self.name)
            .field("default_enabled", &self.default_enabled)
            .finish_non_exhaustive()
    }
}

fn include<T, H, F>(
    name: UnitName,
    default_enabled: bool,
    setting: &UnitSetting<T>,
    build: F,
) -> Result<Option<Box<dyn Handler>>>
where
    T: Default,
    H: Handler + 'static,
    F: FnOnce(&T) -> Result<H>,
{
    let handler = match setting {
        UnitSetting::Disabled => return Ok(None),
        UnitSetting::LegacyTrue => return Err(HelmetError::LegacyTrue { unit: name.as_str() }),
        UnitSetting::Enabled(options) => build(options)?,
        UnitSetting::Default if default_enabled => build(&T::default())?,
        UnitSetting::Default => return Ok(None),
    };
    Ok(Some(Box::new(handler)))
}

/// Units whose behavior is fixed still accept an options object, with a warning.
fn include_fixed<H>(
    name: UnitName,
    default_enabled: bool,
    setting: &UnitSetting<LegacyOptions>,
    build: fn() -> H,
) -> Result<Option<Box<dyn Handler>>>
where
    H: Handler + 'static,
{
    if let UnitSetting::Enabled(_) = setting {
        tracing::warn!(
            unit = name.as_str(),
            "{} does not take options. Remove the property to silence this warning",
            name
        );
    }
    include(name, default_enabled, setting, |_| Ok(build()))
}

fn include_removed(
    unit: RemovedUnit,
    setting: &UnitSetting<LegacyOptions>,
) -> Result<Option<Box<dyn Handler>>> {
    match setting {
        UnitSetting::Default | UnitSetting::Disabled => Ok(None),
        UnitSetting::Enabled(_) | UnitSetting::LegacyTrue => unit.build().map(Some),
    }
}

macro_rules! unit {
    ($name:ident, $field:ident, $build:path) => {
        UnitDescriptor {
            name: UnitName::$name,
            default_enabled: UnitName::$name.default_enabled(),
            build: |config, default_enabled| {
                include(UnitName::$name, default_enabled, &config.$field, $build)
            },
        }
    };
    (fixed $name:ident, $field:ident, $build:path) => {
        UnitDescriptor {
            name: UnitName::$name,
            default_enabled: UnitName::$name.default_enabled(),
            build: |config, default_enabled| {
                include_fixed(UnitName::$name, default_enabled, &config.$field, $build)
            },
        }
    };
    (removed $name:ident, $field:ident) => {
        UnitDescriptor {
            name: UnitName::$name,
            default_enabled: false,
            build: |config, _| include_removed(RemovedUnit::$name, &config.$field),
        }
    };
}

/// Every unit, in the order they run
pub static REGISTRY: [UnitDescriptor; 19] = [
    unit!(ContentSecurityPolicy, content_security_policy, build_content_security_policy),
    unit!(CrossOriginEmbedderPolicy, cross_origin_embedder_policy, build_cross_origin_embedder_policy),
    unit!(CrossOriginOpenerPolicy, cross_origin_opener_policy, build_cross_origin_opener_policy),
    unit!(CrossOriginResourcePolicy, cross_origin_resource_policy, build_cross_origin_resource_policy),
    unit!(ExpectCt, expect_ct, build_expect_ct),
    unit!(fixed OriginAgentCluster, origin_agent_cluster, build_origin_agent_cluster),
    unit!(PermissionsPolicy, permissions_policy, build_permissions_policy),
    unit!(ReferrerPolicy, referrer_policy, build_referrer_policy),
    unit!(StrictTransportSecurity, strict_transport_security, build_strict_transport_security),
    unit!(fixed XContentTypeOptions, x_content_type_options, build_x_content_type_options),
    unit!(XDnsPrefetchControl, x_dns_prefetch_control, build_x_dns_prefetch_control),
    unit!(fixed XDownloadOptions, x_download_options, build_x_download_options),
    unit!(XFrameOptions, x_frame_options, build_x_frame_options),
    unit!(XPermittedCrossDomainPolicies, x_permitted_cross_domain_policies, build_x_permitted_cross_domain_policies),
    unit!(fixed XPoweredBy, x_powered_by, build_x_powered_by),
    unit!(fixed XXssProtection, x_xss_protection, build_x_xss_protection),
    unit!(removed FeaturePolicy, feature_policy),
    unit!(removed Hpkp, hpkp),
    unit!(removed NoCache, no_cache),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_unit_names() {
        let names: Vec<UnitName> = REGISTRY.iter().map(|descriptor| descriptor.name).collect();
        assert_eq!(names, UnitName::ALL.to_vec());
    }

    #[test]
    fn test_default_off_units() {
        let off: Vec<&str> = REGISTRY
            .iter()
            .filter(|descriptor| !descriptor.default_enabled)
            .map(|descriptor| descriptor.name.as_str())
            .collect();
        assert_eq!(
            off,
            vec!["contentSecurityPolicy", "expectCt", "permissionsPolicy", "featurePolicy", "hpkp", "noCache"]
        );
    }

    #[test]
    fn test_env_keys() {
        assert_eq!(UnitName::XFrameOptions.env_key(), "X_FRAME_OPTIONS");
        assert_eq!(UnitName::ContentSecurityPolicy.env_key(), "CONTENT_SECURITY_POLICY");
        assert_eq!(UnitName::XXssProtection.env_key(), "X_XSS_PROTECTION");
        assert_eq!(UnitName::Hpkp.env_key(), "HPKP");
    }

    #[test]
    fn test_resolution_rules() {
        let descriptor = &REGISTRY[12];
        assert_eq!(descriptor.name, UnitName::XFrameOptions);

        let config = HelmetConfig::default();
        assert!(descriptor.resolve(&config).unwrap().is_some());

        let config = HelmetConfig::builder().disable(UnitName::XFrameOptions).build();
        assert!(descriptor.resolve(&config).unwrap().is_none());

        let config = HelmetConfig {
            x_frame_options: UnitSetting::LegacyTrue,
            ..Default::default()
        };
        let err = descriptor.resolve(&config).err().unwrap();
        assert!(matches!(err, HelmetError::LegacyTrue { unit: "xFrameOptions" }));
    }

    #[test]
    fn test_default_off_unit_needs_options() {
        let descriptor = &REGISTRY[4];
        assert_eq!(descriptor.name, UnitName::ExpectCt);
        assert!(descriptor.resolve(&HelmetConfig::default()).unwrap().is_none());

        let config = HelmetConfig::builder().enable(UnitName::ExpectCt).build();
        assert!(descriptor.resolve(&config).unwrap().is_some());
    }

    #[test]
    fn test_removed_units_fail_when_configured() {
        let descriptor = &REGISTRY[17];
        assert_eq!(descriptor.name, UnitName::Hpkp);
        assert!(descriptor.resolve(&HelmetConfig::default()).unwrap().is_none());

        for setting in [UnitSetting::LegacyTrue, UnitSetting::Enabled(LegacyOptions::new())] {
            let config = HelmetConfig {
                hpkp: setting,
                ..Default::default()
            };
            let err = descriptor.resolve(&config).err().unwrap();
            assert!(matches!(err, HelmetError::RemovedUnit { unit: "hpkp", .. }));
        }
    }

    #[test]
    fn test_fixed_units_accept_legacy_options() {
        let descriptor = &REGISTRY[9];
        assert_eq!(descriptor.name, UnitName::XContentTypeOptions);

        let mut options = LegacyOptions::new();
        options.insert("foo".to_string(), serde_json::Value::Bool(true));
        let config = HelmetConfig {
            x_content_type_options: UnitSetting::Enabled(options),
            ..Default::default()
        };
        assert!(descriptor.resolve(&config).unwrap().is_some());
    }
}
