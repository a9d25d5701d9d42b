use super::registry::UnitName;
use crate::csp::ContentSecurityPolicyConfig;
use crate::error::{HelmetError, Result};
use crate::units::{
    CrossOriginEmbedderPolicyConfig, CrossOriginOpenerPolicyConfig, CrossOriginResourcePolicyConfig,
    ExpectCtConfig, LegacyOptions, PermissionsPolicyConfig, ReferrerPolicyConfig,
    StrictTransportSecurityConfig, XDnsPrefetchControlConfig, XFrameOptionsConfig,
    XPermittedCrossDomainPoliciesConfig,
};
use crate::utils::{get_env_with_prefix, get_prefixed_env};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// How one unit is configured
#[derive(Debug, Clone, PartialEq)]
pub enum UnitSetting<T> {
    /// Not mentioned. Default-on units run with default options.
    Default,
    /// `false`
    Disabled,
    /// An options object
    Enabled(T),
    /// `true`, which older releases accepted. Rejected when the stack is built.
    LegacyTrue,
}

impl<T> Default for UnitSetting<T> {
    fn default() -> Self {
        Self::Default
    }
}

impl<T: Default> UnitSetting<T> {
    fn toggle(&mut self, enabled: bool, default_enabled: bool) {
        if !enabled {
            *self = Self::Disabled;
        } else if !matches!(self, Self::Enabled(_)) {
            *self = if default_enabled {
                Self::Default
            } else {
                Self::Enabled(T::default())
            };
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for UnitSetting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::Default),
            Value::Bool(false) => Ok(Self::Disabled),
            Value::Bool(true) => Ok(Self::LegacyTrue),
            value @ Value::Object(_) => T::deserialize(value)
                .map(Self::Enabled)
                .map_err(D::Error::custom),
            other => {
                tracing::warn!(value = %other, "ignoring security header setting that is neither a boolean nor an object");
                Ok(Self::Default)
            }
        }
    }
}

/// Security header configuration
///
/// One field per unit. Keys are camelCase; the historical names (`hsts`,
/// `frameguard`, `noSniff`, ...) are accepted as aliases.
///
/// # Example
///
/// ```rust
/// use hardhat::{HelmetConfig, UnitName};
/// use hardhat::units::XFrameOptionsConfig;
///
/// let config = HelmetConfig::builder()
///     .x_frame_options(XFrameOptionsConfig::deny())
///     .disable(UnitName::StrictTransportSecurity)
///     .build();
///
/// let same = HelmetConfig::from_json_str(
///     r#"{ "frameguard": { "action": "DENY" }, "hsts": false }"#,
/// ).unwrap();
/// assert_eq!(config.x_frame_options, same.x_frame_options);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelmetConfig {
    pub content_security_policy: UnitSetting<ContentSecurityPolicyConfig>,
    pub cross_origin_embedder_policy: UnitSetting<CrossOriginEmbedderPolicyConfig>,
    pub cross_origin_opener_policy: UnitSetting<CrossOriginOpenerPolicyConfig>,
    pub cross_origin_resource_policy: UnitSetting<CrossOriginResourcePolicyConfig>,
    pub expect_ct: UnitSetting<ExpectCtConfig>,
    pub origin_agent_cluster: UnitSetting<LegacyOptions>,
    pub permissions_policy: UnitSetting<PermissionsPolicyConfig>,
    pub referrer_policy: UnitSetting<ReferrerPolicyConfig>,
    #[serde(alias = "hsts")]
    pub strict_transport_security: UnitSetting<StrictTransportSecurityConfig>,
    #[serde(alias = "noSniff")]
    pub x_content_type_options: UnitSetting<LegacyOptions>,
    #[serde(alias = "dnsPrefetchControl")]
    pub x_dns_prefetch_control: UnitSetting<XDnsPrefetchControlConfig>,
    #[serde(alias = "ieNoOpen")]
    pub x_download_options: UnitSetting<LegacyOptions>,
    #[serde(alias = "frameguard")]
    pub x_frame_options: UnitSetting<XFrameOptionsConfig>,
    #[serde(alias = "permittedCrossDomainPolicies")]
    pub x_permitted_cross_domain_policies: UnitSetting<XPermittedCrossDomainPoliciesConfig>,
    #[serde(alias = "hidePoweredBy")]
    pub x_powered_by: UnitSetting<LegacyOptions>,
    #[serde(alias = "xssFilter")]
    pub x_xss_protection: UnitSetting<LegacyOptions>,
    pub feature_policy: UnitSetting<LegacyOptions>,
    pub hpkp: UnitSetting<LegacyOptions>,
    pub no_cache: UnitSetting<LegacyOptions>,
}

impl HelmetConfig {
    /// Create a new HelmetConfig builder
    pub fn builder() -> HelmetConfigBuilder {
        HelmetConfigBuilder::new()
    }

    /// Parse configuration from a dynamic value.
    ///
    /// `null` yields the defaults. Anything shaped like an inbound request
    /// (`method`, `headers` and `uri` or `url`) is rejected, since that means
    /// the stack is being constructed per request instead of once.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(ref map)
                if map.contains_key("method")
                    && map.contains_key("headers")
                    && (map.contains_key("uri") || map.contains_key("url")) =>
            {
                Err(HelmetError::RequestAsConfig)
            }
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(HelmetError::invalid_config(format!(
                "security header configuration must be an object, got {}",
                other
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Load configuration from environment variables
    ///
    /// `HARDHAT_CONFIG` holds a JSON object; a bare `CONFIG` is never read.
    /// `HARDHAT_<UNIT>_ENABLED`
    /// (for example `HARDHAT_X_FRAME_OPTIONS_ENABLED=false`) then switches
    /// individual units on or off.
    pub fn from_env() -> Result<Self> {
        let mut config = match get_prefixed_env("CONFIG") {
            Some(json) => Self::from_json_str(&json)?,
            None => Self::default(),
        };

        for name in UnitName::ALL {
            let key = format!("{}_ENABLED", name.env_key());
            if let Some(enabled) = get_env_with_prefix(&key) {
                match enabled.parse::<bool>() {
                    Ok(enabled) => config.toggle(name, enabled),
                    Err(_) => tracing::warn!(key = %key, value = %enabled, "ignoring non-boolean unit toggle"),
                }
            }
        }

        Ok(config)
    }

    /// Switch a unit off, or on with its default options (keeping any options
    /// already given).
    pub fn toggle(&mut self, name: UnitName, enabled: bool) {
        let default_enabled = name.default_enabled();
        match name {
            UnitName::ContentSecurityPolicy => self.content_security_policy.toggle(enabled, default_enabled),
            UnitName::CrossOriginEmbedderPolicy => {
                self.cross_origin_embedder_policy.toggle(enabled, default_enabled)
            }
            UnitName::CrossOriginOpenerPolicy => self.cross_origin_opener_policy.toggle(enabled, default_enabled),
            UnitName::CrossOriginResourcePolicy => {
                self.cross_origin_resource_policy.toggle(enabled, default_enabled)
            }
            UnitName::ExpectCt => self.expect_ct.toggle(enabled, default_enabled),
            UnitName::OriginAgentCluster => self.origin_agent_cluster.toggle(enabled, default_enabled),
            UnitName::PermissionsPolicy => self.permissions_policy.toggle(enabled, default_enabled),
            UnitName::ReferrerPolicy => self.referrer_policy.toggle(enabled, default_enabled),
            UnitName::StrictTransportSecurity => self.strict_transport_security.toggle(enabled, default_enabled),
            UnitName::XContentTypeOptions => self.x_content_type_options.toggle(enabled, default_enabled),
            UnitName::XDnsPrefetchControl => self.x_dns_prefetch_control.toggle(enabled, default_enabled),
            UnitName::XDownloadOptions => self.x_download_options.toggle(enabled, default_enabled),
            UnitName::XFrameOptions => self.x_frame_options.toggle(enabled, default_enabled),
            UnitName::XPermittedCrossDomainPolicies => {
                self.x_permitted_cross_domain_policies.toggle(enabled, default_enabled)
            }
            UnitName::XPoweredBy => self.x_powered_by.toggle(enabled, default_enabled),
            UnitName::XXssProtection => self.x_xss_protection.toggle(enabled, default_enabled),
            UnitName::FeaturePolicy => self.feature_policy.toggle(enabled, default_enabled),
            UnitName::Hpkp => self.hpkp.toggle(enabled, default_enabled),
            UnitName::NoCache => self.no_cache.toggle(enabled, default_enabled),
        }
    }
}

/// Builder for HelmetConfig
#[must_use = "builder does nothing until you call build()"]
pub struct HelmetConfigBuilder {
    config: HelmetConfig,
}

impl HelmetConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HelmetConfig::default(),
        }
    }

    pub fn content_security_policy(mut self, config: ContentSecurityPolicyConfig) -> Self {
        self.config.content_security_policy = UnitSetting::Enabled(config);
        self
    }

    pub fn cross_origin_embedder_policy(mut self, config: CrossOriginEmbedderPolicyConfig) -> Self {
        self.config.cross_origin_embedder_policy = UnitSetting::Enabled(config);
        self
    }

    pub fn cross_origin_opener_policy(mut self, config: CrossOriginOpenerPolicyConfig) -> Self {
        self.config.cross_origin_opener_policy = UnitSetting::Enabled(config);
        self
    }

    pub fn cross_origin_resource_policy(mut self, config: CrossOriginResourcePolicyConfig) -> Self {
        self.config.cross_origin_resource_policy = UnitSetting::Enabled(config);
        self
    }

    pub fn expect_ct(mut self, config: ExpectCtConfig) -> Self {
        self.config.expect_ct = UnitSetting::Enabled(config);
        self
    }

    pub fn permissions_policy(mut self, config: PermissionsPolicyConfig) -> Self {
        self.config.permissions_policy = UnitSetting::Enabled(config);
        self
    }

    pub fn referrer_policy(mut self, config: ReferrerPolicyConfig) -> Self {
        self.config.referrer_policy = UnitSetting::Enabled(config);
        self
    }

    pub fn strict_transport_security(mut self, config: StrictTransportSecurityConfig) -> Self {
        self.config.strict_transport_security = UnitSetting::Enabled(config);
        self
    }

    pub fn x_dns_prefetch_control(mut self, config: XDnsPrefetchControlConfig) -> Self {
        self.config.x_dns_prefetch_control = UnitSetting::Enabled(config);
        self
    }

    pub fn x_frame_options(mut self, config: XFrameOptionsConfig) -> Self {
        self.config.x_frame_options = UnitSetting::Enabled(config);
        self
    }

    pub fn x_permitted_cross_domain_policies(mut self, config: XPermittedCrossDomainPoliciesConfig) -> Self {
        self.config.x_permitted_cross_domain_policies = UnitSetting::Enabled(config);
        self
    }

    /// Exclude a unit
    pub fn disable(mut self, name: UnitName) -> Self {
        self.config.toggle(name, false);
        self
    }

    /// Include a unit with its default options
    pub fn enable(mut self, name: UnitName) -> Self {
        self.config.toggle(name, true);
        self
    }

    pub fn build(self) -> HelmetConfig {
        self.config
    }
}

impl Default for HelmetConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
