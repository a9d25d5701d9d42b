use super::directives::{DirectiveValue, Directives};
use serde::Deserialize;

/// Content-Security-Policy options
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSecurityPolicyConfig {
    /// Merge in the default directives the caller did not mention (default true)
    #[serde(default)]
    pub use_defaults: Option<bool>,

    /// Directives to send. When absent the default directives are used.
    #[serde(default)]
    pub directives: Option<Directives>,

    /// Send `Content-Security-Policy-Report-Only` instead
    #[serde(default)]
    pub report_only: bool,
}

impl ContentSecurityPolicyConfig {
    /// Create a new ContentSecurityPolicyConfig builder
    pub fn builder() -> ContentSecurityPolicyConfigBuilder {
        ContentSecurityPolicyConfigBuilder::new()
    }
}

/// Builder for ContentSecurityPolicyConfig
#[must_use = "builder does nothing until you call build()"]
pub struct ContentSecurityPolicyConfigBuilder {
    config: ContentSecurityPolicyConfig,
}

impl ContentSecurityPolicyConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ContentSecurityPolicyConfig::default(),
        }
    }

    pub fn use_defaults(mut self, use_defaults: bool) -> Self {
        self.config.use_defaults = Some(use_defaults);
        self
    }

    pub fn directives(mut self, directives: Directives) -> Self {
        self.config.directives = Some(directives);
        self
    }

    /// Append one directive, keeping any added before
    pub fn directive(mut self, name: impl Into<String>, value: DirectiveValue) -> Self {
        let directives = self.config.directives.take().unwrap_or_default();
        self.config.directives = Some(directives.with_value(name, value));
        self
    }

    pub fn report_only(mut self, report_only: bool) -> Self {
        self.config.report_only = report_only;
        self
    }

    pub fn build(self) -> ContentSecurityPolicyConfig {
        self.config
    }
}

impl Default for ContentSecurityPolicyConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
