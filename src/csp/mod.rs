//! Content-Security-Policy.
//!
//! Directives are validated and normalized when the unit is built; dynamic
//! sources are evaluated for every request.
//!
//! # Example
//!
//! ```rust
//! use hardhat::csp::{ContentSecurityPolicyConfig, Directives, build_content_security_policy};
//!
//! let config = ContentSecurityPolicyConfig::builder()
//!     .directives(Directives::new().directive("scriptSrc", ["'self'", "https://cdn.example.com"]))
//!     .build();
//! let csp = build_content_security_policy(&config).unwrap();
//! assert_eq!(csp.header_name().as_str(), "content-security-policy");
//! ```

mod config;
mod directives;
mod nonce;
mod policy;

pub use config::{ContentSecurityPolicyConfig, ContentSecurityPolicyConfigBuilder};
pub use directives::{DirectiveValue, Directives, DynamicSource, Source, get_default_directives};
pub use nonce::{CspNonce, CspNonceLayer, CspNonceService, NonceSource, build_csp_nonce_layer};
pub use policy::{ContentSecurityPolicy, build_content_security_policy};
