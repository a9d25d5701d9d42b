//! Hardhat - composable security-header middleware for Axum and Tower
//!
//! Hardhat assembles a chain of small units, each responsible for one HTTP
//! response header that mitigates a class of browser-side attack, and runs
//! it as a Tower layer.
//!
//! # Units
//!
//! - **Content-Security-Policy**: validated directives, per-request nonces
//! - **Strict-Transport-Security**, **Expect-CT**
//! - **Cross-Origin-Embedder/Opener/Resource-Policy**, **Origin-Agent-Cluster**
//! - **Referrer-Policy**, **Permissions-Policy**
//! - **X-Frame-Options**, **X-Content-Type-Options**, **X-DNS-Prefetch-Control**,
//!   **X-Download-Options**, **X-Permitted-Cross-Domain-Policies**,
//!   **X-XSS-Protection**, and removal of **X-Powered-By**
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use hardhat::{HelmetConfig, build_helmet_layer};
//!
//! # fn main() -> hardhat::Result<()> {
//! hardhat::init_tracing();
//!
//! let config = HelmetConfig::from_env()?;
//! let mut app: Router = Router::new().route("/", get(|| async { "Hello" }));
//! if let Some(layer) = build_helmet_layer(&config)? {
//!     app = app.layer(layer);
//! }
//! # Ok(())
//! # }
//! ```

pub mod csp;
mod error;
mod handler;
mod helmet;
pub mod testing;
pub mod units;
pub mod utils;

// Re-exports for public API
pub use csp::{ContentSecurityPolicy, ContentSecurityPolicyConfig, CspNonce, CspNonceLayer};
pub use error::{HelmetError, Result};
pub use handler::{
    Flow, Handler, HeaderOp, Next, PendingHeaders, RemoveHeader, RequestHead, ResponseHeaders,
    SetHeader, dispatch,
};
pub use helmet::{
    BuildFn, Helmet, HelmetConfig, HelmetConfigBuilder, HelmetLayer, HelmetService, REGISTRY,
    UnitDescriptor, UnitName, UnitSetting, build_helmet_layer,
};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "hardhat=debug")
/// - `HARDHAT_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
