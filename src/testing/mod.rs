//! Testing utilities for security header stacks
//!
//! A fluent API for sending requests through an `axum::Router` without
//! running a server and asserting on the headers that come back.
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{Router, routing};
//! use hardhat::{HelmetConfig, build_helmet_layer, testing};
//!
//! #[tokio::test]
//! async fn test_defaults() {
//!     let layer = build_helmet_layer(&HelmetConfig::default()).unwrap().unwrap();
//!     let app = Router::new().route("/", routing::get(|| async { "ok" })).layer(layer);
//!
//!     testing::get(app, "/")
//!         .execute()
//!         .await
//!         .assert_ok()
//!         .assert_default_security_headers();
//! }
//! ```

mod scenario;

pub use scenario::{DEFAULT_SECURITY_HEADERS, Scenario, ScenarioAssert, get};
