//! Fluent request scenarios for checking security headers end to end
//!
//! Requests are driven through the router with `tower::ServiceExt::oneshot`,
//! so no server is started.
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{Router, routing};
//! use hardhat::{HelmetConfig, build_helmet_layer, testing};
//!
//! #[tokio::test]
//! async fn test_frame_options() {
//!     let layer = build_helmet_layer(&HelmetConfig::default()).unwrap().unwrap();
//!     let app = Router::new().route("/", routing::get(|| async { "ok" })).layer(layer);
//!
//!     testing::get(app, "/")
//!         .execute()
//!         .await
//!         .assert_ok()
//!         .assert_header("x-frame-options", "SAMEORIGIN")
//!         .assert_header_absent("x-powered-by");
//! }
//! ```

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde::Deserialize;
use tower::ServiceExt;

/// Headers the default configuration sets, with their values
pub const DEFAULT_SECURITY_HEADERS: [(&str, &str); 12] = [
    ("cross-origin-embedder-policy", "require-corp"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Test scenario builder
pub struct Scenario {
    app: Router,
    request: Request<Body>,
}

impl Scenario {
    /// Create a new test scenario with the given app
    pub fn new(app: Router) -> Self {
        let mut request = Request::new(Body::empty());
        *request.method_mut() = Method::GET;
        Self { app, request }
    }

    pub fn method(mut self, method: Method) -> Self {
        *self.request.method_mut() = method;
        self
    }

    /// Set the URI/path
    pub fn uri(mut self, uri: &str) -> Self {
        *self.request.uri_mut() = uri
            .parse()
            .unwrap_or_else(|_| panic!("invalid test URI {:?}", uri));
        self
    }

    /// Insert a request extension, as an outer layer would
    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.request.extensions_mut().insert(value);
        self
    }

    /// Execute the request and get an assertion builder
    pub async fn execute(self) -> ScenarioAssert {
        let response = match self.app.oneshot(self.request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        ScenarioAssert { response }
    }
}

/// Assertion builder for test responses
pub struct ScenarioAssert {
    response: axum::response::Response,
}

impl ScenarioAssert {
    /// Assert the response status code
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    /// Assert status is 200 OK
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    /// Assert status is 500 Internal Server Error
    pub fn assert_server_error(self) -> Self {
        self.assert_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Header value as a string, if present
    pub fn header(&self, key: &str) -> Option<String> {
        self.response
            .headers()
            .get(key)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    /// Assert a header exists with the given value
    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self
            .header(key)
            .unwrap_or_else(|| panic!("Header '{}' not found", key));
        assert_eq!(value, expected, "Header '{}' value mismatch", key);
        self
    }

    /// Assert a header is not present
    pub fn assert_header_absent(self, key: &str) -> Self {
        if let Some(value) = self.header(key) {
            panic!("Header '{}' should be absent, found {:?}", key, value);
        }
        self
    }

    /// Assert every header of the default configuration is present with its default value
    pub fn assert_default_security_headers(mut self) -> Self {
        for (key, expected) in DEFAULT_SECURITY_HEADERS {
            self = self.assert_header(key, expected);
        }
        self
    }

    /// Get the response body as bytes
    pub async fn body_bytes(self) -> Vec<u8> {
        match axum::body::to_bytes(self.response.into_body(), usize::MAX).await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => panic!("Failed to read response body: {}", err),
        }
    }

    /// Get the response body as a string
    pub async fn body_string(self) -> String {
        String::from_utf8_lossy(&self.body_bytes().await).into_owned()
    }

    /// Parse the JSON response body into a type
    pub async fn json<T: for<'de> Deserialize<'de>>(self) -> T {
        let bytes = self.body_bytes().await;
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|err| panic!("Failed to parse JSON response: {}", err))
    }

    /// Get the underlying response for custom assertions
    pub fn response(self) -> axum::response::Response {
        self.response
    }
}

/// Convenience function to create a GET request scenario
pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::GET).uri(uri)
}
