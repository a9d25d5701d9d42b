//! Per-request CSP nonces.
//!
//! [`CspNonceLayer`] stores a fresh [`CspNonce`] in each request's extensions.
//! Handlers read it with `Extension<CspNonce>` to stamp inline scripts, and a
//! policy picks it up through [`NonceSource`].

use super::directives::{DynamicSource, Source};
use crate::handler::{RequestHead, ResponseHeaders};
use axum::extract::Request;
use futures::future::BoxFuture;
use std::fmt;
use tower::Service;

/// A nonce generated for one request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CspNonce(String);

impl CspNonce {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dynamic source rendering `'nonce-<value>'` from the request's [`CspNonce`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NonceSource;

impl NonceSource {
    pub fn source() -> Source {
        Source::dynamic(NonceSource)
    }
}

impl DynamicSource for NonceSource {
    fn resolve(&self, req: &RequestHead, _res: &dyn ResponseHeaders) -> String {
        match req.extensions.get::<CspNonce>() {
            Some(nonce) => format!("'nonce-{}'", nonce),
            None => {
                tracing::warn!(
                    path = %req.uri.path(),
                    "no CSP nonce on request; is CspNonceLayer installed outside the security header layer?"
                );
                String::new()
            }
        }
    }
}

/// Build a layer that gives every request a fresh nonce
pub fn build_csp_nonce_layer() -> CspNonceLayer {
    CspNonceLayer
}

/// Tower layer that inserts a [`CspNonce`] into request extensions
#[derive(Debug, Clone, Copy, Default)]
pub struct CspNonceLayer;

impl<S> tower::Layer<S> for CspNonceLayer {
    type Service = CspNonceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CspNonceService { inner }
    }
}

/// Tower service that inserts a [`CspNonce`] into request extensions
#[derive(Debug, Clone)]
pub struct CspNonceService<S> {
    inner: S,
}

impl<S> Service<Request> for CspNonceService<S>
where
    S: Service<Request> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // An outer layer may already have assigned one
        if req.extensions().get::<CspNonce>().is_none() {
            req.extensions_mut().insert(CspNonce::generate());
        }
        Box::pin(self.inner.call(req))
    }
}
