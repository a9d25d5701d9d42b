use super::config::HelmetConfig;
use super::stack::Helmet;
use crate::error::{HelmetError, Result};
use crate::handler::{Flow, Handler, PendingHeaders, dispatch};
use axum::{
    body::Body,
    extract::Request,
    http::Response,
    response::IntoResponse,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use tower::Service;

/// Build a Tower layer that runs the configured security header chain
///
/// Returns `None` when every unit is excluded.
pub fn build_helmet_layer(config: &HelmetConfig) -> Result<Option<HelmetLayer>> {
    let helmet = Helmet::new(config)?;
    if helmet.is_empty() {
        return Ok(None);
    }
    Ok(Some(HelmetLayer::new(helmet)))
}

/// Tower layer that runs a [`Handler`] for every request
#[derive(Clone)]
pub struct HelmetLayer {
    handler: Arc<dyn Handler>,
}

impl HelmetLayer {
    /// Wrap any handler: the full chain or a single unit
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn from_config(config: &HelmetConfig) -> Result<Self> {
        Ok(Self::new(Helmet::new(config)?))
    }
}

impl<S> tower::Layer<S> for HelmetLayer {
    type Service = HelmetService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HelmetService {
            inner,
            handler: self.handler.clone(),
        }
    }
}

/// Tower service that runs the handler against the request head, calls the
/// inner service, and applies the recorded header operations to its response
#[derive(Clone)]
pub struct HelmetService<S> {
    inner: S,
    handler: Arc<dyn Handler>,
}

impl<S> Service<Request> for HelmetService<S>
where
    S: Service<Request, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let (parts, body) = req.into_parts();
        let mut pending = PendingHeaders::new();

        match dispatch(self.handler.as_ref(), &parts, &mut pending) {
            Ok(Flow::Continue) => {
                let fut = self.inner.call(Request::from_parts(parts, body));
                Box::pin(async move {
                    let mut response = fut.await?;
                    pending.apply_to(response.headers_mut());
                    Ok(response)
                })
            }
            Ok(Flow::Halted) => {
                let response = HelmetError::ChainHalted.into_response();
                Box::pin(async move { Ok(response) })
            }
            Err(err) => {
                let mut response = err.into_response();
                pending.apply_to(response.headers_mut());
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
