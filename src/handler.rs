//! Handler contract shared by every unit and by the composed stack.
//!
//! A handler receives the request head, the outgoing response headers and a
//! continuation. It must consume the continuation with [`Next::run`] to hand
//! control to the next element, or with [`Next::abort`] to stop the chain
//! with an error. Dropping the continuation without using it halts the chain.

use crate::error::{HelmetError, Result};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

/// The request as seen by handlers. Extensions are available, the body is not.
pub type RequestHead = axum::http::request::Parts;

/// Outgoing header surface a handler writes to
pub trait ResponseHeaders {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    fn remove_header(&mut self, name: &HeaderName);

    fn header(&self, name: &HeaderName) -> Option<HeaderValue>;
}

impl ResponseHeaders for HeaderMap {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.insert(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) {
        self.remove(name);
    }

    fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.get(name).cloned()
    }
}

/// A single recorded header operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOp {
    Set(HeaderName, HeaderValue),
    Remove(HeaderName),
}

/// Header operations recorded before the downstream service has produced a
/// response, replayed onto it afterwards in recording order.
#[derive(Debug, Clone, Default)]
pub struct PendingHeaders {
    ops: Vec<HeaderOp>,
}

impl PendingHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[HeaderOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Names of the headers that will be set, in emission order
    pub fn set_names(&self) -> Vec<&HeaderName> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                HeaderOp::Set(name, _) => Some(name),
                HeaderOp::Remove(_) => None,
            })
            .collect()
    }

    /// Replays the recorded operations onto a downstream response.
    ///
    /// Headers the downstream service already set are kept; removals always
    /// apply.
    pub fn apply_to(self, headers: &mut HeaderMap) {
        let downstream: Vec<HeaderName> = headers.keys().cloned().collect();
        for op in self.ops {
            match op {
                HeaderOp::Set(name, value) => {
                    if !downstream.contains(&name) {
                        headers.insert(name, value);
                    }
                }
                HeaderOp::Remove(name) => {
                    headers.remove(&name);
                }
            }
        }
    }
}

impl ResponseHeaders for PendingHeaders {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.ops.push(HeaderOp::Set(name, value));
    }

    fn remove_header(&mut self, name: &HeaderName) {
        self.ops.push(HeaderOp::Remove(name.clone()));
    }

    fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.ops.iter().rev().find_map(|op| match op {
            HeaderOp::Set(n, value) if n == name => Some(Some(value.clone())),
            HeaderOp::Remove(n) if n == name => Some(None),
            _ => None,
        })?
    }
}

/// A request/response interceptor
pub trait Handler: Send + Sync {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()>;
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
        (**self).handle(req, res, next)
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
        (**self).handle(req, res, next)
    }
}

type Endpoint<'a> = dyn FnMut(&RequestHead, &mut dyn ResponseHeaders) -> Result<()> + 'a;

/// Continuation handed to each handler
pub struct Next<'a> {
    chain: &'a [Box<dyn Handler>],
    endpoint: &'a mut Endpoint<'a>,
}

impl<'a> Next<'a> {
    /// Continuation that runs `chain` in order, then `endpoint`.
    pub fn new(chain: &'a [Box<dyn Handler>], endpoint: &'a mut Endpoint<'a>) -> Self {
        Self { chain, endpoint }
    }

    /// Proceed to the next handler, or the endpoint once the chain is exhausted
    pub fn run(self, req: &RequestHead, res: &mut dyn ResponseHeaders) -> Result<()> {
        match self.chain.split_first() {
            Some((handler, rest)) => handler.handle(
                req,
                res,
                Next {
                    chain: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => (self.endpoint)(req, res),
        }
    }

    /// Stop the chain and forward `err` to the caller
    pub fn abort(self, err: HelmetError) -> Result<()> {
        Err(err)
    }
}

/// Pins a closure to the endpoint signature so it is inferred as higher-ranked.
pub(crate) fn endpoint<F>(f: F) -> F
where
    F: FnMut(&RequestHead, &mut dyn ResponseHeaders) -> Result<()>,
{
    f
}

/// Whether a dispatched handler reached its continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halted,
}

/// Runs `handler` with a terminal continuation.
pub fn dispatch(
    handler: &dyn Handler,
    req: &RequestHead,
    res: &mut dyn ResponseHeaders,
) -> Result<Flow> {
    let mut reached = false;
    let mut terminal = endpoint(|_, _| {
        reached = true;
        Ok(())
    });
    handler.handle(req, res, Next::new(&[], &mut terminal))?;
    Ok(if reached { Flow::Continue } else { Flow::Halted })
}

/// Sets one header to a value computed at construction time
#[derive(Debug, Clone)]
pub struct SetHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl SetHeader {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }

    pub(crate) fn from_string(unit: &'static str, name: HeaderName, value: String) -> Result<Self> {
        let value = HeaderValue::try_from(value.as_str()).map_err(|_| {
            HelmetError::invalid_option(unit, format!("{} produced an invalid header value {:?}", unit, value))
        })?;
        Ok(Self { name, value })
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }
}

impl Handler for SetHeader {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
        res.set_header(self.name.clone(), self.value.clone());
        next.run(req, res)
    }
}

/// Removes one header if present
#[derive(Debug, Clone)]
pub struct RemoveHeader {
    name: HeaderName,
}

impl RemoveHeader {
    pub fn new(name: HeaderName) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }
}

impl Handler for RemoveHeader {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
        res.remove_header(&self.name);
        next.run(req, res)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::{Request, header};

    pub(crate) fn request_head() -> RequestHead {
        Request::builder().uri("/").body(()).unwrap().into_parts().0
    }

    struct Halt;

    impl Handler for Halt {
        fn handle(&self, _req: &RequestHead, _res: &mut dyn ResponseHeaders, _next: Next<'_>) -> Result<()> {
            Ok(())
        }
    }

    struct Fail;

    impl Handler for Fail {
        fn handle(&self, _req: &RequestHead, _res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
            next.abort(HelmetError::invalid_config("boom"))
        }
    }

    #[test]
    fn test_set_header_continues() {
        let handler = SetHeader::new(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        let mut headers = HeaderMap::new();
        let flow = dispatch(&handler, &request_head(), &mut headers).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    }

    #[test]
    fn test_remove_header_is_noop_when_absent() {
        let name = HeaderName::from_static("x-powered-by");
        let handler = RemoveHeader::new(name.clone());
        let mut headers = HeaderMap::new();
        dispatch(&handler, &request_head(), &mut headers).unwrap();
        assert!(headers.get(&name).is_none());

        headers.insert(name.clone(), HeaderValue::from_static("Express"));
        dispatch(&handler, &request_head(), &mut headers).unwrap();
        assert!(headers.get(&name).is_none());
    }

    #[test]
    fn test_halting_handler_reports_halted() {
        let mut headers = HeaderMap::new();
        let flow = dispatch(&Halt, &request_head(), &mut headers).unwrap();
        assert_eq!(flow, Flow::Halted);
    }

    #[test]
    fn test_abort_forwards_error() {
        let mut headers = HeaderMap::new();
        let err = dispatch(&Fail, &request_head(), &mut headers).unwrap_err();
        assert!(matches!(err, HelmetError::InvalidConfig(_)));
    }

    #[test]
    fn test_next_runs_chain_in_order() {
        let chain: Vec<Box<dyn Handler>> = vec![
            Box::new(SetHeader::new(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"))),
            Box::new(SetHeader::new(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"))),
        ];
        let mut pending = PendingHeaders::new();
        let mut calls = 0;
        let mut terminal = endpoint(|_, res| {
            calls += 1;
            assert_eq!(res.header(&header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
            Ok(())
        });
        Next::new(&chain, &mut terminal)
            .run(&request_head(), &mut pending)
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(pending.ops().len(), 2);
    }

    #[test]
    fn test_pending_headers_replay() {
        let powered_by = HeaderName::from_static("x-powered-by");
        let mut pending = PendingHeaders::new();
        pending.set_header(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        pending.remove_header(&powered_by);
        assert!(pending.header(&powered_by).is_none());
        assert_eq!(pending.set_names(), vec![&header::X_CONTENT_TYPE_OPTIONS]);

        let mut headers = HeaderMap::new();
        headers.insert(powered_by.clone(), HeaderValue::from_static("Express"));
        pending.apply_to(&mut headers);

        assert!(headers.get(&powered_by).is_none());
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    }

    #[test]
    fn test_pending_headers_keep_downstream_values() {
        let mut pending = PendingHeaders::new();
        pending.set_header(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        pending.set_header(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        pending.set_header(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

        let mut headers = HeaderMap::new();
        headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("same-origin"));
        pending.apply_to(&mut headers);

        assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "same-origin");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    }
}
