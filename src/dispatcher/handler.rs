use crate::http::{BodyError, HttpRequest, HttpResponse};
use crate::router::RouteInfo;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Result of processing one request.
pub type HandlerOutcome = Result<HttpResponse, HandlerError>;

/// A bound unit of work for one matched request.
///
/// A handler owns its [`RequestContext`]; the context is released when
/// `try_process` returns, whatever the outcome.
pub trait Handler: Send {
    fn try_process(self: Box<Self>) -> HandlerOutcome;
}

impl<F> Handler for F
where
    F: FnOnce() -> HandlerOutcome + Send,
{
    fn try_process(self: Box<Self>) -> HandlerOutcome {
        (*self)()
    }
}

/// Builds a handler for a matched request from the server handle, the request
/// context and the connection's accept time.
pub type HandlerFactory<S> =
    Arc<dyn Fn(Arc<S>, RequestContext, SystemTime) -> Box<dyn Handler> + Send + Sync>;

/// Everything a handler needs: the decoded request, a response to fill in,
/// and the route it matched.
#[derive(Debug)]
pub struct RequestContext {
    pub request: HttpRequest,
    pub response: HttpResponse,
    route: Arc<RouteInfo>,
}

impl RequestContext {
    #[must_use]
    pub fn new(request: HttpRequest, route: Arc<RouteInfo>) -> Self {
        Self {
            request,
            response: HttpResponse::default(),
            route,
        }
    }

    #[must_use]
    pub fn route(&self) -> &RouteInfo {
        &self.route
    }

    /// Value of the path segment bound to the template variable `name`.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.route
            .variable_index(name)
            .and_then(|i| self.request.arguments.segment(i))
    }

    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.arguments.query(key)
    }

    /// Consume the context, keeping only the response.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        self.response
    }
}

/// Failure reported by a handler. The listener answers it with `400`.
#[derive(Debug)]
pub struct HandlerError {
    message: Cow<'static, str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<Cow<'static, str>>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<&'static str> for HandlerError {
    fn from(message: &'static str) -> Self {
        Self::new(message)
    }
}

impl From<BodyError> for HandlerError {
    fn from(err: BodyError) -> Self {
        Self::with_source("request body could not be read", err)
    }
}
