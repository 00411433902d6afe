//! Dispatcher core module - hot path for request dispatch.
//!
//! Turns one raw request into a bound handler: decode the method, parse the
//! target, classify headers, run the matcher, invoke the winning route's
//! factory. No state crosses requests except the immutable route table and
//! its counters.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use super::handler::{Handler, RequestContext};
use crate::http::{HttpRequest, HttpResponse, RequestHeaders};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::{MatchOutcome, RouteTable};
use crate::token::{Method, UnknownMethod};
use crate::url::{UrlArguments, UrlParseError};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::{debug, error, info, warn};

/// A request as delivered by the listener, before any decoding.
#[derive(Debug)]
pub struct RawRequest {
    /// Request-target from the request line, e.g. `/a/b?x=1`
    pub target: String,
    /// Method token from the request line
    pub method: String,
    /// Header fields in arrival order
    pub headers: Vec<(String, String)>,
    /// Peer address, when known
    pub remote: Option<SocketAddr>,
    /// Body bytes, or the fault that prevented reading them
    pub body: io::Result<Vec<u8>>,
}

impl RawRequest {
    /// Request without headers, remote address or body.
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            headers: Vec::new(),
            remote: None,
            body: Ok(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Ok(body.into());
        self
    }

    #[must_use]
    pub fn with_remote(mut self, remote: SocketAddr) -> Self {
        self.remote = Some(remote);
        self
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Why a request could not be decoded.
#[derive(Debug)]
pub enum MalformedRequest {
    /// The method is not one of the nine recognised verbs
    UnknownMethod(UnknownMethod),
    /// The request-target failed to parse
    InvalidTarget(UrlParseError),
    /// The listener could not read the body
    BodyUnreadable(io::Error),
}

impl fmt::Display for MalformedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRequest::UnknownMethod(e) => write!(f, "{e}"),
            MalformedRequest::InvalidTarget(e) => write!(f, "invalid request-target: {e}"),
            MalformedRequest::BodyUnreadable(e) => write!(f, "request body unreadable: {e}"),
        }
    }
}

impl std::error::Error for MalformedRequest {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MalformedRequest::UnknownMethod(e) => Some(e),
            MalformedRequest::InvalidTarget(e) => Some(e),
            MalformedRequest::BodyUnreadable(e) => Some(e),
        }
    }
}

/// Why dispatch produced no handler.
#[derive(Debug)]
pub enum DispatchError {
    Malformed(MalformedRequest),
    /// No route accepted the request, including bodies over every route's limit
    NoRouteMatched,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Malformed(e) => write!(f, "malformed request: {e}"),
            DispatchError::NoRouteMatched => f.write_str("no route matched"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Malformed(e) => Some(e),
            DispatchError::NoRouteMatched => None,
        }
    }
}

impl From<MalformedRequest> for DispatchError {
    fn from(e: MalformedRequest) -> Self {
        DispatchError::Malformed(e)
    }
}

/// Binds requests to handlers using a shared route table.
///
/// Cheap to clone: both the table and the server handle are behind `Arc`.
pub struct Dispatcher<S> {
    table: Arc<RouteTable<S>>,
    server: Arc<S>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            server: Arc::clone(&self.server),
        }
    }
}

impl<S> Dispatcher<S> {
    pub fn new(table: Arc<RouteTable<S>>, server: Arc<S>) -> Self {
        Self { table, server }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable<S> {
        &self.table
    }

    #[must_use]
    pub fn server(&self) -> &Arc<S> {
        &self.server
    }

    /// Decode `raw` and return the handler of the first route it satisfies.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Malformed`] for an unknown method, an unparseable
    /// target or an unreadable body; [`DispatchError::NoRouteMatched`] when no
    /// route accepts the request.
    pub fn dispatch(
        &self,
        raw: RawRequest,
        accept_time: SystemTime,
    ) -> Result<Box<dyn Handler>, DispatchError> {
        let request_id = RequestId::from_header_or_at(raw.header(REQUEST_ID_HEADER), accept_time);
        self.dispatch_with_id(raw, accept_time, request_id)
    }

    fn dispatch_with_id(
        &self,
        raw: RawRequest,
        accept_time: SystemTime,
        request_id: RequestId,
    ) -> Result<Box<dyn Handler>, DispatchError> {
        let method = raw
            .method
            .parse::<Method>()
            .map_err(MalformedRequest::UnknownMethod)?;
        let arguments =
            UrlArguments::parse(raw.target).map_err(MalformedRequest::InvalidTarget)?;
        let headers = RequestHeaders::classify(raw.headers);
        let body = raw.body.map_err(MalformedRequest::BodyUnreadable)?;

        debug!(
            request_id = %request_id,
            method = %method,
            target = %arguments.as_str(),
            standard_headers = headers.standard_count(),
            custom_headers = headers.custom_count(),
            content_length = body.len(),
            "Request decoded"
        );

        let route_match = match self.table.find(method, arguments, body.len()) {
            MatchOutcome::Matched(m) => m,
            MatchOutcome::NoMatch => return Err(DispatchError::NoRouteMatched),
        };

        let info = Arc::clone(route_match.info());
        let pattern = route_match.pattern;
        let request = HttpRequest {
            request_id,
            method,
            arguments: route_match.arguments,
            headers,
            remote: raw.remote,
            body,
        };

        info!(
            request_id = %request_id,
            route_name = %info.name,
            method = %method,
            "Request dispatched to handler"
        );

        let context = RequestContext::new(request, info);
        Ok(pattern.build_handler(Arc::clone(&self.server), context, accept_time))
    }

    /// Dispatch `raw` and run its handler, mapping every failure to a
    /// response.
    ///
    /// Malformed requests, unmatched requests and handler errors all produce
    /// an empty `400 Bad Request`. A panicking handler produces `500` and the
    /// connection is not reused.
    pub fn respond(&self, raw: RawRequest, accept_time: SystemTime) -> HttpResponse {
        let request_id = RequestId::from_header_or_at(raw.header(REQUEST_ID_HEADER), accept_time);
        let method = raw.method.clone();
        let target = raw.target.clone();

        let handler = match self.dispatch_with_id(raw, accept_time, request_id) {
            Ok(handler) => handler,
            Err(DispatchError::Malformed(e)) => {
                warn!(
                    request_id = %request_id,
                    method = %method,
                    target = %target,
                    error = %e,
                    "Malformed request"
                );
                return HttpResponse::bad_request();
            }
            Err(DispatchError::NoRouteMatched) => {
                info!(
                    request_id = %request_id,
                    method = %method,
                    target = %target,
                    "No route matched"
                );
                return HttpResponse::bad_request();
            }
        };

        run_handler(handler, request_id)
    }
}

/// Run a bound handler to completion and turn its outcome into a response.
pub fn run_handler(handler: Box<dyn Handler>, request_id: RequestId) -> HttpResponse {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(move || handler.try_process()));
    let execution_time_us = start.elapsed().as_micros() as u64;

    match outcome {
        Ok(Ok(response)) => {
            debug!(
                request_id = %request_id,
                status = response.status(),
                execution_time_us = execution_time_us,
                "Handler execution complete"
            );
            response
        }
        Ok(Err(e)) => {
            warn!(
                request_id = %request_id,
                error = %e,
                source = ?std::error::Error::source(&e).map(|s| s.to_string()),
                execution_time_us = execution_time_us,
                "Handler reported failure"
            );
            HttpResponse::bad_request()
        }
        Err(panic) => {
            let panic_message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                request_id = %request_id,
                panic_message = %panic_message,
                "Handler panicked - CRITICAL"
            );
            let mut response = HttpResponse::new(500);
            response.set_keep_alive(false);
            response
        }
    }
}
