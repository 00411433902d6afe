//! # Router Module
//!
//! The router module compiles route templates and selects the route for an
//! incoming request.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling templates such as `/postback/{campaign_id}?{transaction_id}=x`
//!   into literal and variable segments plus a minimum query-argument count
//! - Keeping registered routes in an ordered, immutable [`RouteTable`]
//! - Selecting the first route that a request satisfies
//! - Counting wins per route through an optional [`RouteCounter`]
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: At startup, each template is parsed with the same
//!    parser used for request-targets. Path segments of the form `{name}`
//!    become variables and everything else is a literal. The template's query
//!    contributes only its key count.
//!
//! 2. **Matching**: For each request, routes are evaluated in registration
//!    order. Each evaluation short-circuits: method, segment count, query
//!    count, content length, then literal segments.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard::dispatcher::{Handler, HandlerOutcome, RequestContext};
//! use switchyard::router::RouteTable;
//! use switchyard::token::Method;
//! use switchyard::url::UrlArguments;
//!
//! fn file(_: Arc<()>, ctx: RequestContext, _: std::time::SystemTime) -> Box<dyn Handler> {
//!     Box::new(move || -> HandlerOutcome { Ok(ctx.into_response()) })
//! }
//!
//! let mut builder = RouteTable::<()>::builder();
//! builder.route(Method::Get, "/{fileName}", 0, "file", file).unwrap();
//! let table = builder.build();
//!
//! let args = UrlArguments::parse("/favicon.ico").unwrap();
//! let matched = table.find(Method::Get, args, 0).into_match().unwrap();
//! assert_eq!(matched.variable("fileName"), Some("favicon.ico"));
//! ```
//!
//! ## Performance
//!
//! Matching is O(n) in the number of routes and performs no allocation.
//! Literal comparison is exact and case-sensitive.

mod core;
mod counter;
mod pattern;
#[cfg(test)]
mod tests;

pub use core::{MatchOutcome, RouteMatch, RouteTable, RouteTableBuilder};
pub use counter::{AtomicRouteCounter, RouteCounter};
pub use pattern::{RouteCompileError, RouteInfo, RoutePattern, RouteSegment};
