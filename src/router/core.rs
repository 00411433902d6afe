//! Router core module - hot path for request routing.
//!
//! Matching is a linear first-match scan over routes in registration order.
//! Nothing on the matching path allocates: the request arguments are moved
//! into the outcome, not copied.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use super::counter::RouteCounter;
use super::pattern::{RouteCompileError, RouteInfo, RoutePattern};
use crate::dispatcher::{Handler, RequestContext};
use crate::token::Method;
use crate::url::UrlArguments;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// A request that satisfied a route.
#[derive(Debug)]
pub struct RouteMatch<'a, S> {
    /// The winning route
    pub pattern: &'a RoutePattern<S>,
    /// The request's arguments, moved out of the lookup
    pub arguments: UrlArguments,
}

impl<S> RouteMatch<'_, S> {
    /// Request segment bound to the template variable `name`.
    ///
    /// If a name appears twice in a template the later segment wins.
    #[inline]
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.pattern
            .info()
            .variable_index(name)
            .and_then(|i| self.arguments.segment(i))
    }

    #[must_use]
    pub fn info(&self) -> &Arc<RouteInfo> {
        self.pattern.info()
    }
}

/// Result of evaluating a request against the whole table.
#[derive(Debug)]
pub enum MatchOutcome<'a, S> {
    Matched(RouteMatch<'a, S>),
    NoMatch,
}

impl<'a, S> MatchOutcome<'a, S> {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    /// The match, if any.
    #[must_use]
    pub fn into_match(self) -> Option<RouteMatch<'a, S>> {
        match self {
            MatchOutcome::Matched(m) => Some(m),
            MatchOutcome::NoMatch => None,
        }
    }
}

/// Ordered, immutable collection of compiled routes.
///
/// Built once with [`RouteTableBuilder`] before the listener starts and
/// shared read-only (through `Arc`) by every connection. Earlier
/// registrations take priority: the first route whose checks all pass wins.
pub struct RouteTable<S> {
    routes: Vec<RoutePattern<S>>,
}

impl<S> RouteTable<S> {
    #[must_use]
    pub fn builder() -> RouteTableBuilder<S> {
        RouteTableBuilder::new()
    }

    /// Evaluate a request against every route in registration order.
    ///
    /// The winning route's counter is incremented. Routes after the winner
    /// are not evaluated.
    pub fn find(
        &self,
        method: Method,
        arguments: UrlArguments,
        content_length: usize,
    ) -> MatchOutcome<'_, S> {
        match self
            .routes
            .iter()
            .find(|route| route.try_match(method, &arguments, content_length))
        {
            Some(pattern) => {
                debug!(
                    route_name = %pattern.name(),
                    method = %method,
                    target = %arguments.as_str(),
                    "Route matched"
                );
                MatchOutcome::Matched(RouteMatch { pattern, arguments })
            }
            None => {
                debug!(
                    method = %method,
                    target = %arguments.as_str(),
                    content_length = content_length,
                    routes_checked = self.routes.len(),
                    "No route matched"
                );
                MatchOutcome::NoMatch
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &RoutePattern<S>> {
        self.routes.iter()
    }

    /// Print all registered routes to stdout.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!(
                "[route] {} {} -> {} (min_query={}, max_content={})",
                route.method(),
                route.template(),
                route.name(),
                route.min_query_args(),
                route.max_content_length()
            );
        }
    }
}

impl<S> std::fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}

/// Registration surface for a [`RouteTable`].
///
/// Routes are kept in the order they are added. A template that fails to
/// compile is reported and not registered.
pub struct RouteTableBuilder<S> {
    routes: Vec<RoutePattern<S>>,
}

impl<S> Default for RouteTableBuilder<S> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<S> RouteTableBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and append a route.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteCompileError`] from [`RoutePattern::compile`]; the
    /// builder is left unchanged.
    pub fn route<F>(
        &mut self,
        method: Method,
        template: &str,
        max_content_length: usize,
        name: &str,
        factory: F,
    ) -> Result<&mut Self, RouteCompileError>
    where
        F: Fn(Arc<S>, RequestContext, SystemTime) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        self.counted_route(method, template, max_content_length, name, factory, None)
    }

    /// Compile and append a route whose wins are reported to `counter`.
    ///
    /// # Errors
    ///
    /// Same as [`route`](Self::route).
    pub fn counted_route<F>(
        &mut self,
        method: Method,
        template: &str,
        max_content_length: usize,
        name: &str,
        factory: F,
        counter: Option<Arc<dyn RouteCounter>>,
    ) -> Result<&mut Self, RouteCompileError>
    where
        F: Fn(Arc<S>, RequestContext, SystemTime) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        match RoutePattern::compile(method, template, max_content_length, name, factory, counter) {
            Ok(pattern) => Ok(self.push(pattern)),
            Err(e) => {
                warn!(
                    route_name = %name,
                    template = %template,
                    error = %e,
                    "Route template rejected"
                );
                Err(e)
            }
        }
    }

    /// Append an already compiled route.
    pub fn push(&mut self, pattern: RoutePattern<S>) -> &mut Self {
        if let Some(earlier) = self
            .routes
            .iter()
            .find(|r| r.method() == pattern.method() && r.segments() == pattern.segments())
        {
            warn!(
                route_name = %pattern.name(),
                shadowed_by = %earlier.name(),
                template = %pattern.template(),
                "Route has the same method and segments as an earlier route"
            );
        }
        self.routes.push(pattern);
        self
    }

    /// Freeze the registrations into a table.
    #[must_use]
    pub fn build(self) -> RouteTable<S> {
        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method(), r.template()))
            .collect();

        info!(
            routes_count = self.routes.len(),
            routes_summary = ?routes_summary,
            routing_algorithm = "first_match",
            "Routing table loaded"
        );

        RouteTable {
            routes: self.routes,
        }
    }
}
