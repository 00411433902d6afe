use super::counter::RouteCounter;
use crate::dispatcher::{Handler, HandlerFactory, RequestContext};
use crate::token::Method;
use crate::url::{UrlArguments, UrlParseError};
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Template variable segment: `{name}` with a non-empty `[A-Za-z0-9_-]` name.
#[allow(clippy::expect_used)]
static VARIABLE_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{([A-Za-z0-9_-]+)\}$").expect("variable segment regex should be valid")
});

/// One compiled path segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
    /// Must equal the request segment exactly
    Literal(Box<str>),
    /// Matches any request segment and binds it to the name
    Variable(Arc<str>),
}

impl RouteSegment {
    /// Compile a single template segment.
    ///
    /// `{name}` becomes a variable when `name` is one or more of
    /// `[A-Za-z0-9_-]`; anything else, including `{}`, is a literal.
    #[must_use]
    pub fn compile(segment: &str) -> Self {
        let name = VARIABLE_SEGMENT
            .captures(segment)
            .and_then(|caps| caps.get(1));
        match name {
            Some(name) => RouteSegment::Variable(Arc::from(name.as_str())),
            None => RouteSegment::Literal(Box::from(segment)),
        }
    }

    #[inline]
    fn accepts(&self, segment: &str) -> bool {
        match self {
            RouteSegment::Literal(text) => &**text == segment,
            RouteSegment::Variable(_) => true,
        }
    }
}

/// Why a route template could not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCompileError {
    /// The template is not a valid request-target
    InvalidTemplate {
        template: String,
        source: UrlParseError,
    },
    /// The route name is empty
    EmptyName { template: String },
}

impl fmt::Display for RouteCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteCompileError::InvalidTemplate { template, source } => {
                write!(f, "invalid route template '{template}': {source}")
            }
            RouteCompileError::EmptyName { template } => {
                write!(f, "route '{template}' has an empty name")
            }
        }
    }
}

impl std::error::Error for RouteCompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteCompileError::InvalidTemplate { source, .. } => Some(source),
            RouteCompileError::EmptyName { .. } => None,
        }
    }
}

/// Handler-facing description of a registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub name: Arc<str>,
    pub method: Method,
    pub template: Box<str>,
    variables: SmallVec<[(Arc<str>, usize); 4]>,
}

impl RouteInfo {
    /// Segment index bound to the variable `name`; the last binding wins when
    /// a name repeats.
    #[must_use]
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables
            .iter()
            .rfind(|(n, _)| n.as_ref() == name)
            .map(|(_, i)| *i)
    }

    /// Variable names in path order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(n, _)| n.as_ref())
    }
}

/// A compiled route: the match criteria plus the factory that builds its
/// handler.
///
/// Compiled once at registration and immutable afterwards; only the optional
/// counter changes.
pub struct RoutePattern<S> {
    info: Arc<RouteInfo>,
    segments: SmallVec<[RouteSegment; 8]>,
    min_query_args: usize,
    max_content_length: usize,
    factory: HandlerFactory<S>,
    counter: Option<Arc<dyn RouteCounter>>,
}

impl<S> RoutePattern<S> {
    /// Compile `template` into a route.
    ///
    /// The template path is split like a request path. Its query part is
    /// parsed like a request query, but only the number of keys is kept as
    /// the minimum number of query arguments a request must carry.
    ///
    /// # Errors
    ///
    /// Returns [`RouteCompileError`] when the template does not parse as a
    /// request-target or `name` is empty.
    pub fn compile<F>(
        method: Method,
        template: &str,
        max_content_length: usize,
        name: &str,
        factory: F,
        counter: Option<Arc<dyn RouteCounter>>,
    ) -> Result<Self, RouteCompileError>
    where
        F: Fn(Arc<S>, RequestContext, SystemTime) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RouteCompileError::EmptyName {
                template: template.to_string(),
            });
        }
        let parsed =
            UrlArguments::parse(template).map_err(|source| RouteCompileError::InvalidTemplate {
                template: template.to_string(),
                source,
            })?;

        let segments: SmallVec<[RouteSegment; 8]> =
            parsed.segments().map(RouteSegment::compile).collect();
        let variables = segments
            .iter()
            .enumerate()
            .filter_map(|(i, seg)| match seg {
                RouteSegment::Variable(name) => Some((Arc::clone(name), i)),
                RouteSegment::Literal(_) => None,
            })
            .collect();

        Ok(Self {
            info: Arc::new(RouteInfo {
                name: Arc::from(name),
                method,
                template: Box::from(template),
                variables,
            }),
            segments,
            min_query_args: parsed.query_count(),
            max_content_length,
            factory: Arc::new(factory),
            counter,
        })
    }

    /// Whether a request satisfies this route, without touching the counter.
    ///
    /// Checks run cheapest first and stop at the first failure: method,
    /// segment count, query count, content length, then literal segments.
    #[inline]
    #[must_use]
    pub fn accepts(&self, method: Method, args: &UrlArguments, content_length: usize) -> bool {
        method == self.info.method
            && args.segment_count() == self.segments.len()
            && args.query_count() >= self.min_query_args
            && content_length <= self.max_content_length
            && self
                .segments
                .iter()
                .zip(args.segments())
                .all(|(expected, seg)| expected.accepts(seg))
    }

    /// [`accepts`](Self::accepts), incrementing the route counter on success.
    #[inline]
    pub fn try_match(&self, method: Method, args: &UrlArguments, content_length: usize) -> bool {
        let matched = self.accepts(method, args, content_length);
        if matched {
            if let Some(counter) = &self.counter {
                counter.increment();
            }
        }
        matched
    }

    /// Build this route's handler for a matched request.
    #[must_use]
    pub fn build_handler(
        &self,
        server: Arc<S>,
        context: RequestContext,
        accept_time: SystemTime,
    ) -> Box<dyn Handler> {
        (self.factory)(server, context, accept_time)
    }

    #[must_use]
    pub fn info(&self) -> &Arc<RouteInfo> {
        &self.info
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.info.method
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.info.template
    }

    #[must_use]
    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    #[must_use]
    pub fn min_query_args(&self) -> usize {
        self.min_query_args
    }

    #[must_use]
    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    #[must_use]
    pub fn has_counter(&self) -> bool {
        self.counter.is_some()
    }
}

impl<S> fmt::Debug for RoutePattern<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("name", &self.info.name)
            .field("method", &self.info.method)
            .field("template", &self.info.template)
            .field("segments", &self.segments)
            .field("min_query_args", &self.min_query_args)
            .field("max_content_length", &self.max_content_length)
            .field("counted", &self.counter.is_some())
            .finish_non_exhaustive()
    }
}
