use super::{AtomicRouteCounter, RouteCompileError, RoutePattern, RouteSegment, RouteTable};
use crate::dispatcher::{Handler, HandlerOutcome, RequestContext};
use crate::token::Method;
use crate::url::{UrlArguments, UrlParseError};
use std::sync::Arc;
use std::time::SystemTime;

fn noop(_: Arc<()>, ctx: RequestContext, _: SystemTime) -> Box<dyn Handler> {
    Box::new(move || -> HandlerOutcome { Ok(ctx.into_response()) })
}

fn compile(method: Method, template: &str, max_len: usize) -> RoutePattern<()> {
    RoutePattern::compile(method, template, max_len, "test", noop, None).unwrap()
}

fn args(target: &str) -> UrlArguments {
    UrlArguments::parse(target).unwrap()
}

#[test]
fn test_root_template() {
    let route = compile(Method::Get, "/", 0);
    assert_eq!(route.segments(), [RouteSegment::Literal("".into())]);
    assert!(route.accepts(Method::Get, &args("/"), 0));
    assert!(!route.accepts(Method::Get, &args("/a"), 0));
}

#[test]
fn test_variable_and_literal_segments() {
    let route = compile(Method::Get, "/a/{b}/c", 0);
    assert_eq!(
        route.segments(),
        [
            RouteSegment::Literal("a".into()),
            RouteSegment::Variable("b".into()),
            RouteSegment::Literal("c".into()),
        ]
    );
    assert!(route.accepts(Method::Get, &args("/a/1/c"), 0));
    assert!(!route.accepts(Method::Get, &args("/a/1/d"), 0));
    assert!(!route.accepts(Method::Get, &args("/A/1/c"), 0));
}

#[test]
fn test_non_identifier_braces_are_literal() {
    for segment in ["{}", "{a b}", "{a", "a}", "x{a}", "{a.b}"] {
        assert_eq!(
            RouteSegment::compile(segment),
            RouteSegment::Literal(segment.into()),
            "segment {segment}"
        );
    }
    assert_eq!(
        RouteSegment::compile("{campaign_id-2}"),
        RouteSegment::Variable("campaign_id-2".into())
    );
}

#[test]
fn test_template_query_sets_minimum() {
    let route = compile(
        Method::Get,
        "/postback/{campaign_id}?{transaction_id}=[transactionId]&{redirect_id}=[redirectId]",
        0,
    );
    assert_eq!(route.min_query_args(), 2);
    assert_eq!(route.segments().len(), 2);
    assert!(route.accepts(Method::Get, &args("/postback/XYZ?o=1&dcid=2"), 0));
    assert!(route.accepts(Method::Get, &args("/postback/XYZ?o=1&dcid=2&x=3"), 0));
    assert!(!route.accepts(Method::Get, &args("/postback/XYZ?o=1"), 0));
}

#[test]
fn test_method_and_content_length_checks() {
    let route = compile(Method::Post, "/upload", 16);
    assert!(route.accepts(Method::Post, &args("/upload"), 16));
    assert!(!route.accepts(Method::Post, &args("/upload"), 17));
    assert!(!route.accepts(Method::Put, &args("/upload"), 0));
}

#[test]
fn test_invalid_template_is_rejected() {
    let err = RoutePattern::<()>::compile(Method::Get, "/a?x", 0, "bad", noop, None).unwrap_err();
    assert_eq!(
        err,
        RouteCompileError::InvalidTemplate {
            template: "/a?x".to_string(),
            source: UrlParseError::MissingEquals { offset: 3 },
        }
    );
    assert!(RoutePattern::<()>::compile(Method::Get, "no-slash", 0, "bad", noop, None).is_err());
}

#[test]
fn test_empty_name_is_rejected() {
    let err = RoutePattern::<()>::compile(Method::Get, "/a", 0, "", noop, None).unwrap_err();
    assert!(matches!(err, RouteCompileError::EmptyName { .. }));
}

#[test]
fn test_counter_only_counts_wins() {
    let counter = Arc::new(AtomicRouteCounter::new());
    let route = RoutePattern::<()>::compile(
        Method::Get,
        "/hit",
        0,
        "hit",
        noop,
        Some(Arc::clone(&counter) as _),
    )
    .unwrap();
    assert!(route.try_match(Method::Get, &args("/hit"), 0));
    assert!(!route.try_match(Method::Get, &args("/miss"), 0));
    assert!(route.accepts(Method::Get, &args("/hit"), 0));
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_first_registration_wins() {
    let mut builder = RouteTable::<()>::builder();
    builder
        .route(Method::Get, "/{name}", 0, "any", noop)
        .unwrap()
        .route(Method::Get, "/exact", 0, "exact", noop)
        .unwrap();
    let table = builder.build();
    let matched = table.find(Method::Get, args("/exact"), 0).into_match().unwrap();
    assert_eq!(matched.pattern.name(), "any");
    assert_eq!(matched.variable("name"), Some("exact"));
}

#[test]
fn test_failed_registration_leaves_builder_unchanged() {
    let mut builder = RouteTable::<()>::builder();
    assert!(builder.route(Method::Get, "/a?b", 0, "bad", noop).is_err());
    builder.route(Method::Get, "/a", 0, "good", noop).unwrap();
    let table = builder.build();
    assert_eq!(table.len(), 1);
    assert_eq!(table.iter().next().map(|r| r.name()), Some("good"));
}

#[test]
fn test_repeated_variable_last_wins() {
    let mut builder = RouteTable::<()>::builder();
    builder
        .route(Method::Get, "/org/{id}/user/{id}", 0, "user", noop)
        .unwrap();
    let table = builder.build();
    let matched = table
        .find(Method::Get, args("/org/1/user/2"), 0)
        .into_match()
        .unwrap();
    assert_eq!(matched.variable("id"), Some("2"));
    assert_eq!(matched.variable("missing"), None);
}
