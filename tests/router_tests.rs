//! Integration tests for route compilation and first-match lookup
//!
//! Drives the public `RouteTable` API the way an application registers its
//! routes at startup, then checks which route each request resolves to.

use std::sync::Arc;
use switchyard::dispatcher::{Handler, HandlerOutcome, RequestContext};
use switchyard::http::HttpResponse;
use switchyard::router::{AtomicRouteCounter, RouteCounter, RouteSegment, RouteTable};
use switchyard::token::Method;
use switchyard::url::UrlArguments;

struct App;

fn noop(_app: Arc<App>, ctx: RequestContext, _at: std::time::SystemTime) -> Box<dyn Handler> {
    Box::new(move || -> HandlerOutcome { Ok(ctx.into_response()) })
}

fn campaign_table() -> RouteTable<App> {
    let mut builder = RouteTable::builder();
    builder
        .route(Method::Get, "/{fileName}", 0, "Get-File", noop)
        .unwrap()
        .route(
            Method::Get,
            "/postback/{campaign_id}?transaction_id=t&redirect_id=r",
            0,
            "Get-Postback",
            noop,
        )
        .unwrap()
        .route(
            Method::Post,
            "/data/{campaignId}/{transactionId}",
            32768,
            "Post-Collected-Data",
            noop,
        )
        .unwrap()
        .route(Method::Get, "/redirect/{campaignId}", 0, "Get-Redirect", noop)
        .unwrap();
    builder.build()
}

fn resolve(table: &RouteTable<App>, method: Method, target: &str, len: usize) -> Option<String> {
    let args = UrlArguments::parse(target).unwrap();
    table
        .find(method, args, len)
        .into_match()
        .map(|m| m.pattern.name().to_string())
}

#[test]
fn test_campaign_table_resolution() {
    let table = campaign_table();
    let cases: &[(Method, &str, usize, Option<&str>)] = &[
        (Method::Get, "/favicon.ico", 0, Some("Get-File")),
        (Method::Get, "/movie.swf", 0, Some("Get-File")),
        (Method::Get, "/postback/XYZ?o=1&dcid=2", 0, Some("Get-Postback")),
        (Method::Get, "/postback/XYZ?o=1", 0, None),
        (Method::Get, "/postback/XYZ", 0, None),
        (Method::Get, "/redirect/AAAA?r=http://example.com", 0, Some("Get-Redirect")),
        (Method::Post, "/data/AAAA/BBBB", 100, Some("Post-Collected-Data")),
        (Method::Post, "/data/AAAA/BBBB", 32768, Some("Post-Collected-Data")),
        (Method::Post, "/data/AAAA/BBBB", 32769, None),
        (Method::Get, "/data/AAAA/BBBB", 0, None),
        (Method::Put, "/favicon.ico", 0, None),
        (Method::Get, "/a/b/c/d", 0, None),
    ];
    for (method, target, len, expected) in cases {
        assert_eq!(
            resolve(&table, *method, target, *len).as_deref(),
            *expected,
            "{method} {target} ({len} bytes)"
        );
    }
}

#[test]
fn test_variables_bind_to_segments() {
    let table = campaign_table();
    let args = UrlArguments::parse("/data/AAAAQAAQABAAAAAAAAAAAA/0ZpVzpXKOkSg_cqeEzjdNw").unwrap();
    let m = table.find(Method::Post, args, 10).into_match().unwrap();
    assert_eq!(m.variable("campaignId"), Some("AAAAQAAQABAAAAAAAAAAAA"));
    assert_eq!(m.variable("transactionId"), Some("0ZpVzpXKOkSg_cqeEzjdNw"));
    assert_eq!(m.variable("fileName"), None);
    assert_eq!(&*m.info().template, "/data/{campaignId}/{transactionId}");
}

#[test]
fn test_empty_segments_are_significant() {
    let mut builder = RouteTable::<App>::builder();
    builder
        .route(Method::Get, "/a//b", 0, "double", noop)
        .unwrap()
        .route(Method::Get, "/a/", 0, "trailing", noop)
        .unwrap()
        .route(Method::Get, "/", 0, "root", noop)
        .unwrap();
    let table = builder.build();

    assert_eq!(resolve(&table, Method::Get, "/a//b", 0).as_deref(), Some("double"));
    assert_eq!(resolve(&table, Method::Get, "/a/b", 0), None);
    assert_eq!(resolve(&table, Method::Get, "/a/", 0).as_deref(), Some("trailing"));
    assert_eq!(resolve(&table, Method::Get, "/a", 0), None);
    assert_eq!(resolve(&table, Method::Get, "/", 0).as_deref(), Some("root"));
}

#[test]
fn test_registration_order_decides_overlaps() {
    let mut builder = RouteTable::<App>::builder();
    builder
        .route(Method::Get, "/users/{id}", 0, "by-id", noop)
        .unwrap()
        .route(Method::Get, "/users/me", 0, "me", noop)
        .unwrap();
    let table = builder.build();
    // the literal route is shadowed because the variable route was registered first
    assert_eq!(resolve(&table, Method::Get, "/users/me", 0).as_deref(), Some("by-id"));

    let mut builder = RouteTable::<App>::builder();
    builder
        .route(Method::Get, "/users/me", 0, "me", noop)
        .unwrap()
        .route(Method::Get, "/users/{id}", 0, "by-id", noop)
        .unwrap();
    let table = builder.build();
    assert_eq!(resolve(&table, Method::Get, "/users/me", 0).as_deref(), Some("me"));
    assert_eq!(resolve(&table, Method::Get, "/users/42", 0).as_deref(), Some("by-id"));
}

#[test]
fn test_compiled_segments() {
    let table = campaign_table();
    let postback = table.iter().nth(1).unwrap();
    assert_eq!(postback.min_query_args(), 2);
    assert_eq!(
        postback.segments(),
        &[
            RouteSegment::Literal("postback".into()),
            RouteSegment::Variable("campaign_id".into()),
        ]
    );
    let data = table.iter().nth(2).unwrap();
    assert_eq!(data.max_content_length(), 32768);
    assert_eq!(data.min_query_args(), 0);
}

#[test]
fn test_counters_track_wins_per_route() {
    let files = Arc::new(AtomicRouteCounter::new());
    let redirects = Arc::new(AtomicRouteCounter::new());

    let mut builder = RouteTable::<App>::builder();
    builder
        .counted_route(
            Method::Get,
            "/{fileName}",
            0,
            "Get-File",
            noop,
            Some(Arc::clone(&files) as Arc<dyn RouteCounter>),
        )
        .unwrap()
        .counted_route(
            Method::Get,
            "/redirect/{campaignId}",
            0,
            "Get-Redirect",
            noop,
            Some(Arc::clone(&redirects) as Arc<dyn RouteCounter>),
        )
        .unwrap();
    let table = builder.build();

    for target in ["/a", "/b", "/redirect/x", "/nothing/here/at/all"] {
        let _ = table.find(Method::Get, UrlArguments::parse(target).unwrap(), 0);
    }
    assert_eq!(files.get(), 2);
    assert_eq!(redirects.get(), 1);
}

#[test]
fn test_invalid_templates_are_rejected() {
    let mut builder = RouteTable::<App>::builder();
    assert!(builder.route(Method::Get, "no-slash", 0, "bad", noop).is_err());
    assert!(builder.route(Method::Get, "/x?flag", 0, "bad", noop).is_err());
    assert!(builder.route(Method::Get, "/x", 0, "", noop).is_err());
    assert!(builder.build().is_empty());
}

#[test]
fn test_matched_handler_runs() {
    let mut builder = RouteTable::<App>::builder();
    builder
        .route(Method::Get, "/hello/{name}", 0, "hello", |_, ctx, _| {
            Box::new(move || -> HandlerOutcome {
                let name = ctx.variable("name").unwrap_or_default();
                Ok(HttpResponse::content(format!("hi {name}"), "text/plain"))
            }) as Box<dyn Handler>
        })
        .unwrap();
    let table = builder.build();

    let m = table
        .find(Method::Get, UrlArguments::parse("/hello/ada").unwrap(), 0)
        .into_match()
        .unwrap();
    let request = switchyard::http::HttpRequest {
        request_id: switchyard::ids::RequestId::new(),
        method: Method::Get,
        arguments: m.arguments.clone(),
        headers: Default::default(),
        remote: None,
        body: Vec::new(),
    };
    let ctx = RequestContext::new(request, Arc::clone(m.info()));
    let handler = m.pattern.build_handler(Arc::new(App), ctx, std::time::SystemTime::now());
    let res = handler.try_process().unwrap();
    assert_eq!(res.body(), b"hi ada");
}
