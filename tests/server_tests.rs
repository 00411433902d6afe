//! End-to-end tests over a real TCP listener
//!
//! # Test Coverage
//!
//! - Malformed targets, unknown methods and unmatched routes answer `400`
//!   with an empty body and keep the server running
//! - Matched routes answer with the handler's response
//! - Keep-alive and pipelined requests on one connection
//! - Framing failures (chunked bodies, oversized bodies) close the connection
//! - Compressed request bodies reach handlers decoded
//!
//! Every fixture binds `127.0.0.1:0` and stops its server on drop.

mod common;

use common::http::{parse_responses, send_raw, send_request};
use common::test_server::setup_may_runtime;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use switchyard::dispatcher::{Dispatcher, Handler, HandlerError, HandlerOutcome, RequestContext};
use switchyard::http::HttpResponse;
use switchyard::router::{AtomicRouteCounter, RouteCounter, RouteTable};
use switchyard::server::{ConnectionLimits, HttpServer, ServerHandle};
use switchyard::token::Method;

struct Catalogue;

fn handler<F>(ctx: RequestContext, f: F) -> Box<dyn Handler>
where
    F: FnOnce(RequestContext) -> HandlerOutcome + Send + 'static,
{
    Box::new(move || f(ctx))
}

/// Test fixture with automatic teardown
struct TestServer {
    addr: SocketAddr,
    file_hits: Arc<AtomicRouteCounter>,
    handle: Option<ServerHandle>,
}

impl TestServer {
    fn new() -> Self {
        setup_may_runtime();
        let file_hits = Arc::new(AtomicRouteCounter::new());

        let mut builder = RouteTable::<Catalogue>::builder();
        builder
            .counted_route(
                Method::Get,
                "/{fileName}",
                0,
                "get-file",
                |_, ctx, _| {
                    handler(ctx, |ctx| {
                        let name = ctx.variable("fileName").unwrap_or_default().to_string();
                        Ok(HttpResponse::content(name, "text/plain"))
                    })
                },
                Some(Arc::clone(&file_hits) as Arc<dyn RouteCounter>),
            )
            .unwrap()
            .route(
                Method::Get,
                "/postback/{campaign_id}?transaction_id=t&redirect_id=r",
                0,
                "get-postback",
                |_, ctx, _| {
                    handler(ctx, |ctx| {
                        let id = ctx.variable("campaign_id").unwrap_or_default();
                        Ok(HttpResponse::content(format!("postback:{id}"), "text/plain"))
                    })
                },
            )
            .unwrap()
            .route(Method::Post, "/echo", 1024, "post-echo", |_, ctx, _| {
                handler(ctx, |ctx| {
                    let text = ctx.request.body_text()?;
                    Ok(HttpResponse::content(text, "text/plain"))
                })
            })
            .unwrap()
            .route(Method::Get, "/fail/now", 0, "get-fail", |_, ctx, _| {
                handler(ctx, |_| Err(HandlerError::new("refused")))
            })
            .unwrap();

        let dispatcher = Dispatcher::new(Arc::new(builder.build()), Arc::new(Catalogue));
        let limits = ConnectionLimits {
            max_head_bytes: 1024,
            max_body_bytes: 4096,
            read_timeout: Some(std::time::Duration::from_secs(5)),
        };
        let handle = HttpServer::new(dispatcher)
            .with_limits(limits)
            .start("127.0.0.1:0")
            .unwrap();
        handle.wait_ready().unwrap();

        Self {
            addr: handle.addr(),
            file_hits,
            handle: Some(handle),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[test]
fn test_matched_route_gets_handler_response() {
    let server = TestServer::new();
    let res = send_request(server.addr, "GET", "/favicon.ico");
    assert_eq!(res.status, 200);
    assert_eq!(res.body_text(), "favicon.ico");
    assert_eq!(res.header("Content-Type"), Some("text/plain"));
    assert_eq!(res.header("Content-Length"), Some("11"));
    assert_eq!(server.file_hits.get(), 1);

    let res = send_request(server.addr, "GET", "/postback/XYZ?o=1&dcid=2");
    assert_eq!(res.status, 200);
    assert_eq!(res.body_text(), "postback:XYZ");
}

#[test]
fn test_malformed_target_is_bad_request() {
    let server = TestServer::new();
    for target in ["/a?x", "/a?x=", "/a?x=1&&y=2", "nopath"] {
        let res = send_request(server.addr, "GET", target);
        assert_eq!(res.status, 400, "{target}");
        assert_eq!(res.header("Content-Length"), Some("0"), "{target}");
        assert!(res.body.is_empty());
    }
}

#[test]
fn test_unknown_method_is_bad_request() {
    let server = TestServer::new();
    for method in ["BREW", "get", "PROPFIND"] {
        let res = send_request(server.addr, method, "/favicon.ico");
        assert_eq!(res.status, 400, "{method}");
        assert_eq!(res.header("Content-Length"), Some("0"));
    }
    assert_eq!(server.file_hits.get(), 0);
}

#[test]
fn test_unmatched_route_is_bad_request() {
    let server = TestServer::new();
    for (method, target) in [
        ("GET", "/postback/XYZ?o=1"),
        ("GET", "/a/b/c"),
        ("DELETE", "/favicon.ico"),
        ("POST", "/favicon.ico"),
    ] {
        let res = send_request(server.addr, method, target);
        assert_eq!(res.status, 400, "{method} {target}");
        assert_eq!(res.header("Content-Length"), Some("0"));
    }
}

#[test]
fn test_handler_error_is_bad_request() {
    let server = TestServer::new();
    let res = send_request(server.addr, "GET", "/fail/now");
    assert_eq!(res.status, 400);
    assert!(res.body.is_empty());
}

#[test]
fn test_keep_alive_serves_pipelined_requests() {
    let server = TestServer::new();
    let raw = send_raw(
        server.addr,
        b"GET /one HTTP/1.1\r\nHost: x\r\n\r\n\
          GET /a?x HTTP/1.1\r\nHost: x\r\n\r\n\
          GET /two HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
    );
    let responses = parse_responses(&raw);
    let statuses: Vec<u16> = responses.iter().map(|r| r.status).collect();
    assert_eq!(statuses, [200, 400, 200]);
    assert_eq!(responses[0].body_text(), "one");
    assert_eq!(responses[2].body_text(), "two");
    assert_eq!(responses[2].header("Connection"), Some("close"));
    assert_eq!(server.file_hits.get(), 2);
}

#[test]
fn test_body_is_read_by_content_length() {
    let server = TestServer::new();
    let raw = send_raw(
        server.addr,
        b"POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
    );
    let res = parse_responses(&raw).remove(0);
    assert_eq!(res.status, 200);
    assert_eq!(res.body_text(), "hello");
}

#[test]
fn test_gzip_body_is_decoded_for_handler() {
    let server = TestServer::new();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"compressed payload").unwrap();
    let body = encoder.finish().unwrap();

    let mut req = format!(
        "POST /echo HTTP/1.1\r\nHost: x\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    req.extend_from_slice(&body);

    let res = parse_responses(&send_raw(server.addr, &req)).remove(0);
    assert_eq!(res.status, 200);
    assert_eq!(res.body_text(), "compressed payload");
}

#[test]
fn test_route_content_limit_is_bad_request() {
    let server = TestServer::new();
    let body = "x".repeat(2000);
    let req = format!(
        "POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let res = parse_responses(&send_raw(server.addr, req.as_bytes())).remove(0);
    assert_eq!(res.status, 400);
}

#[test]
fn test_framing_errors_close_connection() {
    let server = TestServer::new();
    let chunked = send_raw(
        server.addr,
        b"POST /echo HTTP/1.1\r\nHost: x\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
    );
    let responses = parse_responses(&chunked);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].status, 400);
    assert_eq!(responses[0].header("Connection"), Some("close"));

    let oversized = send_raw(
        server.addr,
        b"POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 999999\r\n\r\n",
    );
    let responses = parse_responses(&oversized);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].status, 400);

    let bad_length = send_raw(
        server.addr,
        b"POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: ten\r\n\r\n",
    );
    assert_eq!(parse_responses(&bad_length)[0].status, 400);

    // a second length would frame "hello" as the next request
    let conflicting = send_raw(
        server.addr,
        b"POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\nContent-Length: 5\r\n\r\nhello",
    );
    let responses = parse_responses(&conflicting);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].status, 400);
    assert_eq!(responses[0].header("Connection"), Some("close"));
}

#[test]
fn test_oversized_head_is_rejected() {
    let server = TestServer::new();
    let req = format!(
        "GET /favicon.ico HTTP/1.1\r\nHost: x\r\nX-Padding: {}\r\n\r\n",
        "p".repeat(1500)
    );
    let responses = parse_responses(&send_raw(server.addr, req.as_bytes()));
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].status, 400);
    assert_eq!(responses[0].header("Connection"), Some("close"));
}

#[test]
fn test_http10_closes_by_default() {
    let server = TestServer::new();
    let raw = send_raw(server.addr, b"GET /legacy HTTP/1.0\r\n\r\n");
    let res = parse_responses(&raw).remove(0);
    assert_eq!(res.status, 200);
    assert_eq!(res.body_text(), "legacy");
}

#[test]
fn test_server_stops_accepting() {
    let server = TestServer::new();
    let addr = server.addr;
    assert_eq!(send_request(addr, "GET", "/ping").status, 200);
    drop(server);
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(std::net::TcpStream::connect(addr).is_err());
}
