//! Demo service served by the `switchyard` binary.
//!
//! A handful of routes over a fixed in-memory catalogue: two static files,
//! one campaign, a data upload endpoint, a postback, a redirect and a JSON
//! hit-count report. Unknown files or campaigns are reported as handler
//! failures, which the listener answers with `400`.

use crate::dispatcher::{Handler, HandlerError, HandlerOutcome, RequestContext};
use crate::http::{HttpResponse, StandardHeader};
use crate::router::{AtomicRouteCounter, RouteCompileError, RouteCounter, RouteTable};
use crate::token::Method;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Largest body accepted by the data upload route.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024;

/// Largest upload after its content-coding is removed.
pub const MAX_DECODED_UPLOAD_BYTES: usize = 4 * MAX_UPLOAD_BYTES;

const TEXT: &str = "text/plain; charset=utf-8";

/// Catalogue and per-route hit counters shared by every demo handler.
#[derive(Debug)]
pub struct DemoService {
    files: HashMap<&'static str, &'static [u8]>,
    campaigns: HashSet<String>,
    hits: BTreeMap<&'static str, Arc<AtomicRouteCounter>>,
}

impl Default for DemoService {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoService {
    #[must_use]
    pub fn new() -> Self {
        let files = HashMap::from([
            ("favicon.ico", b"ProcessFileRequest".as_slice()),
            ("movie.swf", b"ProcessFileRequest".as_slice()),
        ]);
        let campaigns = HashSet::from(["AAAAQAAQABAAAAAAAAAAAA".to_string()]);
        let hits = ["get-file", "post-data", "get-redirect", "get-postback", "get-stats"]
            .into_iter()
            .map(|name| (name, Arc::new(AtomicRouteCounter::new())))
            .collect();
        Self {
            files,
            campaigns,
            hits,
        }
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Option<&'static [u8]> {
        self.files.get(name).copied()
    }

    #[must_use]
    pub fn has_campaign(&self, id: &str) -> bool {
        self.campaigns.contains(id)
    }

    /// Wins recorded so far for the route `name`.
    #[must_use]
    pub fn hits(&self, name: &str) -> Option<u64> {
        self.hits.get(name).map(|c| c.get())
    }

    fn counter(&self, name: &str) -> Option<Arc<dyn RouteCounter>> {
        self.hits
            .get(name)
            .map(|c| Arc::clone(c) as Arc<dyn RouteCounter>)
    }
}

/// Route table for [`DemoService`].
///
/// Registration order is priority order; the file route comes first and only
/// ever sees single-segment paths.
///
/// # Errors
///
/// Returns a [`RouteCompileError`] if a template fails to compile.
pub fn route_table(service: &DemoService) -> Result<RouteTable<DemoService>, RouteCompileError> {
    let mut builder = RouteTable::<DemoService>::builder();
    builder
        .counted_route(
            Method::Get,
            "/{fileName}",
            0,
            "get-file",
            |server, ctx, _| bind(server, ctx, get_file),
            service.counter("get-file"),
        )?
        .counted_route(
            Method::Post,
            "/data/{campaignId}/{transactionId}",
            MAX_UPLOAD_BYTES,
            "post-data",
            |server, ctx, _| bind(server, ctx, post_data),
            service.counter("post-data"),
        )?
        .counted_route(
            Method::Get,
            "/redirect/{campaignId}",
            0,
            "get-redirect",
            |server, ctx, accepted| {
                bind(server, ctx, move |s, c| get_redirect(s, c, accepted))
            },
            service.counter("get-redirect"),
        )?
        .counted_route(
            Method::Get,
            "/postback/{campaign_id}?transaction_id={transaction_id}&redirect_id={redirect_id}",
            0,
            "get-postback",
            |server, ctx, _| bind(server, ctx, get_postback),
            service.counter("get-postback"),
        )?
        .counted_route(
            Method::Get,
            "/_stats/hits",
            0,
            "get-stats",
            |server, ctx, _| bind(server, ctx, get_stats),
            service.counter("get-stats"),
        )?;
    Ok(builder.build())
}

fn bind<F>(server: Arc<DemoService>, ctx: RequestContext, f: F) -> Box<dyn Handler>
where
    F: FnOnce(&DemoService, RequestContext) -> HandlerOutcome + Send + 'static,
{
    Box::new(move || f(&server, ctx))
}

fn get_file(server: &DemoService, ctx: RequestContext) -> HandlerOutcome {
    let name = ctx.variable("fileName").unwrap_or_default();
    let file = server.file(name).ok_or("unknown file")?;
    Ok(HttpResponse::compressed_content(
        file,
        TEXT,
        ctx.request.accept_codings(),
    )?)
}

fn post_data(server: &DemoService, ctx: RequestContext) -> HandlerOutcome {
    campaign(server, &ctx, "campaignId")?;
    let transaction = ctx.variable("transactionId").unwrap_or_default();
    if !is_compact_id(transaction) {
        return Err(HandlerError::new("transaction id is not a 22-character base64url value"));
    }
    let content = ctx.request.body_text_within(MAX_DECODED_UPLOAD_BYTES)?;
    debug!(
        request_id = %ctx.request.request_id,
        transaction_id = %transaction,
        content_bytes = content.len(),
        "Collected data received"
    );
    Ok(HttpResponse::content("ProcessSnifferResponse", TEXT))
}

fn get_redirect(server: &DemoService, ctx: RequestContext, accepted: SystemTime) -> HandlerOutcome {
    let campaign_id = campaign(server, &ctx, "campaignId")?;
    info!(
        request_id = %ctx.request.request_id,
        campaign_id = %campaign_id,
        accept_time_ms = ctx.request.request_id.timestamp_ms(),
        target = ?ctx.query("r"),
        "Redirect requested"
    );
    let mut res = HttpResponse::content("GetRedirectHandler", TEXT);
    if let Ok(age) = SystemTime::now().duration_since(accepted) {
        res.add_header("X-Handler-Latency-Us", age.as_micros().to_string());
    }
    Ok(res)
}

fn get_postback(server: &DemoService, ctx: RequestContext) -> HandlerOutcome {
    campaign(server, &ctx, "campaign_id")?;
    let mut res = ctx.into_response();
    res.set_content("GetPostbackHandler", TEXT);
    Ok(res)
}

#[derive(Serialize)]
struct HitReport<'a> {
    request_id: crate::ids::RequestId,
    routes: BTreeMap<&'a str, u64>,
}

fn get_stats(server: &DemoService, ctx: RequestContext) -> HandlerOutcome {
    let report = HitReport {
        request_id: ctx.request.request_id,
        routes: server
            .hits
            .iter()
            .map(|(name, counter)| (*name, counter.get()))
            .collect(),
    };
    let body = serde_json::to_vec(&report)
        .map_err(|e| HandlerError::with_source("hit report could not be encoded", e))?;
    let mut res = HttpResponse::content(body, "application/json");
    res.add_standard_header(StandardHeader::CacheControl, "no-store");
    Ok(res)
}

fn campaign<'c>(
    server: &DemoService,
    ctx: &'c RequestContext,
    variable: &str,
) -> Result<&'c str, HandlerError> {
    let id = ctx.variable(variable).unwrap_or_default();
    if server.has_campaign(id) {
        Ok(id)
    } else {
        Err(HandlerError::new("unknown campaign"))
    }
}

/// 128-bit id written as 22 unpadded base64url characters.
fn is_compact_id(value: &str) -> bool {
    value.len() == 22
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
