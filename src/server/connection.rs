//! HTTP/1.1 framing for one accepted connection.
//!
//! Requests are read with `httparse`, bodies are delimited by
//! `Content-Length` only, and each response is written in full before the
//! next request is read. Framing failures are answered with `400` and the
//! connection is closed.

use crate::dispatcher::{Dispatcher, RawRequest};
use crate::http::HttpResponse;
use crate::runtime_config::ServerConfig;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Header fields parsed per request head.
pub const MAX_HEADERS: usize = 64;

const READ_CHUNK: usize = 4096;

/// Per-connection limits, taken from [`ServerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_head_bytes: config.max_head_bytes,
            max_body_bytes: config.max_body_bytes,
            read_timeout: config.read_timeout,
        }
    }
}

/// A request read off the wire, plus what the connection needs afterwards.
#[derive(Debug)]
pub(crate) struct Frame {
    pub raw: RawRequest,
    pub keep_alive: bool,
    pub head_only: bool,
}

#[derive(Debug)]
pub(crate) enum FrameError {
    /// The peer sent something that is not a request we can frame
    BadRequest(&'static str),
    /// The transport failed or timed out
    Io(io::Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BadRequest(reason) => f.write_str(reason),
            FrameError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        FrameError::Io(e)
    }
}

/// Owned copy of a parsed request head.
struct Head {
    len: usize,
    method: String,
    target: String,
    version: u8,
    headers: Vec<(String, String)>,
}

impl Head {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared body length. Repeated fields, or list values such as
    /// `5, 5`, must all agree.
    fn content_length(&self) -> Result<usize, FrameError> {
        let mut declared = None;
        let values = self
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("Content-Length"))
            .flat_map(|(_, v)| v.split(','));
        for value in values {
            let len = value
                .trim()
                .parse::<usize>()
                .map_err(|_| FrameError::BadRequest("invalid Content-Length"))?;
            match declared {
                Some(prev) if prev != len => {
                    return Err(FrameError::BadRequest("conflicting Content-Length"))
                }
                _ => declared = Some(len),
            }
        }
        Ok(declared.unwrap_or(0))
    }

    fn connection_has(&self, token: &str) -> bool {
        self.header("Connection").is_some_and(|v| {
            v.split(',')
                .any(|t| t.trim().eq_ignore_ascii_case(token))
        })
    }

    fn keep_alive(&self) -> bool {
        if self.version == 0 {
            self.connection_has("keep-alive")
        } else {
            !self.connection_has("close")
        }
    }
}

fn parse_head(buf: &[u8]) -> Result<Option<Head>, FrameError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let len = match req.parse(buf) {
        Ok(httparse::Status::Complete(len)) => len,
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(httparse::Error::TooManyHeaders) => {
            return Err(FrameError::BadRequest("too many header fields"))
        }
        Err(_) => return Err(FrameError::BadRequest("unparseable request head")),
    };

    Ok(Some(Head {
        len,
        method: req.method.unwrap_or_default().to_string(),
        target: req.path.unwrap_or_default().to_string(),
        version: req.version.unwrap_or(1),
        headers: req
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_string(),
                    String::from_utf8_lossy(h.value).into_owned(),
                )
            })
            .collect(),
    }))
}

/// Read the next request from `stream`.
///
/// `buf` carries bytes between calls so pipelined requests are not lost.
/// Returns `Ok(None)` when the peer closes cleanly between requests.
pub(crate) fn read_frame<R: Read>(
    stream: &mut R,
    buf: &mut Vec<u8>,
    remote: Option<SocketAddr>,
    limits: &ConnectionLimits,
) -> Result<Option<Frame>, FrameError> {
    let mut chunk = [0u8; READ_CHUNK];

    let head = loop {
        if !buf.is_empty() {
            if let Some(head) = parse_head(buf)? {
                break head;
            }
        }
        if buf.len() >= limits.max_head_bytes {
            return Err(FrameError::BadRequest("request head too large"));
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(FrameError::Io(io::ErrorKind::UnexpectedEof.into()));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if head.len > limits.max_head_bytes {
        return Err(FrameError::BadRequest("request head too large"));
    }
    if head.header("Transfer-Encoding").is_some() {
        return Err(FrameError::BadRequest("transfer-encoded bodies are not supported"));
    }
    let content_length = head.content_length()?;
    if content_length > limits.max_body_bytes {
        return Err(FrameError::BadRequest("request body too large"));
    }

    buf.drain(..head.len);
    let mut keep_alive = head.keep_alive();
    let body = match fill(stream, buf, content_length, &mut chunk) {
        Ok(()) => {
            let rest = buf.split_off(content_length);
            Ok(std::mem::replace(buf, rest))
        }
        Err(e) => {
            keep_alive = false;
            buf.clear();
            Err(e)
        }
    };

    let head_only = head.method == "HEAD";
    Ok(Some(Frame {
        raw: RawRequest {
            target: head.target,
            method: head.method,
            headers: head.headers,
            remote,
            body,
        },
        keep_alive,
        head_only,
    }))
}

fn fill<R: Read>(
    stream: &mut R,
    buf: &mut Vec<u8>,
    want: usize,
    chunk: &mut [u8],
) -> io::Result<()> {
    while buf.len() < want {
        let n = stream.read(chunk)?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

/// Serve requests on one connection until it closes.
pub(crate) fn serve<S, T>(
    stream: &mut T,
    remote: Option<SocketAddr>,
    dispatcher: &Dispatcher<S>,
    limits: &ConnectionLimits,
    accepted_at: SystemTime,
) where
    T: Read + Write,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut accept_time = accepted_at;
    let mut served = 0u64;

    loop {
        let frame = match read_frame(stream, &mut buf, remote, limits) {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(FrameError::BadRequest(reason)) => {
                warn!(remote = ?remote, reason = reason, "Rejecting unframeable request");
                let mut response = HttpResponse::bad_request();
                response.set_keep_alive(false);
                if let Err(e) = write_response(stream, &response, false) {
                    debug!(remote = ?remote, error = %e, "Failed to write 400 response");
                }
                break;
            }
            Err(FrameError::Io(e)) => {
                debug!(remote = ?remote, error = %e, "Connection read ended");
                break;
            }
        };

        let mut response = dispatcher.respond(frame.raw, accept_time);
        let keep_alive = frame.keep_alive && response.keep_alive();
        response.set_keep_alive(keep_alive);
        served += 1;

        if let Err(e) = write_response(stream, &response, frame.head_only) {
            debug!(remote = ?remote, error = %e, "Failed to write response");
            break;
        }
        if !keep_alive {
            break;
        }
        accept_time = SystemTime::now();
    }

    debug!(remote = ?remote, requests_served = served, "Connection closed");
}

fn write_response<W: Write>(
    stream: &mut W,
    response: &HttpResponse,
    head_only: bool,
) -> io::Result<()> {
    let mut out = Vec::with_capacity(256 + response.body().len());
    response.write_to(&mut out, head_only)?;
    stream.write_all(&out)?;
    stream.flush()
}
