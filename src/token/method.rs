use super::pack;
use std::fmt;
use std::str::FromStr;

/// HTTP request method recognised by the router.
///
/// The set is closed: anything outside these nine verbs is rejected by
/// [`Method::decode`] and the request is treated as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Convert the connection to a transparent TCP/IP tunnel.
    Connect,
    /// Delete the specified resource.
    Delete,
    /// Return a representation of the specified resource.
    Get,
    /// Same as `Get` without the response body.
    Head,
    /// Return the methods valid for the resource.
    Options,
    /// Apply a partial modification to the resource.
    Patch,
    /// Create a resource from the enclosed entity.
    Post,
    /// Create or replace the resource with the enclosed entity.
    Put,
    /// Echo the received request back to the client.
    Trace,
}

const GET: u64 = pack(b"GET");
const PUT: u64 = pack(b"PUT");
const HEAD: u64 = pack(b"HEAD");
const POST: u64 = pack(b"POST");
const PATCH: u64 = pack(b"PATCH");
const TRACE: u64 = pack(b"TRACE");
const DELETE: u64 = pack(b"DELETE");
const CONNECT: u64 = pack(b"CONNECT");
const OPTIONS: u64 = pack(b"OPTIONS");

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Method; 9] = [
        Method::Connect,
        Method::Delete,
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Patch,
        Method::Post,
        Method::Put,
        Method::Trace,
    ];

    /// Decode a request-line method token.
    ///
    /// Dispatches on the token length first (only 3 to 7 bytes can be valid),
    /// then compares the packed bytes against the constants for that length.
    /// Matching is exact and case-sensitive: `"get"` is not `GET`.
    ///
    /// # Returns
    ///
    /// `None` for any unknown token, including the empty string.
    #[inline]
    #[must_use]
    pub fn decode(token: &str) -> Option<Method> {
        let bytes = token.as_bytes();
        if !(3..=7).contains(&bytes.len()) {
            return None;
        }
        let word = pack(bytes);

        match bytes.len() {
            3 => match word {
                GET => Some(Method::Get),
                PUT => Some(Method::Put),
                _ => None,
            },
            4 => match word {
                HEAD => Some(Method::Head),
                POST => Some(Method::Post),
                _ => None,
            },
            5 => match word {
                PATCH => Some(Method::Patch),
                TRACE => Some(Method::Trace),
                _ => None,
            },
            6 => match word {
                DELETE => Some(Method::Delete),
                _ => None,
            },
            7 => match word {
                CONNECT => Some(Method::Connect),
                OPTIONS => Some(Method::Options),
                _ => None,
            },
            _ => None,
        }
    }

    /// Canonical upper-case spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Connect => "CONNECT",
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that is not one of the nine methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod {
    /// The rejected token
    pub token: String,
}

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HTTP method '{}'", self.token)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::decode(s).ok_or_else(|| UnknownMethod {
            token: s.to_string(),
        })
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Connect => http::Method::CONNECT,
            Method::Delete => http::Method::DELETE,
            Method::Get => http::Method::GET,
            Method::Head => http::Method::HEAD,
            Method::Options => http::Method::OPTIONS,
            Method::Patch => http::Method::PATCH,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Trace => http::Method::TRACE,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnknownMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}
