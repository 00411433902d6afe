use super::body::{self, BodyError};
use super::headers::StandardHeader;
use crate::ids::RequestId;
use crate::token::{ContentCoding, ContentCodings, Method};
use crate::url::UrlArguments;
use smallvec::SmallVec;
use std::net::SocketAddr;
use std::sync::Arc;

/// Headers kept inline per class before spilling to the heap.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Headers found in the static table, keyed by their table entry.
pub type StandardHeaderVec = SmallVec<[(StandardHeader, String); MAX_INLINE_HEADERS]>;

/// Headers not in the static table, in arrival order.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request headers split into standard and custom fields.
///
/// Order within each class is arrival order. Lookups return the first
/// occurrence of a repeated field.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    standard: StandardHeaderVec,
    custom: HeaderVec,
}

impl RequestHeaders {
    /// Classify raw `(name, value)` pairs against the static header table.
    #[must_use]
    pub fn classify<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let name = name.as_ref();
            match StandardHeader::from_name(name) {
                Some(header) => headers.standard.push((header, value.into())),
                None => headers.custom.push((Arc::from(name), value.into())),
            }
        }
        headers
    }

    #[must_use]
    pub fn standard(&self, header: StandardHeader) -> Option<&str> {
        self.standard
            .iter()
            .find(|(h, _)| *h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Look up any header by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        match StandardHeader::from_name(name) {
            Some(header) => self.standard(header),
            None => self
                .custom
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
        }
    }

    pub fn standard_iter(&self) -> impl Iterator<Item = (StandardHeader, &str)> {
        self.standard.iter().map(|(h, v)| (*h, v.as_str()))
    }

    pub fn custom_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom.iter().map(|(n, v)| (n.as_ref(), v.as_str()))
    }

    #[must_use]
    pub fn standard_count(&self) -> usize {
        self.standard.len()
    }

    #[must_use]
    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }
}

/// A decoded request as seen by a handler.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub request_id: RequestId,
    pub method: Method,
    pub arguments: UrlArguments,
    pub headers: RequestHeaders,
    pub remote: Option<SocketAddr>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Body length in bytes, as used for route matching.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Codings listed in `Accept-Encoding`; empty when the header is absent.
    #[must_use]
    pub fn accept_codings(&self) -> ContentCodings {
        self.headers
            .standard(StandardHeader::AcceptEncoding)
            .map(ContentCodings::parse)
            .unwrap_or_default()
    }

    /// Coding named by `Content-Encoding`, if recognised.
    #[must_use]
    pub fn content_coding(&self) -> Option<ContentCoding> {
        self.headers
            .standard(StandardHeader::ContentEncoding)
            .and_then(ContentCoding::first_in)
    }

    /// Body with its content-coding removed, as UTF-8 text, capped at
    /// [`body::MAX_DECODED_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`BodyError`] if the body cannot be decompressed, expands past
    /// the cap or is not UTF-8.
    pub fn body_text(&self) -> Result<String, BodyError> {
        self.body_text_within(body::MAX_DECODED_BYTES)
    }

    /// [`body_text`](Self::body_text) with an explicit cap on the decoded size.
    ///
    /// # Errors
    ///
    /// Same as [`body_text`](Self::body_text).
    pub fn body_text_within(&self, limit: usize) -> Result<String, BodyError> {
        body::decode_text(&self.body, self.content_coding(), limit)
    }

    /// Value of the cookie `name` from the `Cookie` header.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .standard(StandardHeader::Cookie)?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}
