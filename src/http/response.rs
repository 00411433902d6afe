use super::body::{self, BodyError};
use super::headers::StandardHeader;
use super::status::status_line_reason;
use crate::token::{ContentCoding, ContentCodings};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::io::{self, Write};

/// Response header storage; eight headers stay inline.
pub type ResponseHeaders = SmallVec<[(Cow<'static, str>, String); 8]>;

/// Response under construction by a handler.
///
/// Starts as an empty `200 OK`. The listener adds `Content-Length` (and
/// `Connection: close` when the connection will not be reused) at write time,
/// so handlers only set what is specific to their reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    headers: ResponseHeaders,
    body: Vec<u8>,
    keep_alive: bool,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: SmallVec::new(),
            body: Vec::new(),
            keep_alive: true,
        }
    }
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Empty `200 OK`.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Empty `400 Bad Request`. The connection is kept open.
    #[must_use]
    pub fn bad_request() -> Self {
        Self::new(400)
    }

    /// Redirect to `location` with the given 3xx status.
    #[must_use]
    pub fn redirect(location: impl Into<String>, status: u16) -> Self {
        let mut res = Self::new(status);
        res.add_standard_header(StandardHeader::Location, location);
        res
    }

    /// `302 Found` redirect.
    #[must_use]
    pub fn found(location: impl Into<String>) -> Self {
        Self::redirect(location, 302)
    }

    /// `200 OK` carrying `content` as-is.
    #[must_use]
    pub fn content(content: impl Into<Vec<u8>>, content_type: &str) -> Self {
        let mut res = Self::ok();
        res.set_content(content, content_type);
        res
    }

    /// `200 OK` carrying `content`, compressed with the coding the client
    /// prefers among those it accepts (deflate, then gzip, then none).
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Encode`] if compression fails.
    pub fn compressed_content(
        content: &[u8],
        content_type: &str,
        accepted: ContentCodings,
    ) -> Result<Self, BodyError> {
        let coding = [ContentCoding::Deflate, ContentCoding::Gzip]
            .into_iter()
            .find(|c| accepted.contains(*c));
        let Some(coding) = coding else {
            return Ok(Self::content(content, content_type));
        };

        let mut res = Self::content(body::encode(content, coding)?, content_type);
        res.add_standard_header(StandardHeader::ContentEncoding, coding.as_str());
        Ok(res)
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>, content_type: &str) {
        self.body = content.into();
        self.remove_header(StandardHeader::ContentType.name());
        self.add_standard_header(StandardHeader::ContentType, content_type);
    }

    /// Whether the listener may reuse the connection after this response.
    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    pub fn add_header(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn add_standard_header(&mut self, header: StandardHeader, value: impl Into<String>) {
        self.headers.push((Cow::Borrowed(header.name()), value.into()));
    }

    /// Append a `Set-Cookie` header.
    pub fn add_cookie(&mut self, name: &str, value: &str) {
        self.add_standard_header(StandardHeader::SetCookie, format!("{name}={value}"));
    }

    fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// First value of the header `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_ref(), v.as_str()))
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Serialize as an HTTP/1.1 message.
    ///
    /// `Content-Length` always reflects the body; the body itself is omitted
    /// when `head_only` is set (responses to `HEAD`).
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn write_to<W: Write>(&self, out: &mut W, head_only: bool) -> io::Result<()> {
        write!(
            out,
            "HTTP/1.1 {} {}\r\n",
            self.status,
            status_line_reason(self.status)
        )?;
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case(StandardHeader::ContentLength.name())
                || name.eq_ignore_ascii_case(StandardHeader::Connection.name())
            {
                continue;
            }
            write!(out, "{name}: {value}\r\n")?;
        }
        write!(out, "Content-Length: {}\r\n", self.body.len())?;
        if !self.keep_alive {
            out.write_all(b"Connection: close\r\n")?;
        }
        out.write_all(b"\r\n")?;
        if !head_only {
            out.write_all(&self.body)?;
        }
        Ok(())
    }
}
