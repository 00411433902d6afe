use super::pack;
use std::fmt;

/// A content-coding the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCoding {
    /// No transformation
    Identity,
    /// zlib-wrapped DEFLATE (RFC 1950/1951)
    Deflate,
    /// gzip file format (RFC 1952)
    Gzip,
}

const EFLATE: u64 = pack(b"eflate");
const ZIP: u64 = pack(b"zip");
const DENTITY: u64 = pack(b"dentity");

impl ContentCoding {
    /// Return the first recognised coding in a comma-separated header value.
    ///
    /// This is the single-value mode used for `Content-Encoding`: scanning
    /// stops at the first keyword that stands as its own token.
    #[must_use]
    pub fn first_in(value: &str) -> Option<ContentCoding> {
        Scanner::new(value).next()
    }

    /// Token as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentCoding::Identity => "identity",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Gzip => "gzip",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            ContentCoding::Identity => 0b001,
            ContentCoding::Deflate => 0b010,
            ContentCoding::Gzip => 0b100,
        }
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of content-codings, one bit per [`ContentCoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentCodings(u8);

impl ContentCodings {
    /// The empty set.
    pub const NONE: ContentCodings = ContentCodings(0);

    /// Collect every recognised coding in a comma-separated header value.
    ///
    /// Multi-value mode, used for `Accept-Encoding`. Unrecognised codings are
    /// skipped and quality parameters are ignored.
    #[must_use]
    pub fn parse(value: &str) -> ContentCodings {
        Scanner::new(value).fold(ContentCodings::NONE, |mut set, coding| {
            set.insert(coding);
            set
        })
    }

    pub fn insert(&mut self, coding: ContentCoding) {
        self.0 |= coding.bit();
    }

    #[must_use]
    pub const fn contains(self, coding: ContentCoding) -> bool {
        self.0 & coding.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate members in `Identity`, `Deflate`, `Gzip` order.
    pub fn iter(self) -> impl Iterator<Item = ContentCoding> {
        [
            ContentCoding::Identity,
            ContentCoding::Deflate,
            ContentCoding::Gzip,
        ]
        .into_iter()
        .filter(move |c| self.contains(*c))
    }

    /// Coding to use for a response: deflate, then gzip, then identity.
    ///
    /// Returns `None` only for the empty set.
    #[must_use]
    pub fn preferred(self) -> Option<ContentCoding> {
        [
            ContentCoding::Deflate,
            ContentCoding::Gzip,
            ContentCoding::Identity,
        ]
        .into_iter()
        .find(|c| self.contains(*c))
    }
}

impl FromIterator<ContentCoding> for ContentCodings {
    fn from_iter<I: IntoIterator<Item = ContentCoding>>(iter: I) -> Self {
        let mut set = ContentCodings::NONE;
        for coding in iter {
            set.insert(coding);
        }
        set
    }
}

/// Left-to-right keyword scanner over a header value.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(value: &'a str) -> Self {
        Self {
            bytes: value.as_bytes(),
            pos: 0,
        }
    }

    fn starts_token(&self, at: usize) -> bool {
        at == 0 || matches!(self.bytes[at - 1], b',' | b' ' | b'\t')
    }

    fn ends_token(&self, at: usize) -> bool {
        at == self.bytes.len() || matches!(self.bytes[at], b',' | b';' | b' ' | b'\t')
    }

    /// Compare the `len` bytes after the lead byte at `at` against `word`.
    fn tail_is(&self, at: usize, word: u64, len: usize) -> bool {
        let end = at + 1 + len;
        end <= self.bytes.len() && pack(&self.bytes[at + 1..end]) == word && self.ends_token(end)
    }
}

impl Iterator for Scanner<'_> {
    type Item = ContentCoding;

    fn next(&mut self) -> Option<ContentCoding> {
        while self.pos < self.bytes.len() {
            let at = self.pos;
            if self.starts_token(at) {
                let hit = match self.bytes[at] {
                    b'd' if self.tail_is(at, EFLATE, 6) => Some((ContentCoding::Deflate, 7)),
                    b'g' if self.tail_is(at, ZIP, 3) => Some((ContentCoding::Gzip, 4)),
                    b'i' if self.tail_is(at, DENTITY, 7) => Some((ContentCoding::Identity, 8)),
                    _ => None,
                };
                if let Some((coding, len)) = hit {
                    self.pos = at + len;
                    return Some(coding);
                }
            }
            self.pos += 1;
        }
        None
    }
}
