use smallvec::SmallVec;
use std::fmt;

/// Segments and query pairs kept inline before spilling to the heap.
pub const MAX_INLINE_ARGS: usize = 8;

/// Half-open byte range into the owned target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Why a request-target was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlParseError {
    /// The target is empty or does not begin with `/`
    MissingLeadingSlash,
    /// A query clause is empty (`a=1&&b=2`, or a trailing `&`)
    EmptyClause {
        /// Byte offset of the clause in the target
        offset: usize,
    },
    /// A query clause has no `=`
    MissingEquals {
        /// Byte offset of the clause in the target
        offset: usize,
    },
    /// A query clause ends with `=`
    MissingValue {
        /// Byte offset of the clause in the target
        offset: usize,
    },
}

impl fmt::Display for UrlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlParseError::MissingLeadingSlash => {
                write!(f, "request-target must start with '/'")
            }
            UrlParseError::EmptyClause { offset } => {
                write!(f, "empty query clause at byte {offset}")
            }
            UrlParseError::MissingEquals { offset } => {
                write!(f, "query clause at byte {offset} has no '='")
            }
            UrlParseError::MissingValue { offset } => {
                write!(f, "query clause at byte {offset} has no value after '='")
            }
        }
    }
}

impl std::error::Error for UrlParseError {}

/// Path segments and query arguments of one request-target.
///
/// Immutable once parsed. Segments keep their left-to-right order and empty
/// segments are preserved (`"/a//b"` has three). Query keys are unique; on a
/// duplicate key the later value replaces the earlier one.
///
/// Values are raw substrings: no percent-decoding is performed.
#[derive(Debug, Clone)]
pub struct UrlArguments {
    target: String,
    segments: SmallVec<[Span; MAX_INLINE_ARGS]>,
    query: SmallVec<[(Span, Span); MAX_INLINE_ARGS]>,
}

impl UrlArguments {
    /// Parse a request-target such as `/a/b?x=1&y=2`.
    ///
    /// The first `?` at or after index 1 separates the path from the query.
    /// The path without its leading `/` is split on `/`, so `"/"` yields one
    /// empty segment and `"/a/"` yields `["a", ""]`. The query is split on
    /// `&`; each clause is split at its first `=`, so `k=AQ==` keeps the
    /// value `AQ==`.
    ///
    /// # Errors
    ///
    /// Returns [`UrlParseError`] for a target without a leading `/` or any
    /// malformed query clause. Nothing is returned for the valid prefix.
    pub fn parse(target: impl Into<String>) -> Result<Self, UrlParseError> {
        let target = target.into();
        let bytes = target.as_bytes();
        if bytes.first() != Some(&b'/') {
            return Err(UrlParseError::MissingLeadingSlash);
        }

        let query_start = bytes[1..]
            .iter()
            .position(|&b| b == b'?')
            .map(|i| i + 1);
        let path_end = query_start.unwrap_or(bytes.len());

        let mut segments = SmallVec::new();
        let mut start = 1;
        for (i, &b) in bytes.iter().enumerate().take(path_end).skip(1) {
            if b == b'/' {
                segments.push(Span::new(start, i));
                start = i + 1;
            }
        }
        segments.push(Span::new(start, path_end));

        let mut args = UrlArguments {
            target,
            segments,
            query: SmallVec::new(),
        };
        if let Some(q) = query_start {
            args.parse_query(q + 1)?;
        }
        Ok(args)
    }

    fn parse_query(&mut self, from: usize) -> Result<(), UrlParseError> {
        let len = self.target.len();
        if from == len {
            return Ok(());
        }

        let mut clause_start = from;
        while clause_start <= len {
            let clause_end = self.target.as_bytes()[clause_start..]
                .iter()
                .position(|&b| b == b'&')
                .map_or(len, |i| clause_start + i);

            if clause_end == clause_start {
                return Err(UrlParseError::EmptyClause {
                    offset: clause_start,
                });
            }
            let eq = self.target.as_bytes()[clause_start..clause_end]
                .iter()
                .position(|&b| b == b'=')
                .map(|i| clause_start + i)
                .ok_or(UrlParseError::MissingEquals {
                    offset: clause_start,
                })?;
            if eq + 1 == clause_end {
                return Err(UrlParseError::MissingValue {
                    offset: clause_start,
                });
            }

            self.insert_pair(Span::new(clause_start, eq), Span::new(eq + 1, clause_end));
            clause_start = clause_end + 1;
        }
        Ok(())
    }

    fn insert_pair(&mut self, key: Span, value: Span) {
        let name = self.slice(key);
        if let Some(idx) = self.query.iter().position(|(k, _)| self.slice(*k) == name) {
            self.query[idx].1 = value;
        } else {
            self.query.push((key, value));
        }
    }

    #[inline]
    fn slice(&self, span: Span) -> &str {
        &self.target[span.start..span.end]
    }

    /// The request-target exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.target
    }

    /// Path segments in left-to-right order.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.segments.iter().map(move |s| self.slice(*s))
    }

    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(|s| self.slice(*s))
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Value for a query key, compared case-sensitively.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| self.slice(*k) == key)
            .map(|(_, v)| self.slice(*v))
    }

    /// Query pairs in first-seen key order.
    pub fn query_pairs(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.query
            .iter()
            .map(move |(k, v)| (self.slice(*k), self.slice(*v)))
    }

    #[must_use]
    pub fn query_count(&self) -> usize {
        self.query.len()
    }

    /// Whether any segment or query list spilled past the inline capacity.
    #[must_use]
    pub fn spilled(&self) -> bool {
        self.segments.spilled() || self.query.spilled()
    }
}

/// Two argument sets are equal when their segments match in order and their
/// query maps hold the same keys and values, in any order.
impl PartialEq for UrlArguments {
    fn eq(&self, other: &Self) -> bool {
        self.segment_count() == other.segment_count()
            && self.segments().eq(other.segments())
            && self.query_count() == other.query_count()
            && self
                .query_pairs()
                .all(|(k, v)| other.query(k) == Some(v))
    }
}

impl Eq for UrlArguments {}

/// Rebuilds a canonical target: `/` + segments joined by `/`, then `?` and the
/// deduplicated query pairs when there are any.
impl fmt::Display for UrlArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in self.segments() {
            write!(f, "/{seg}")?;
        }
        for (i, (key, value)) in self.query_pairs().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}
