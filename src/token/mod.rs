//! # Token Module
//!
//! Decoders for the small, fixed vocabularies that show up on every request:
//! the HTTP method and the content-coding names carried by `Accept-Encoding`
//! and `Content-Encoding`.
//!
//! ## Overview
//!
//! Neither decoder performs general string comparison. Both dispatch on the
//! length (or leading byte) of the candidate token and compare the remaining
//! bytes, packed little-endian into a `u64`, against constants computed at
//! compile time by [`pack`]. The comparison is exact and case-sensitive.
//!
//! ```rust
//! use switchyard::token::{ContentCoding, ContentCodings, Method};
//!
//! assert_eq!(Method::decode("GET"), Some(Method::Get));
//! assert_eq!(Method::decode("get"), None);
//!
//! let accepted = ContentCodings::parse("br, gzip;q=0.8, deflate");
//! assert!(accepted.contains(ContentCoding::Gzip));
//! assert!(accepted.contains(ContentCoding::Deflate));
//! assert!(!accepted.contains(ContentCoding::Identity));
//! ```

mod coding;
mod method;

pub use coding::{ContentCoding, ContentCodings};
pub use method::{Method, UnknownMethod};

/// Pack up to eight bytes into a little-endian machine word.
///
/// Byte `i` lands in bits `8*i..8*i+8`, so `pack(b"GET")` is `0x544547`.
/// Callers guarantee `bytes.len() <= 8`.
#[inline]
#[must_use]
pub(crate) const fn pack(bytes: &[u8]) -> u64 {
    let mut word = 0u64;
    let mut i = 0;
    while i < bytes.len() {
        word |= (bytes[i] as u64) << (8 * i);
        i += 1;
    }
    word
}
