//! Request-body decoding and response-body encoding for the supported
//! content-codings.

use crate::token::ContentCoding;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Read, Write};

/// Default cap on a decompressed request body.
pub const MAX_DECODED_BYTES: usize = 1024 * 1024;

/// Failure while transforming a message body.
#[derive(Debug)]
pub enum BodyError {
    /// The body could not be decompressed with the declared coding
    Decode {
        coding: ContentCoding,
        source: io::Error,
    },
    /// Compressing the body failed
    Encode {
        coding: ContentCoding,
        source: io::Error,
    },
    /// Decompression produced more than `limit` bytes
    TooLarge { coding: ContentCoding, limit: usize },
    /// The decoded body is not valid UTF-8
    NotUtf8(std::string::FromUtf8Error),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::Decode { coding, source } => {
                write!(f, "failed to decode {coding} body: {source}")
            }
            BodyError::Encode { coding, source } => {
                write!(f, "failed to encode {coding} body: {source}")
            }
            BodyError::TooLarge { coding, limit } => {
                write!(f, "decoded {coding} body exceeds {limit} bytes")
            }
            BodyError::NotUtf8(e) => write!(f, "body is not valid UTF-8: {e}"),
        }
    }
}

impl std::error::Error for BodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BodyError::Decode { source, .. } | BodyError::Encode { source, .. } => Some(source),
            BodyError::TooLarge { .. } => None,
            BodyError::NotUtf8(e) => Some(e),
        }
    }
}

fn read_all(reader: impl Read, coding: ContentCoding, limit: usize) -> Result<Vec<u8>, BodyError> {
    let mut out = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|source| BodyError::Decode { coding, source })?;
    if out.len() > limit {
        return Err(BodyError::TooLarge { coding, limit });
    }
    Ok(out)
}

/// Undo the content-coding of a request body, producing at most `limit`
/// bytes.
///
/// `deflate` is tried as zlib-wrapped first and as a raw DEFLATE stream if
/// that fails, since both spellings are seen in the wild. `identity` and
/// `None` borrow the input unchanged; its size was already bounded when it
/// was read.
///
/// # Errors
///
/// Returns [`BodyError::Decode`] if the bytes are not a valid stream for the
/// coding and [`BodyError::TooLarge`] if the output would exceed `limit`.
pub fn decode(
    body: &[u8],
    coding: Option<ContentCoding>,
    limit: usize,
) -> Result<Cow<'_, [u8]>, BodyError> {
    match coding {
        None | Some(ContentCoding::Identity) => Ok(Cow::Borrowed(body)),
        Some(ContentCoding::Gzip) => {
            read_all(GzDecoder::new(body), ContentCoding::Gzip, limit).map(Cow::Owned)
        }
        Some(ContentCoding::Deflate) => {
            match read_all(ZlibDecoder::new(body), ContentCoding::Deflate, limit) {
                Err(BodyError::Decode { .. }) => {
                    read_all(DeflateDecoder::new(body), ContentCoding::Deflate, limit)
                }
                other => other,
            }
            .map(Cow::Owned)
        }
    }
}

/// Apply `coding` to a response body.
///
/// # Errors
///
/// Returns [`BodyError::Encode`] if the compressor reports an I/O failure.
pub fn encode(body: &[u8], coding: ContentCoding) -> Result<Vec<u8>, BodyError> {
    let wrap = |source| BodyError::Encode { coding, source };
    match coding {
        ContentCoding::Identity => Ok(body.to_vec()),
        ContentCoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(body).map_err(wrap)?;
            encoder.finish().map_err(wrap)
        }
        ContentCoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(body).map_err(wrap)?;
            encoder.finish().map_err(wrap)
        }
    }
}

/// Decode a request body and interpret it as UTF-8 text.
///
/// # Errors
///
/// Propagates [`decode`] failures and returns [`BodyError::NotUtf8`] for
/// invalid text.
pub fn decode_text(
    body: &[u8],
    coding: Option<ContentCoding>,
    limit: usize,
) -> Result<String, BodyError> {
    let bytes = decode(body, coding, limit)?.into_owned();
    String::from_utf8(bytes).map_err(BodyError::NotUtf8)
}
