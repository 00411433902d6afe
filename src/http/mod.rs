//! # HTTP Module
//!
//! The request and response model handed to handlers, plus the two static
//! lookup tables (standard header names, status reason phrases) and the
//! body codecs for `deflate` and `gzip`.
//!
//! Header lookups are ASCII case-insensitive; [`StandardHeader::name`] returns
//! the canonical spelling. Headers outside the static table are kept as-is in
//! [`RequestHeaders`] and remain reachable through [`RequestHeaders::get`].

pub mod body;
pub mod headers;
mod request;
mod response;
pub mod status;

pub use body::BodyError;
pub use headers::StandardHeader;
pub use request::{
    HeaderVec, HttpRequest, RequestHeaders, StandardHeaderVec, MAX_INLINE_HEADERS,
};
pub use response::{HttpResponse, ResponseHeaders};
pub use status::reason_phrase;
