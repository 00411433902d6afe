//! # URL Module
//!
//! Splits a raw request-target into path segments and query arguments in a
//! single left-to-right scan.
//!
//! ## Overview
//!
//! [`UrlArguments`] owns the request-target string and records byte spans into
//! it for every segment, key and value. Up to eight segments and eight query
//! pairs live inline on the stack, so the common request never allocates
//! beyond the target string it was handed.
//!
//! Parsing is fail-closed. A query clause without `=`, a clause whose `=` is
//! its last character, or an empty clause rejects the whole target with a
//! [`UrlParseError`]; there is no partial result.
//!
//! ## Example
//!
//! ```rust
//! use switchyard::url::UrlArguments;
//!
//! let args = UrlArguments::parse("/postback/XYZ?o=1&dcid=2").unwrap();
//! assert_eq!(args.segments().collect::<Vec<_>>(), ["postback", "XYZ"]);
//! assert_eq!(args.query("dcid"), Some("2"));
//! assert!(UrlArguments::parse("/a?x").is_err());
//! ```
//!
//! ## Encoding
//!
//! Values are the raw substrings of the target. Percent-escapes are **not**
//! decoded; `"/a?q=%20"` yields the value `"%20"`. Consumers that need decoded
//! values decode them themselves.

mod core;
#[cfg(test)]
mod tests;

pub use core::{UrlArguments, UrlParseError, MAX_INLINE_ARGS};
