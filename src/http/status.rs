//! Status-code to reason-phrase table.

/// Every status code with a known reason phrase, ascending.
pub const KNOWN_STATUS_CODES: &[u16] = &[
    100, 101, 200, 201, 202, 203, 204, 205, 206, 300, 301, 302, 303, 304, 305, 307, 400, 401, 402,
    403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417, 426, 500, 501, 502,
    503, 504, 505,
];

/// Canonical reason phrase for `status`, or `None` if the code is not in the table.
#[must_use]
pub const fn reason_phrase(status: u16) -> Option<&'static str> {
    let reason = match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request Uri Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        426 => "Upgrade Required",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    };
    Some(reason)
}

/// Reason phrase for a status line. Codes outside the table fall back to the
/// `http` crate's registry, then to an empty phrase.
#[must_use]
pub fn status_line_reason(status: u16) -> &'static str {
    reason_phrase(status)
        .or_else(|| {
            http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
        })
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_code_has_reason() {
        for &code in KNOWN_STATUS_CODES {
            let reason = reason_phrase(code);
            assert!(reason.is_some_and(|r| !r.is_empty()), "code {code}");
        }
    }

    #[test]
    fn test_known_reasons() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(400), Some("Bad Request"));
        assert_eq!(reason_phrase(505), Some("HTTP Version Not Supported"));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(reason_phrase(0), None);
        assert_eq!(reason_phrase(306), None);
        assert_eq!(reason_phrase(418), None);
        assert_eq!(status_line_reason(429), "Too Many Requests");
        assert_eq!(status_line_reason(999), "");
    }

    #[test]
    fn test_table_is_sorted() {
        assert!(KNOWN_STATUS_CODES.windows(2).all(|w| w[0] < w[1]));
    }
}
