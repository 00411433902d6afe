//! Standard header names and their stable numeric ids.
//!
//! Each id packs the upper-case initial of the canonical name into the top
//! byte, a per-letter ordinal into the third byte, and a sub-ordinal into the
//! low byte for families such as `Access-Control-*`. Ids never change between
//! releases.

use std::fmt;

macro_rules! standard_headers {
    ($( $(#[$doc:meta])* $variant:ident = ($id:literal, $name:literal); )+) => {
        /// A header field from the static table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StandardHeader {
            $( $(#[$doc])* $variant, )+
        }

        impl StandardHeader {
            /// Every entry, in id order.
            pub const ALL: &'static [StandardHeader] = &[ $( StandardHeader::$variant, )+ ];

            /// Canonical spelling of the field name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( StandardHeader::$variant => $name, )+
                }
            }

            /// Stable numeric id.
            #[must_use]
            pub const fn id(self) -> u32 {
                match self {
                    $( StandardHeader::$variant => $id, )+
                }
            }

            /// Look up an entry by numeric id.
            #[must_use]
            pub const fn from_id(id: u32) -> Option<StandardHeader> {
                match id {
                    $( $id => Some(StandardHeader::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

standard_headers! {
    Accept = (0x4100_0100, "Accept");
    AcceptCharset = (0x4100_0200, "Accept-Charset");
    AcceptDatetime = (0x4100_0300, "Accept-Datetime");
    AcceptEncoding = (0x4100_0400, "Accept-Encoding");
    AcceptLanguage = (0x4100_0500, "Accept-Language");
    AccessControlAllowCredentials = (0x4100_0601, "Access-Control-Allow-Credentials");
    AccessControlAllowHeaders = (0x4100_0602, "Access-Control-Allow-Headers");
    AccessControlAllowMethods = (0x4100_0603, "Access-Control-Allow-Methods");
    AccessControlAllowOrigin = (0x4100_0604, "Access-Control-Allow-Origin");
    AccessControlExposeHeaders = (0x4100_0605, "Access-Control-Expose-Headers");
    AccessControlMaxAge = (0x4100_0606, "Access-Control-Max-Age");
    AccessControlRequestHeaders = (0x4100_0607, "Access-Control-Request-Headers");
    AccessControlRequestMethod = (0x4100_0608, "Access-Control-Request-Method");
    Allow = (0x4100_0700, "Allow");
    Authorization = (0x4100_0800, "Authorization");
    CacheControl = (0x4300_0100, "Cache-Control");
    Connection = (0x4300_0200, "Connection");
    ContentEncoding = (0x4300_0300, "Content-Encoding");
    ContentLength = (0x4300_0400, "Content-Length");
    ContentMd5 = (0x4300_0500, "Content-MD5");
    ContentType = (0x4300_0600, "Content-Type");
    Cookie = (0x4300_0700, "Cookie");
    Date = (0x4400_0100, "Date");
    /// Do Not Track
    Dnt = (0x4400_0200, "DNT");
    Expect = (0x4500_0100, "Expect");
    From = (0x4600_0100, "From");
    Host = (0x4800_0100, "Host");
    IfMatch = (0x4900_0100, "If-Match");
    IfModifiedSince = (0x4900_0200, "If-Modified-Since");
    IfNoneMatch = (0x4900_0300, "If-None-Match");
    IfRange = (0x4900_0400, "If-Range");
    IfUnmodifiedSince = (0x4900_0500, "If-Unmodified-Since");
    Location = (0x4C00_0100, "Location");
    MaxForwards = (0x4D00_0100, "Max-Forwards");
    Origin = (0x4F00_0100, "Origin");
    Pragma = (0x5000_0100, "Pragma");
    ProxyAuthorization = (0x5000_0200, "Proxy-Authorization");
    ProxyConnection = (0x5000_0300, "Proxy-Connection");
    Range = (0x5200_0100, "Range");
    Referer = (0x5200_0200, "Referer");
    Server = (0x5300_0100, "Server");
    SetCookie = (0x5300_0200, "Set-Cookie");
    /// Transfer codings the client accepts
    Te = (0x5400_0100, "TE");
    Upgrade = (0x5500_0100, "Upgrade");
    UserAgent = (0x5500_0200, "User-Agent");
    Via = (0x5600_0100, "Via");
    Warning = (0x5700_0100, "Warning");
    XAttDeviceId = (0x5800_0100, "X-ATT-DeviceId");
    XForwardedFor = (0x5800_0200, "X-Forwarded-For");
    XForwardedProto = (0x5800_0300, "X-Forwarded-Proto");
    XHttpMethodOverride = (0x5800_0400, "X-Http-Method-Override");
    XRequestedWith = (0x5800_0500, "X-Requested-With");
    XWapProfile = (0x5800_0600, "X-Wap-Profile");
}

impl StandardHeader {
    /// Look up an entry by field name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<StandardHeader> {
        let first = name.as_bytes().first()?.to_ascii_uppercase();
        // Entries are grouped by initial; the top id byte is that initial.
        Self::ALL
            .iter()
            .copied()
            .skip_while(|h| (h.id() >> 24) as u8 != first)
            .take_while(|h| (h.id() >> 24) as u8 == first)
            .find(|h| h.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for StandardHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
