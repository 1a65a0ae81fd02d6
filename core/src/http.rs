//! Plain-data types exchanged with the transport.
//!
//! # Design
//! `Fetch` assembles a `FetchRequest` and hands it to a `Transport`; the
//! transport answers with a `TransportReply`. Neither type knows anything
//! about the network, so both are easy to construct in tests and to carry
//! across thread boundaries.
//!
//! All fields use owned types so a request outlives the builder that made it.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use url::Url;

use crate::error::BoxError;

/// Headers every new `Fetch` starts with. Later `add_header` calls with the
/// same name replace these.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [
    ("accept-encoding", "gzip, deflate, br"),
    ("accept", "application/json"),
];

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// The declared name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// The verb written on the wire.
    ///
    /// Only `Get` is sent as `GET`; `Post`, `Put` and `Delete` all go out as
    /// `POST`. Existing servers rely on this, so it is kept.
    pub fn wire_verb(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled request, ready for a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    /// Wire verb, see [`HttpMethod::wire_verb`].
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

/// What the transport learned about the exchange, apart from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// First header value whose name matches `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The raw triple a transport hands back once per submitted request.
///
/// Any combination of fields is representable here; `FetchOutcome` is the
/// classified form callers actually see.
#[derive(Debug, Default)]
pub struct TransportReply {
    pub payload: Option<Bytes>,
    pub response: Option<ResponseMeta>,
    pub error: Option<BoxError>,
}

impl TransportReply {
    /// A reply carrying response bytes.
    pub fn payload(payload: impl Into<Bytes>, response: Option<ResponseMeta>) -> Self {
        Self {
            payload: Some(payload.into()),
            response,
            error: None,
        }
    }

    /// A reply reporting a transport-level failure.
    pub fn failed(error: impl Into<BoxError>, response: Option<ResponseMeta>) -> Self {
        Self {
            payload: None,
            response,
            error: Some(error.into()),
        }
    }

    /// A reply with neither payload nor error.
    pub fn empty(response: Option<ResponseMeta>) -> Self {
        Self {
            payload: None,
            response,
            error: None,
        }
    }
}
