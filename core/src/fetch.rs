//! Fluent request builder.
//!
//! # Design
//! `Fetch` is a consuming builder: every setter takes `self` and hands it
//! back, so calls chain left to right and `dispatch` can only run once.
//! `request` is the sans-IO half of dispatch and produces the exact
//! `FetchRequest` the transport would see. `dispatch` adds the transport
//! round-trip and delivers a `FetchOutcome` to a one-shot callback; `fetch`
//! wraps the same thing in a future.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{CompletionDropped, FetchError};
use crate::http::{FetchRequest, HttpMethod, DEFAULT_HEADERS};
use crate::outcome::FetchOutcome;
use crate::target::Target;
use crate::transport::Transport;

const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Builder for a single request against a JSON API.
pub struct Fetch {
    transport: Arc<dyn Transport>,
    host: String,
    port: Option<u16>,
    path: String,
    use_tls: bool,
    params: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl Fetch {
    /// Start an `https` request to `host`.
    pub fn new(transport: Arc<dyn Transport>, host: impl Into<String>) -> Self {
        Self::with_tls(transport, host, true)
    }

    /// Start a request to `host`, over `https` if `use_tls` is set and plain
    /// `http` otherwise.
    pub fn with_tls(transport: Arc<dyn Transport>, host: impl Into<String>, use_tls: bool) -> Self {
        Self {
            transport,
            host: host.into(),
            port: None,
            path: String::new(),
            use_tls,
            params: BTreeMap::new(),
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: None,
        }
    }

    /// Replace the path. It must be empty or start with `/`.
    pub fn set_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Use an explicit port. The scheme's default port is elided from the URL.
    pub fn set_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Replace the body; the last call wins.
    pub fn set_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a query parameter, replacing any earlier value for `name`.
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set a header, replacing any earlier value stored under exactly `name`.
    /// Names are not case-folded.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set `Content-Type: application/x-www-form-urlencoded`. A later
    /// `add_header("Content-Type", ..)` still overrides it.
    pub fn use_form_url_encoding(self) -> Self {
        self.add_header("Content-Type", FORM_URL_ENCODED)
    }

    fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    fn target(&self) -> Target<'_> {
        Target {
            scheme: self.scheme(),
            host: &self.host,
            port: self.port,
            path: &self.path,
            params: &self.params,
        }
    }

    /// Assemble the request `dispatch` would submit, without submitting it.
    pub fn request(&self, method: HttpMethod) -> Result<FetchRequest, FetchError> {
        let target = self.target();
        let url = target.assemble().map_err(|source| FetchError::InvalidUrl {
            url: target.describe(),
            source,
        })?;
        Ok(FetchRequest {
            url,
            method: method.wire_verb().to_string(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        })
    }

    /// Submit the request and call `on_complete` exactly once with the result.
    ///
    /// The transport has been handed the request by the time this returns.
    /// If the URL cannot be assembled the transport is never contacted and
    /// `on_complete` runs before `dispatch` returns.
    pub fn dispatch<F>(self, method: HttpMethod, on_complete: F)
    where
        F: FnOnce(FetchOutcome) + Send + 'static,
    {
        let request = match self.request(method) {
            Ok(request) => request,
            Err(error) => {
                debug!(%method, %error, "request not sent");
                on_complete(FetchOutcome::Err {
                    error,
                    response: None,
                });
                return;
            }
        };

        debug!(%method, verb = %request.method, url = %request.url, "submitting request");
        self.transport.submit(
            request,
            Box::new(move |reply| {
                let outcome = FetchOutcome::from(reply);
                trace!(ok = outcome.is_ok(), "request completed");
                on_complete(outcome);
            }),
        );
    }

    /// Like `dispatch`, but resolves a future instead of calling back.
    ///
    /// The request is submitted before this returns, not on first poll.
    pub fn fetch(self, method: HttpMethod) -> impl Future<Output = FetchOutcome> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.dispatch(method, move |outcome| {
            // The receiver may already be gone; nobody is waiting then.
            let _ = tx.send(outcome);
        });
        async move {
            rx.await.unwrap_or_else(|_| FetchOutcome::Err {
                error: FetchError::Transport(Box::new(CompletionDropped)),
                response: None,
            })
        }
    }
}

impl fmt::Debug for Fetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetch")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("use_tls", &self.use_tls)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}
