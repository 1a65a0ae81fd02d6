//! Blocking transport built on `ureq`.

use std::thread;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;
use ureq::http::HeaderMap;
use ureq::Agent;

use super::{Completion, Transport};
use crate::http::{FetchRequest, ResponseMeta, TransportReply};

/// Runs each submitted request on its own thread with a shared `ureq::Agent`.
///
/// Status codes are never turned into errors: a 404 with a body is a payload
/// like any other, and the status is available in `ResponseMeta`.
///
/// `gzip` and `br` response bodies are decoded before they reach the payload.
/// ureq has no `deflate` decoder, so a `Content-Encoding: deflate` body is
/// passed through still compressed, with the header left in `ResponseMeta`.
///
/// ```ignore
/// use std::sync::Arc;
/// use fetch_core::{Fetch, HttpMethod, UreqTransport};
///
/// let transport = Arc::new(UreqTransport::new());
/// Fetch::new(transport, "www.mocky.io")
///     .set_path("/v2/5185415ba171ea3a00704eed")
///     .dispatch(HttpMethod::Get, |outcome| println!("{outcome:?}"));
/// ```
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_agent(
            Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent(),
        )
    }

    /// Give up on any request that takes longer than `timeout` overall.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_agent(
            Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent(),
        )
    }

    /// Use a preconfigured agent. Unless it disables `http_status_as_error`,
    /// 4xx/5xx responses arrive as transport errors.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn submit(&self, request: FetchRequest, complete: Completion) {
        let agent = self.agent.clone();
        thread::spawn(move || complete(execute(&agent, request)));
    }
}

fn execute(agent: &Agent, request: FetchRequest) -> TransportReply {
    debug!(method = %request.method, url = %request.url, "ureq request");

    let result = if request.method == "GET" {
        let mut builder = agent.get(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(body) => builder.force_send_body().send(&body[..]),
            None => builder.call(),
        }
    } else {
        let mut builder = agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(body) => builder.send(&body[..]),
            None => builder.send_empty(),
        }
    };

    let mut response = match result {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, url = %request.url, "ureq transport error");
            return TransportReply::failed(e, None);
        }
    };

    let meta = ResponseMeta {
        status: response.status().as_u16(),
        headers: header_pairs(response.headers()),
    };
    match response.body_mut().read_to_vec() {
        Ok(body) => TransportReply::payload(Bytes::from(body), Some(meta)),
        Err(e) => TransportReply::failed(e, Some(meta)),
    }
}

/// Header pairs with printable values; others are skipped.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
