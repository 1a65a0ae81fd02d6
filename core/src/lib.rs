//! Fluent builder for requests against JSON HTTP APIs.
//!
//! # Overview
//! `Fetch` collects host, path, scheme, query parameters, headers and body
//! through chained calls, then `dispatch` assembles a `FetchRequest`, hands
//! it to an injected `Transport`, and reports a `FetchOutcome` exactly once.
//!
//! # Design
//! - The builder does no I/O of its own. Everything network-related lives
//!   behind the `Transport` trait, which receives a plain-data request and
//!   a one-shot completion.
//! - `Fetch::request` exposes the assembled request without sending it, so
//!   URL and header rules can be tested deterministically.
//! - Outcomes are a two-variant enum; a payload, an error and "nothing at
//!   all" from the transport each map to exactly one variant.
//! - Payloads are raw bytes. Decoding JSON is the caller's business.
//! - Non-GET methods are sent as `POST` on the wire; see
//!   [`HttpMethod::wire_verb`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use fetch_core::{Fetch, FetchOutcome, HttpMethod, UreqTransport};
//!
//! let transport = Arc::new(UreqTransport::new());
//! Fetch::new(transport, "www.mocky.io")
//!     .set_path("/v2/5185415ba171ea3a00704eed")
//!     .add_param("lang", "en")
//!     .dispatch(HttpMethod::Get, |outcome| match outcome {
//!         FetchOutcome::Ok { payload, .. } => println!("{}", String::from_utf8_lossy(&payload)),
//!         FetchOutcome::Err { error, .. } => eprintln!("{error}"),
//!     });
//! ```

pub mod error;
pub mod fetch;
pub mod http;
pub mod outcome;
mod target;
pub mod transport;

pub use error::{BoxError, CompletionDropped, FetchError, UrlError};
pub use fetch::Fetch;
pub use http::{FetchRequest, HttpMethod, ResponseMeta, TransportReply, DEFAULT_HEADERS};
pub use outcome::FetchOutcome;
pub use transport::{Completion, StubTransport, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
