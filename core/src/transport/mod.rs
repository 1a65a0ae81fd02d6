//! The injected HTTP client boundary.
//!
//! # Design
//! A `Transport` receives a finished `FetchRequest` plus a one-shot
//! `Completion` and is expected to call the completion exactly once, from
//! whatever thread it likes. `FnOnce` rules out a second call at compile
//! time; a transport that never calls it leaves the fetch pending forever
//! (or, through `Fetch::fetch`, resolves to `CompletionDropped`).
//!
//! Transports are shared between builders behind an `Arc`, so they must be
//! `Send + Sync` and tolerate concurrent submissions.

use crate::http::{FetchRequest, TransportReply};

pub mod stub;
#[cfg(feature = "ureq")]
pub mod ureq_impl;

pub use stub::StubTransport;
#[cfg(feature = "ureq")]
pub use ureq_impl::UreqTransport;

/// Single-use sink for the reply to one request.
pub type Completion = Box<dyn FnOnce(TransportReply) + Send + 'static>;

/// Something that can execute a `FetchRequest`.
///
/// `submit` should start the work and return without waiting for it.
///
/// ```ignore
/// use fetch_core::transport::{Completion, Transport};
/// use fetch_core::{FetchRequest, TransportReply};
///
/// struct Offline;
///
/// impl Transport for Offline {
///     fn submit(&self, _request: FetchRequest, complete: Completion) {
///         complete(TransportReply::failed("offline", None));
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    fn submit(&self, request: FetchRequest, complete: Completion);
}
