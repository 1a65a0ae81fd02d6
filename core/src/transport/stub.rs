//! In-process transport for tests.
//!
//! Records every submitted request. Either answers immediately, on the
//! submitting thread, with a reply built by a closure, or holds completions
//! until the test releases them.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use super::{Completion, Transport};
use crate::http::{FetchRequest, ResponseMeta, TransportReply};

type ReplyFn = Box<dyn Fn(&FetchRequest) -> TransportReply + Send + Sync>;

enum Mode {
    Reply(ReplyFn),
    Hold,
}

pub struct StubTransport {
    mode: Mode,
    requests: Mutex<Vec<FetchRequest>>,
    held: Mutex<Vec<Completion>>,
}

impl StubTransport {
    /// Answer every request with `reply(&request)`.
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&FetchRequest) -> TransportReply + Send + Sync + 'static,
    {
        Self::with_mode(Mode::Reply(Box::new(reply)))
    }

    /// Answer every request with the same payload.
    pub fn with_payload(payload: impl Into<Bytes>, response: Option<ResponseMeta>) -> Self {
        let payload = payload.into();
        Self::new(move |_| TransportReply::payload(payload.clone(), response.clone()))
    }

    /// Fail every request with `message` and no payload.
    pub fn failing(message: &'static str, response: Option<ResponseMeta>) -> Self {
        Self::new(move |_| TransportReply::failed(message, response.clone()))
    }

    /// Answer every request with neither payload nor error.
    pub fn empty(response: Option<ResponseMeta>) -> Self {
        Self::new(move |_| TransportReply::empty(response.clone()))
    }

    /// Keep completions until `complete_next` or `drop_pending` is called.
    pub fn holding() -> Self {
        Self::with_mode(Mode::Hold)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            requests: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        }
    }

    /// Every request submitted so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        lock(&self.requests).clone()
    }

    pub fn submissions(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of held completions not yet released.
    pub fn pending(&self) -> usize {
        lock(&self.held).len()
    }

    /// Complete the oldest held request with `reply`. Returns `false` if
    /// nothing was pending.
    pub fn complete_next(&self, reply: TransportReply) -> bool {
        let next = {
            let mut held = lock(&self.held);
            if held.is_empty() {
                None
            } else {
                Some(held.remove(0))
            }
        };
        match next {
            Some(complete) => {
                complete(reply);
                true
            }
            None => false,
        }
    }

    /// Forget every held completion without calling it.
    pub fn drop_pending(&self) {
        lock(&self.held).clear();
    }
}

impl Transport for StubTransport {
    fn submit(&self, request: FetchRequest, complete: Completion) {
        match &self.mode {
            Mode::Reply(reply) => {
                let answer = reply(&request);
                lock(&self.requests).push(request);
                complete(answer);
            }
            Mode::Hold => {
                lock(&self.requests).push(request);
                lock(&self.held).push(complete);
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
