//! Two-way classification of a transport reply.

use bytes::Bytes;

use crate::error::FetchError;
use crate::http::{ResponseMeta, TransportReply};

/// Result of one dispatched fetch, delivered exactly once.
#[derive(Debug)]
pub enum FetchOutcome {
    Ok {
        payload: Bytes,
        response: Option<ResponseMeta>,
    },
    Err {
        error: FetchError,
        response: Option<ResponseMeta>,
    },
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok { .. })
    }

    /// Response metadata, whichever way the fetch went.
    pub fn response(&self) -> Option<&ResponseMeta> {
        match self {
            FetchOutcome::Ok { response, .. } | FetchOutcome::Err { response, .. } => {
                response.as_ref()
            }
        }
    }

    /// Drop the metadata and keep the payload or the error.
    pub fn into_result(self) -> Result<Bytes, FetchError> {
        match self {
            FetchOutcome::Ok { payload, .. } => Ok(payload),
            FetchOutcome::Err { error, .. } => Err(error),
        }
    }
}

/// A payload wins over an error; an error wins over nothing at all.
impl From<TransportReply> for FetchOutcome {
    fn from(reply: TransportReply) -> Self {
        let TransportReply {
            payload,
            response,
            error,
        } = reply;
        match (payload, error) {
            (Some(payload), _) => FetchOutcome::Ok { payload, response },
            (None, Some(error)) => FetchOutcome::Err {
                error: FetchError::Transport(error),
                response,
            },
            (None, None) => FetchOutcome::Err {
                error: FetchError::InvalidResponse,
                response,
            },
        }
    }
}
