use crate::clients::common::ClientError;

use super::types::ParseSlotError;

/// Outcome of a slot query that did not succeed.
///
/// The two slot variants are expected during normal operation and are reported to callers
/// as such; every other variant is an internal failure.
#[derive(Debug, thiserror::Error)]
pub enum SlotQueryError {
    #[error("{0}")]
    SlotUnavailable(String),
    #[error("{0}")]
    SlotTooFarInFuture(String),
    #[error(transparent)]
    InvalidSlot(#[from] ParseSlotError),
    #[error(transparent)]
    Client(ClientError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ClientError> for SlotQueryError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::SlotUnavailable(message) => Self::SlotUnavailable(message),
            ClientError::SlotTooFarInFuture(message) => Self::SlotTooFarInFuture(message),
            error => Self::Client(error),
        }
    }
}
