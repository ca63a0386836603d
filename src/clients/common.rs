use std::fmt::Display;

use serde::Deserialize;

pub const SLOT_TOO_FAR_IN_FUTURE_MESSAGE: &str = "requested slot is too far in the future";
pub const SLOT_DOES_NOT_EXIST_MESSAGE: &str = "slot does not exist";

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NumericOrTextCode {
    String(String),
    Number(usize),
}

/// Beacon API error response
#[derive(Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    /// Error code
    pub code: NumericOrTextCode,
    /// Error message
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Upstream answered 404 for a slot-scoped resource
    #[error("{0}")]
    SlotTooFarInFuture(String),

    /// Upstream answered 400 for a slot-scoped resource
    #[error("{0}")]
    SlotUnavailable(String),

    /// Reqwest Error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// Execution client transport error
    #[error(transparent)]
    Provider(#[from] alloy::transports::TransportError),

    /// Upstream call did not complete in time
    #[error("operation timed out: {operation}")]
    Timeout { operation: String },

    /// API Error
    #[error("API usage error: {0}")]
    ApiError(ErrorResponse),

    /// Unexpected status without a decodable error body
    #[error("unexpected response status {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Url Parsing Error
    #[error("{0}")]
    UrlParse(#[from] url::ParseError),

    /// Serde Json deser Error
    #[error("{0}")]
    SerdeError(#[from] serde_json::Error),

    /// Other Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Maps the statuses the beacon API uses to signal slot problems to domain errors.
    pub(crate) fn from_slot_status(status: reqwest::StatusCode) -> Option<Self> {
        match status {
            reqwest::StatusCode::NOT_FOUND => Some(Self::SlotTooFarInFuture(
                SLOT_TOO_FAR_IN_FUTURE_MESSAGE.to_string(),
            )),
            reqwest::StatusCode::BAD_REQUEST => Some(Self::SlotUnavailable(
                SLOT_DOES_NOT_EXIST_MESSAGE.to_string(),
            )),
            _ => None,
        }
    }

    /// Builds the error for any other non-success status, keeping the API error body when the
    /// upstream sent one.
    pub(crate) fn from_error_status(status: reqwest::StatusCode, body: String) -> Self {
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error_response) => error_response.into(),
            Err(_) => Self::UnexpectedStatus { status, body },
        }
    }
}

impl From<ErrorResponse> for ClientError {
    fn from(err: ErrorResponse) -> Self {
        Self::ApiError(err)
    }
}

impl Display for NumericOrTextCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s.as_ref()),
            Self::Number(n) => f.write_str(n.to_string().as_ref()),
        }
    }
}

impl Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!(
            "Code: {}, Message: \"{}\"",
            self.code,
            self.message.as_deref().unwrap_or(""),
        ))
    }
}
