use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::slots::SlotQueryError;

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub struct ApiError(pub SlotQueryError);

impl From<SlotQueryError> for ApiError {
    fn from(error: SlotQueryError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            SlotQueryError::SlotUnavailable(_) => StatusCode::NOT_FOUND,
            SlotQueryError::SlotTooFarInFuture(_) => StatusCode::BAD_REQUEST,
            SlotQueryError::InvalidSlot(_)
            | SlotQueryError::Client(_)
            | SlotQueryError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            error!(error = %self.0, "Failed to serve request");

            INTERNAL_SERVER_ERROR_MESSAGE.to_string()
        } else {
            self.0.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::{clients::common::ClientError, slots::ParseSlotError};

    use super::*;

    #[test]
    fn it_should_map_every_error_to_a_status() {
        let cases = [
            (
                SlotQueryError::SlotUnavailable("slot is missing".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                SlotQueryError::SlotTooFarInFuture("slot is in the future".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SlotQueryError::InvalidSlot(ParseSlotError("abc".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SlotQueryError::Client(ClientError::Other(anyhow!("boom"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SlotQueryError::Other(anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).status_code(), expected);
        }
    }
}
