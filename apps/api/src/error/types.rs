use serde::Serialize;
use tierscope_core::AppError;
use ts_rs::TS;

/// JSON body for every non-403 error response.
///
/// `code` is stable across releases; `message` is human-readable and may change.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub(super) code: String,
    pub(super) message: String,
}

impl ErrorResponse {
    pub(super) fn from_error(error: &AppError) -> Self {
        let code = match error {
            AppError::Validation(_) => "invalid_request",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthenticated",
            AppError::Forbidden(_) => "forbidden",
            AppError::Internal(_) => "internal",
        };

        Self {
            code: code.to_owned(),
            message: error.to_string(),
        }
    }
}
