use crate::application::loan::CirculationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(CirculationError);

impl From<CirculationError> for ApiError {
    fn from(err: CirculationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            CirculationError::LoanNotFound => {
                (StatusCode::NOT_FOUND, "LOAN_NOT_FOUND", "Loan not found")
            }
            CirculationError::ItemNotFound => {
                (StatusCode::NOT_FOUND, "ITEM_NOT_FOUND", "Item not found")
            }

            // 422 Unprocessable Entity - ビジネスルール違反
            CirculationError::ItemUnavailable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ITEM_UNAVAILABLE",
                "Item is not available for borrowing",
            ),
            CirculationError::ItemAlreadyOnLoan => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ITEM_ALREADY_ON_LOAN",
                "Item is already on loan",
            ),
            CirculationError::LoanAlreadyReturned => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "LOAN_ALREADY_RETURNED",
                "Loan is already returned",
            ),
            CirculationError::DomainError(ref msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DOMAIN_ERROR",
                msg.as_str(),
            ),

            // 502 Bad Gateway - カタログコラボレータの障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            CirculationError::AvailabilityCheckFailed(ref e) => {
                tracing::error!("Availability check failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "AVAILABILITY_CHECK_FAILED",
                    "Failed to check item availability",
                )
            }
            CirculationError::AvailabilityUpdateFailed(ref e) => {
                tracing::error!("Availability update failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "AVAILABILITY_UPDATE_FAILED",
                    "Failed to update item availability. Loan cancelled.",
                )
            }

            // 非致命と定義されているが、万一ここへ到達した場合は障害として扱う
            CirculationError::MemberListUpdateFailed(ref e) => {
                tracing::error!("Member list update surfaced unexpectedly: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "MEMBER_LIST_UPDATE_FAILED",
                    "Failed to update member borrowed items",
                )
            }

            // 500 Internal Server Error - システム障害
            CirculationError::LoanStoreError(ref e) => {
                tracing::error!("Loan store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOAN_STORE_ERROR",
                    "Failed to access loan store",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
