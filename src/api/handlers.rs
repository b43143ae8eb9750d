use crate::application::loan::{
    ServiceDependencies, create_loan as execute_create_loan, get_active_loans, get_all_loans,
    get_loan_by_id as query_loan_by_id, get_loans_by_item_id, get_loans_by_member_id,
    get_overdue_loans as execute_get_overdue_loans, return_item as execute_return_item,
};
use crate::domain::commands::ReturnItem;
use crate::domain::value_objects::{ItemId, LoanId, MemberId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{BorrowItemRequest, ListLoansQuery, LoanResponse},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - アイテムがカタログに存在し、貸出可能であること
/// - 同一アイテムの未返却貸出が存在しないこと
///
/// アイテムの可用性更新に失敗した場合、貸出は補償により取り消され、
/// エラーが返る。会員の借用リスト更新の失敗は貸出を失敗させない。
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowItemRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = req.to_command();

    let loan = execute_create_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// POST /loans/:id/return - アイテムを返却
///
/// 強制されるビジネスルール:
/// - 貸出が存在すること
/// - 既に返却済みでないこと
/// - 延滞中の貸出も返却可能
pub async fn return_item(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = ReturnItem {
        loan_id: LoanId::from_uuid(loan_id),
        returned_at: chrono::Utc::now(),
    };

    let loan = execute_return_item(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(LoanResponse::from(loan))))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans/:id - 貸出詳細をIDで取得
///
/// 見つかった場合は貸出情報を返し、見つからない場合は404を返す。
pub async fn get_loan_by_id(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, QueryError> {
    let loan_id = LoanId::from_uuid(loan_id);

    match query_loan_by_id(&state.service_deps, loan_id).await {
        Ok(Some(loan)) => Ok(Json(LoanResponse::from(loan))),
        Ok(None) => Err(QueryError::NotFound(format!(
            "Loan {} not found",
            loan_id.value()
        ))),
        Err(e) => Err(QueryError::InternalError(e.to_string())),
    }
}

/// GET /loans - オプションフィルタ付き貸出一覧取得
///
/// クエリパラメータ:
/// - member_id: 会員IDでフィルタリング（オプション）
/// - item_id: アイテムIDでフィルタリング（オプション）
///
/// フィルタが指定されない場合は全貸出を返す。
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, QueryError> {
    let loans = match (query.member_id, query.item_id) {
        (Some(member_id), _) => {
            get_loans_by_member_id(&state.service_deps, MemberId::from_uuid(member_id)).await
        }
        (None, Some(item_id)) => {
            get_loans_by_item_id(&state.service_deps, ItemId::from_uuid(item_id)).await
        }
        (None, None) => get_all_loans(&state.service_deps).await,
    }
    .map_err(|e| QueryError::InternalError(e.to_string()))?;

    // member_idとitem_idが両方指定された場合はitem_idも適用
    let responses: Vec<LoanResponse> = loans
        .into_iter()
        .filter(|loan| {
            query
                .item_id
                .is_none_or(|item_id| loan.item_id.value() == item_id)
        })
        .map(LoanResponse::from)
        .collect();

    Ok(Json(responses))
}

/// GET /loans/overdue - 延滞中の貸出一覧取得
///
/// リードの前に延滞スイープを実行する（期限超過のActiveをOverdueへ遷移）。
pub async fn list_overdue_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = execute_get_overdue_loans(&state.service_deps).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/active - 貸出中の貸出一覧取得
pub async fn list_active_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, QueryError> {
    let loans = get_active_loans(&state.service_deps)
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(super::types::ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
