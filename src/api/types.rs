use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::commands::BorrowItem;
use crate::domain::loan::Loan;
use crate::domain::value_objects::{ItemId, MemberId};

/// 貸出作成リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct BorrowItemRequest {
    pub item_id: Uuid,
    pub member_id: Uuid,
    /// 貸出期間（日数）。省略時は14日間。
    pub days: Option<i64>,
}

impl BorrowItemRequest {
    /// リクエストからコマンドへ変換する
    ///
    /// 貸出日はリクエスト受付時点のサーバー時刻。
    pub fn to_command(&self) -> BorrowItem {
        BorrowItem {
            item_id: ItemId::from_uuid(self.item_id),
            member_id: MemberId::from_uuid(self.member_id),
            days: self.days,
            borrowed_at: Utc::now(),
        }
    }
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// 会員IDでフィルタリング
    pub member_id: Option<Uuid>,
    /// アイテムIDでフィルタリング
    pub item_id: Option<Uuid>,
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub item_id: Uuid,
    pub member_id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: String,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.loan_id.value(),
            item_id: loan.item_id.value(),
            member_id: loan.member_id.value(),
            borrow_date: loan.borrow_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            status: loan.status.as_str().to_string(),
            is_overdue: loan.is_overdue,
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
