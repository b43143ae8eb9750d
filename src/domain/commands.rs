use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemId, LoanId, MemberId};

/// コマンド：アイテムを貸し出す
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowItem {
    pub item_id: ItemId,
    pub member_id: MemberId,
    /// 貸出期間（日数）。未指定時は14日間。
    pub days: Option<i64>,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：アイテムを返却する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
}
