#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BorrowItemError, ItemId, LoanId, MemberId, ReturnItemError};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }

    /// 未返却（Active または Overdue）か
    ///
    /// 不変条件「1アイテムにつき未返却の貸出は最大1件」の判定に使用される。
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Overdue)
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, LoanStatus::Overdue)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan集約 - 1アイテムの1会員への1回の貸出
///
/// 貸出台帳（Loan Store）のシステム・オブ・レコード。
/// アイテムと会員はカタログサービスが所有するため、IDのみで参照する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub loan_id: LoanId,

    // 他コンテキストへの参照（IDのみ）
    pub item_id: ItemId,
    pub member_id: MemberId,

    // 貸出管理の責務
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// 導出フィールド：status ≠ Returned かつ now > due_date
    ///
    /// 保存済みの値を信頼せず、保存時に`reconcile`で常に再計算する。
    pub is_overdue: bool,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：返却期限を計算する
pub fn calculate_due_date(borrow_date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    borrow_date + Duration::days(days)
}

/// 純粋関数：アイテムを貸し出す
///
/// ビジネスルール：
/// - 貸出期間は指定日数（未指定時は14日間）
/// - 状態はActive、is_overdueはfalse
///
/// 副作用なし。新しいLoanを返す。
/// 貸出可否・重複貸出の検証はアプリケーション層の責務。
pub fn borrow_item(
    item_id: ItemId,
    member_id: MemberId,
    borrowed_at: DateTime<Utc>,
    days: i64,
) -> Result<Loan, BorrowItemError> {
    let loan_id = LoanId::new();
    let due_date = calculate_due_date(borrowed_at, days);

    let loan = Loan {
        loan_id,
        item_id,
        member_id,
        borrow_date: borrowed_at,
        due_date,
        return_date: None,
        status: LoanStatus::Active,
        is_overdue: false,
        created_at: borrowed_at,
        updated_at: borrowed_at,
    };

    Ok(loan)
}

/// 純粋関数：アイテムを返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 既に返却済みの貸出は返却不可
///
/// 副作用なし。新しいLoanを返す。
pub fn return_item(loan: &Loan, returned_at: DateTime<Utc>) -> Result<Loan, ReturnItemError> {
    if loan.status.is_returned() {
        return Err(ReturnItemError::AlreadyReturned);
    }

    let new_loan = Loan {
        return_date: Some(returned_at),
        status: LoanStatus::Returned,
        is_overdue: false,
        updated_at: returned_at,
        ..loan.clone()
    };

    Ok(new_loan)
}

/// 純粋関数：貸出を延滞状態に遷移させる
///
/// 延滞スイープ（`get_overdue_loans`の第1フェーズ）で使用される。
/// 返却済みの貸出には適用しないこと（呼び出し側でActiveのみを選別する）。
pub fn mark_overdue(loan: &Loan, detected_at: DateTime<Utc>) -> Loan {
    Loan {
        status: LoanStatus::Overdue,
        is_overdue: true,
        updated_at: detected_at,
        ..loan.clone()
    }
}

/// 純粋関数：延滞判定
pub fn is_overdue(loan: &Loan, now: DateTime<Utc>) -> bool {
    !loan.status.is_returned() && now > loan.due_date
}

/// 純粋関数：導出フィールドの収束
///
/// 導出ルール：is_overdue ⇔ (status ≠ Returned) ∧ (now > due_date)。
/// 保存されたstatus/is_overdueを信頼せず、保存経路のたびに再計算する。
/// Active状態で期限超過していればOverdueへ遷移させる。
pub fn reconcile(loan: &Loan, now: DateTime<Utc>) -> Loan {
    let overdue = is_overdue(loan, now);

    let status = match loan.status {
        LoanStatus::Active if overdue => LoanStatus::Overdue,
        status => status,
    };

    Loan {
        status,
        is_overdue: overdue,
        ..loan.clone()
    }
}
