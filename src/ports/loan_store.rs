use crate::domain::loan::{Loan, LoanStatus};
use crate::domain::value_objects::{ItemId, LoanId, MemberId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ストアポート
///
/// 貸出台帳のシステム・オブ・レコード。ドキュメントストア相当の
/// 契約（ID・二次インデックスによるcreate/find/update/delete）を抽象化する。
/// Loanレコードの生成・変更はライフサイクルエンジンのみが行う。
#[allow(dead_code)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// 貸出レコードを新規作成する
    ///
    /// 借用操作の耐久的な「意図」レコード。補償時にはdeleteで取り消される。
    async fn create(&self, loan: Loan) -> Result<()>;

    /// 既存の貸出レコードを更新する
    async fn update(&self, loan: Loan) -> Result<()>;

    /// 貸出レコードを削除する
    ///
    /// アイテム可用性の更新に失敗した場合の補償ロールバック専用。
    /// 通常のライフサイクルでは貸出レコードは削除されない。
    async fn delete(&self, loan_id: LoanId) -> Result<()>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 全貸出を取得する
    async fn find_all(&self) -> Result<Vec<Loan>>;

    /// 会員の全貸出を検索する
    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>>;

    /// アイテムの全貸出を検索する
    async fn find_by_item_id(&self, item_id: ItemId) -> Result<Vec<Loan>>;

    /// ステータスで貸出を検索する
    async fn find_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>>;

    /// アイテムの未返却（Active/Overdue）の貸出を検索する
    ///
    /// 二重貸出チェックに使用される。不変条件が保たれていれば最大1件。
    async fn find_open_by_item_id(&self, item_id: ItemId) -> Result<Option<Loan>>;

    /// 返却期限を過ぎたActiveの貸出を検索する
    ///
    /// due_date < cutoff かつ status が "active" の貸出を返す。
    /// 延滞スイープの候補取得に使用される。
    async fn find_active_due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>>;
}
