use crate::ports::catalog_service::CatalogServiceError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CirculationError {
    /// アイテムがカタログに存在しない
    #[error("Item not found")]
    ItemNotFound,

    /// アイテムが貸出不可
    #[error("Item is not available for borrowing")]
    ItemUnavailable,

    /// アイテムが既に貸出中
    #[error("Item is already on loan")]
    ItemAlreadyOnLoan,

    /// 可用性チェックの失敗（未検出以外のゲートウェイ障害）
    #[error("Failed to check item availability")]
    AvailabilityCheckFailed(#[source] CatalogServiceError),

    /// 可用性更新の失敗（貸出は補償により取り消し済み）
    #[error("Failed to update item availability. Loan cancelled.")]
    AvailabilityUpdateFailed(#[source] CatalogServiceError),

    /// 会員の借用リスト更新の失敗
    ///
    /// 非致命。コアの境界でログに記録され、呼び出し側へは返らない。
    /// 貸出レコードと可用性フラグが貸出可否の正であり、借用リストは
    /// 後から突合可能なベストエフォートの二次情報のため。
    #[error("Failed to update member borrowed items")]
    MemberListUpdateFailed(#[source] CatalogServiceError),

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 既に返却済みの貸出
    #[error("Loan is already returned")]
    LoanAlreadyReturned,

    /// ドメイン層のエラー
    #[error("Domain error: {0}")]
    DomainError(String),

    /// LoanStoreのエラー
    #[error("Loan store error")]
    LoanStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CirculationError>;
