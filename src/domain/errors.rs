#![allow(dead_code)]

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowItemError {
    // 現時点では発生しないが、将来的にアプリケーション層で追加される可能性
    // 例: ItemNotFound, ItemUnavailable, ItemAlreadyOnLoan など
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnItemError {
    /// 既に返却済み
    AlreadyReturned,
}
