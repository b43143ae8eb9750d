use crate::domain::value_objects::{ItemId, MemberId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogServiceError>;

/// カタログサービスのエラー
///
/// ゲートウェイがレスポンスを {成功, 未検出, その他のエラー} に分類し、
/// トランスポート障害を型付きエラーへ変換する。
/// タイムアウトを含むあらゆるコラボレータ障害はNetworkとして一様に扱う。
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// リソースが存在しない（HTTP 404）
    #[error("Resource not found in catalog")]
    NotFound,

    /// カタログサービスがエラーレスポンスを返した
    #[error("Catalog returned error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// ネットワーク障害（接続失敗・タイムアウト等）
    #[error("Catalog request failed: {0}")]
    Network(String),

    /// レスポンスのデコード失敗
    #[error("Catalog response parsing failed: {0}")]
    Decode(String),
}

/// カタログサービスのアイテム
///
/// 貸出コンテキストが関心を持つフィールドのみを保持する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(default)]
    pub title: String,
    pub availability: bool,
}

/// カタログサービスの会員
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMember {
    #[serde(default)]
    pub borrowed_items: Vec<ItemId>,
}

/// 可用性ゲートウェイポート
///
/// 貸出コンテキストからカタログコンテキストへの唯一の経路。
/// Item/Memberレコードはこのポート経由でのみ変更される。
/// アイテム操作の二重パスアドレッシング（正パス/レガシーパス）は
/// アダプタ内部で透過的に処理され、呼び出し側は二重性を意識しない。
#[allow(dead_code)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// アイテムを取得する
    ///
    /// 貸出前の可用性チェックに使用される。
    async fn get_item(&self, item_id: ItemId) -> Result<CatalogItem>;

    /// 会員を取得する
    async fn get_member(&self, member_id: MemberId) -> Result<CatalogMember>;

    /// アイテムの可用性フラグを更新する
    ///
    /// 貸出時にfalse、返却時にtrueへ反転させる。
    async fn set_item_availability(&self, item_id: ItemId, availability: bool) -> Result<()>;

    /// 会員の借用アイテム一覧を更新する
    async fn set_member_borrowed_items(
        &self,
        member_id: MemberId,
        borrowed_items: Vec<ItemId>,
    ) -> Result<()>;
}
