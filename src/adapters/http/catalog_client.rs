use crate::domain::value_objects::{ItemId, MemberId};
use crate::ports::catalog_service::{
    CatalogItem, CatalogMember, CatalogService as CatalogServiceTrait, CatalogServiceError, Result,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

/// カタログサービスのペイロードエンベロープ
///
/// コラボレータは `{"data": T}` 形式と素の `T` 形式の両方でペイロードを
/// 返すため、どちらでもアンラップできるようにする。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// CatalogServiceのHTTP実装
///
/// 固定のベースURLに対して冪等なREST風の操作を行う薄いクライアント。
/// アイテムリソースは二通りのアドレッシング（正パス `/items`、レガシー
/// パス `/books`）を持つ可能性があり、正パスが失敗した場合のみ
/// レガシーパスで1回だけ再試行する。会員リソースは正パスのみ。
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

#[allow(dead_code)]
impl CatalogClient {
    /// ベースURLを指定してクライアントを作成
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// CATALOG_SERVICE_URL環境変数からクライアントを作成
    ///
    /// 未設定の場合はローカルのカタログサービスを指す。
    pub fn from_env() -> Self {
        let base_url = std::env::var("CATALOG_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:3001".into());
        Self::new(base_url)
    }

    /// GETリクエストを発行し、レスポンスを分類する
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| CatalogServiceError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let envelope = response
                    .json::<Envelope<T>>()
                    .await
                    .map_err(|e| CatalogServiceError::Decode(e.to_string()))?;
                Ok(envelope.into_inner())
            }
            StatusCode::NOT_FOUND => Err(CatalogServiceError::NotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CatalogServiceError::Http {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }

    /// PUTリクエストを発行し、レスポンスを分類する
    ///
    /// 更新後のリソースが返されるが、呼び出し側は使用しないため破棄する。
    async fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .put(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| CatalogServiceError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(CatalogServiceError::NotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CatalogServiceError::Http {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }

    /// アイテムリソースのGET（正パス → レガシーパスの順）
    ///
    /// 再試行は固定1回のフォールバックのみで、バックオフループではない。
    /// 両パスとも失敗した場合はレガシーパスのエラーを返す。
    async fn get_item_resource(&self, item_id: ItemId) -> Result<CatalogItem> {
        match self.get_json(&format!("/items/{}", item_id.value())).await {
            Ok(item) => Ok(item),
            Err(primary_err) => {
                tracing::debug!(
                    item_id = %item_id,
                    error = %primary_err,
                    "Primary item path failed, retrying via legacy path"
                );
                self.get_json(&format!("/books/{}", item_id.value())).await
            }
        }
    }

    /// アイテムリソースのPUT（正パス → レガシーパスの順）
    async fn put_item_resource(&self, item_id: ItemId, body: &serde_json::Value) -> Result<()> {
        match self
            .put_json(&format!("/items/{}", item_id.value()), body)
            .await
        {
            Ok(()) => Ok(()),
            Err(primary_err) => {
                tracing::debug!(
                    item_id = %item_id,
                    error = %primary_err,
                    "Primary item path failed, retrying via legacy path"
                );
                self.put_json(&format!("/books/{}", item_id.value()), body)
                    .await
            }
        }
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogClient {
    /// GET /items/{id}（レガシー: GET /books/{id}）
    async fn get_item(&self, item_id: ItemId) -> Result<CatalogItem> {
        self.get_item_resource(item_id).await
    }

    /// GET /members/{id}
    async fn get_member(&self, member_id: MemberId) -> Result<CatalogMember> {
        self.get_json(&format!("/members/{}", member_id.value()))
            .await
    }

    /// PUT /items/{id}（レガシー: PUT /books/{id}）
    async fn set_item_availability(&self, item_id: ItemId, availability: bool) -> Result<()> {
        self.put_item_resource(item_id, &json!({ "availability": availability }))
            .await
    }

    /// PUT /members/{id}
    async fn set_member_borrowed_items(
        &self,
        member_id: MemberId,
        borrowed_items: Vec<ItemId>,
    ) -> Result<()> {
        self.put_json(
            &format!("/members/{}", member_id.value()),
            &json!({ "borrowedItems": borrowed_items }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_unwraps_wrapped_payload() {
        let item: Envelope<CatalogItem> =
            serde_json::from_str(r#"{"data": {"title": "Dune", "availability": true}}"#).unwrap();
        let item = item.into_inner();
        assert_eq!(item.title, "Dune");
        assert!(item.availability);
    }

    #[test]
    fn test_envelope_unwraps_bare_payload() {
        let item: Envelope<CatalogItem> =
            serde_json::from_str(r#"{"title": "Dune", "availability": false}"#).unwrap();
        assert!(!item.into_inner().availability);
    }

    #[test]
    fn test_member_payload_defaults_to_empty_borrowed_items() {
        let member: Envelope<CatalogMember> = serde_json::from_str(r#"{"name": "M1"}"#).unwrap();
        assert!(member.into_inner().borrowed_items.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = CatalogClient::new("http://localhost:3001/");
        assert_eq!(client.base_url, "http://localhost:3001");
    }
}
