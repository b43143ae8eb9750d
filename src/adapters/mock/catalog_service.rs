use crate::domain::value_objects::{ItemId, MemberId};
use crate::ports::catalog_service::{
    CatalogItem, CatalogMember, CatalogService as CatalogServiceTrait, CatalogServiceError, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// CatalogServiceのモック実装
///
/// アイテムと会員をインメモリに保持し、状態を持ったテストをサポート。
/// 更新系・参照系それぞれに障害注入フラグを持ち、補償プロトコルの
/// テストで使用される。
#[allow(dead_code)]
pub struct CatalogService {
    items: Mutex<HashMap<ItemId, CatalogItem>>,
    members: Mutex<HashMap<MemberId, CatalogMember>>,
    fail_item_reads: Mutex<bool>,
    fail_item_updates: Mutex<bool>,
    fail_member_updates: Mutex<bool>,
}

#[allow(dead_code)]
impl CatalogService {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
            fail_item_reads: Mutex::new(false),
            fail_item_updates: Mutex::new(false),
            fail_member_updates: Mutex::new(false),
        }
    }

    /// テスト用にアイテムを登録
    pub fn add_item(&self, item_id: ItemId, title: &str, availability: bool) {
        self.items.lock().unwrap().insert(
            item_id,
            CatalogItem {
                title: title.to_string(),
                availability,
            },
        );
    }

    /// テスト用に会員を登録
    pub fn add_member(&self, member_id: MemberId, borrowed_items: Vec<ItemId>) {
        self.members
            .lock()
            .unwrap()
            .insert(member_id, CatalogMember { borrowed_items });
    }

    /// アイテム参照を失敗させる（可用性チェック障害の再現）
    pub fn fail_item_reads(&self, fail: bool) {
        *self.fail_item_reads.lock().unwrap() = fail;
    }

    /// アイテム更新を失敗させる（可用性更新障害の再現）
    pub fn fail_item_updates(&self, fail: bool) {
        *self.fail_item_updates.lock().unwrap() = fail;
    }

    /// 会員更新を失敗させる（借用リスト更新障害の再現）
    pub fn fail_member_updates(&self, fail: bool) {
        *self.fail_member_updates.lock().unwrap() = fail;
    }

    /// 現在のアイテム可用性を取得（テストの検証用）
    pub fn item_availability(&self, item_id: ItemId) -> Option<bool> {
        self.items
            .lock()
            .unwrap()
            .get(&item_id)
            .map(|item| item.availability)
    }

    /// 現在の会員借用リストを取得（テストの検証用）
    pub fn member_borrowed_items(&self, member_id: MemberId) -> Vec<ItemId> {
        self.members
            .lock()
            .unwrap()
            .get(&member_id)
            .map(|member| member.borrowed_items.clone())
            .unwrap_or_default()
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    async fn get_item(&self, item_id: ItemId) -> Result<CatalogItem> {
        if *self.fail_item_reads.lock().unwrap() {
            return Err(CatalogServiceError::Network("injected read failure".into()));
        }
        self.items
            .lock()
            .unwrap()
            .get(&item_id)
            .cloned()
            .ok_or(CatalogServiceError::NotFound)
    }

    async fn get_member(&self, member_id: MemberId) -> Result<CatalogMember> {
        self.members
            .lock()
            .unwrap()
            .get(&member_id)
            .cloned()
            .ok_or(CatalogServiceError::NotFound)
    }

    async fn set_item_availability(&self, item_id: ItemId, availability: bool) -> Result<()> {
        if *self.fail_item_updates.lock().unwrap() {
            return Err(CatalogServiceError::Http {
                status: 500,
                message: "injected update failure".into(),
            });
        }
        let mut items = self.items.lock().unwrap();
        let item = items
            .get_mut(&item_id)
            .ok_or(CatalogServiceError::NotFound)?;
        item.availability = availability;
        Ok(())
    }

    async fn set_member_borrowed_items(
        &self,
        member_id: MemberId,
        borrowed_items: Vec<ItemId>,
    ) -> Result<()> {
        if *self.fail_member_updates.lock().unwrap() {
            return Err(CatalogServiceError::Http {
                status: 500,
                message: "injected update failure".into(),
            });
        }
        let mut members = self.members.lock().unwrap();
        let member = members
            .get_mut(&member_id)
            .ok_or(CatalogServiceError::NotFound)?;
        member.borrowed_items = borrowed_items;
        Ok(())
    }
}
