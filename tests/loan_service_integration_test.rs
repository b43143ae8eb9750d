use chrono::{Duration, Utc};
use rusty_circulation::adapters::mock::{CatalogService as MockCatalogService, LoanStore as MockLoanStore};
use rusty_circulation::application::loan::{
    CirculationError, ServiceDependencies, create_loan, get_active_loans, get_loan_by_id,
    get_loans_by_item_id, get_loans_by_member_id, get_overdue_loans, return_item,
};
use rusty_circulation::domain::commands::{BorrowItem, ReturnItem};
use rusty_circulation::domain::loan::{LOAN_PERIOD_DAYS, LoanStatus};
use rusty_circulation::domain::value_objects::*;
use std::sync::Arc;

// ============================================================================
// テストセットアップ
// ============================================================================

/// モックアダプターを組んだサービス依存関係を作成
///
/// モックの具象型への参照を残し、カタログ側の状態検証と障害注入を
/// テストから行えるようにする。
fn setup_deps() -> (
    ServiceDependencies,
    Arc<MockLoanStore>,
    Arc<MockCatalogService>,
) {
    let loan_store = Arc::new(MockLoanStore::new());
    let catalog_service = Arc::new(MockCatalogService::new());

    let deps = ServiceDependencies {
        loan_store: loan_store.clone(),
        catalog_service: catalog_service.clone(),
    };

    (deps, loan_store, catalog_service)
}

/// テスト用のアイテムと会員をカタログに登録
fn setup_catalog_entities(catalog: &MockCatalogService) -> (ItemId, MemberId) {
    let item_id = ItemId::new();
    let member_id = MemberId::new();

    catalog.add_item(item_id, "The Left Hand of Darkness", true);
    catalog.add_member(member_id, vec![]);

    (item_id, member_id)
}

fn borrow_cmd(item_id: ItemId, member_id: MemberId) -> BorrowItem {
    BorrowItem {
        item_id,
        member_id,
        days: None,
        borrowed_at: Utc::now(),
    }
}

// ============================================================================
// 貸出作成: 正常系
// ============================================================================

#[tokio::test]
async fn test_create_loan_success() {
    let (deps, loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let cmd = borrow_cmd(item_id, member_id);
    let borrowed_at = cmd.borrowed_at;

    let loan = create_loan(&deps, cmd).await.expect("loan should be created");

    // 貸出レコードの検証
    assert_eq!(loan.item_id, item_id);
    assert_eq!(loan.member_id, member_id);
    assert_eq!(loan.status, LoanStatus::Active);
    assert!(!loan.is_overdue);
    assert_eq!(loan.due_date, borrowed_at + Duration::days(LOAN_PERIOD_DAYS));

    // 貸出台帳にちょうど1件永続化されている
    assert_eq!(loan_store.len(), 1);
    let stored = get_loan_by_id(&deps, loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored, loan);

    // カタログ側：アイテムは貸出中、会員の借用リストに追加済み
    assert_eq!(catalog.item_availability(item_id), Some(false));
    assert_eq!(catalog.member_borrowed_items(member_id), vec![item_id]);
}

#[tokio::test]
async fn test_create_loan_honors_custom_period() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let mut cmd = borrow_cmd(item_id, member_id);
    cmd.days = Some(7);
    let borrowed_at = cmd.borrowed_at;

    let loan = create_loan(&deps, cmd).await.unwrap();

    assert_eq!(loan.due_date, borrowed_at + Duration::days(7));
}

#[tokio::test]
async fn test_create_loan_skips_member_list_append_when_already_present() {
    let (deps, _loan_store, catalog) = setup_deps();
    let item_id = ItemId::new();
    let member_id = MemberId::new();

    catalog.add_item(item_id, "Dune", true);
    // 借用リストに既に含まれている（過去の突合漏れを想定）
    catalog.add_member(member_id, vec![item_id]);

    create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();

    // 重複は追加されない
    assert_eq!(catalog.member_borrowed_items(member_id), vec![item_id]);
}

// ============================================================================
// 貸出作成: 事前条件の失敗（部分状態を残さない）
// ============================================================================

#[tokio::test]
async fn test_create_loan_fails_when_item_not_found() {
    let (deps, loan_store, catalog) = setup_deps();
    let member_id = MemberId::new();
    catalog.add_member(member_id, vec![]);

    let result = create_loan(&deps, borrow_cmd(ItemId::new(), member_id)).await;

    assert!(matches!(result, Err(CirculationError::ItemNotFound)));
    assert!(loan_store.is_empty());
}

#[tokio::test]
async fn test_create_loan_fails_when_item_unavailable() {
    let (deps, loan_store, catalog) = setup_deps();
    let item_id = ItemId::new();
    let member_id = MemberId::new();

    catalog.add_item(item_id, "Dune", false);
    catalog.add_member(member_id, vec![]);

    let result = create_loan(&deps, borrow_cmd(item_id, member_id)).await;

    assert!(matches!(result, Err(CirculationError::ItemUnavailable)));
    // 貸出レコードは作成されない
    assert!(loan_store.is_empty());
}

#[tokio::test]
async fn test_create_loan_fails_when_availability_check_fails() {
    let (deps, loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    catalog.fail_item_reads(true);

    let result = create_loan(&deps, borrow_cmd(item_id, member_id)).await;

    assert!(matches!(
        result,
        Err(CirculationError::AvailabilityCheckFailed(_))
    ));
    assert!(loan_store.is_empty());
}

#[tokio::test]
async fn test_create_loan_fails_when_item_already_on_loan() {
    let (deps, loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();

    // カタログ側の可用性だけが誤ってtrueへ戻された状態でも、
    // 台帳の未返却チェックが二重貸出を拒否する
    catalog.add_item(item_id, "The Left Hand of Darkness", true);

    let result = create_loan(&deps, borrow_cmd(item_id, MemberId::new())).await;

    assert!(matches!(result, Err(CirculationError::ItemAlreadyOnLoan)));
    assert_eq!(loan_store.len(), 1);
}

// ============================================================================
// 貸出作成: 補償プロトコル
// ============================================================================

#[tokio::test]
async fn test_create_loan_compensates_when_availability_update_fails() {
    let (deps, loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    catalog.fail_item_updates(true);

    let result = create_loan(&deps, borrow_cmd(item_id, member_id)).await;

    assert!(matches!(
        result,
        Err(CirculationError::AvailabilityUpdateFailed(_))
    ));

    // 補償：作成されたLoanレコードは削除されている
    assert!(loan_store.is_empty());
    // アイテムは貸出可能なまま、借用リストも未更新
    assert_eq!(catalog.item_availability(item_id), Some(true));
    assert!(catalog.member_borrowed_items(member_id).is_empty());
}

#[tokio::test]
async fn test_create_loan_succeeds_when_member_list_update_fails() {
    let (deps, loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    catalog.fail_member_updates(true);

    // 借用リスト更新の失敗は貸出を失敗させない
    let loan = create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .expect("loan should still succeed");

    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan_store.len(), 1);
    // 貸出と可用性フラグは確定済みのまま
    assert_eq!(catalog.item_availability(item_id), Some(false));
    assert!(catalog.member_borrowed_items(member_id).is_empty());
}

#[tokio::test]
async fn test_create_loan_succeeds_when_member_missing_from_catalog() {
    let (deps, loan_store, catalog) = setup_deps();
    let item_id = ItemId::new();
    catalog.add_item(item_id, "Dune", true);

    // 会員がカタログに存在しなくても貸出自体は成立する
    let loan = create_loan(&deps, borrow_cmd(item_id, MemberId::new()))
        .await
        .expect("loan should still succeed");

    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan_store.len(), 1);
    assert_eq!(catalog.item_availability(item_id), Some(false));
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_return_item_success() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let loan = create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();

    let returned_at = Utc::now();
    let returned = return_item(
        &deps,
        ReturnItem {
            loan_id: loan.loan_id,
            returned_at,
        },
    )
    .await
    .expect("return should succeed");

    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.return_date, Some(returned_at));

    // 永続化された状態も返却済み
    let stored = get_loan_by_id(&deps, loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Returned);

    // カタログ側の復元：貸出可能へ戻り、借用リストから除去
    assert_eq!(catalog.item_availability(item_id), Some(true));
    assert!(catalog.member_borrowed_items(member_id).is_empty());
}

#[tokio::test]
async fn test_return_item_fails_when_loan_not_found() {
    let (deps, _loan_store, _catalog) = setup_deps();

    let result = return_item(
        &deps,
        ReturnItem {
            loan_id: LoanId::new(),
            returned_at: Utc::now(),
        },
    )
    .await;

    assert!(matches!(result, Err(CirculationError::LoanNotFound)));
}

#[tokio::test]
async fn test_return_item_fails_when_already_returned() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let loan = create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();

    let cmd = ReturnItem {
        loan_id: loan.loan_id,
        returned_at: Utc::now(),
    };
    return_item(&deps, cmd.clone()).await.unwrap();

    let result = return_item(&deps, cmd).await;
    assert!(matches!(result, Err(CirculationError::LoanAlreadyReturned)));
}

#[tokio::test]
async fn test_return_item_survives_catalog_failure() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let loan = create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();

    // 返却時のカタログ側復元は全滅させる
    catalog.fail_item_updates(true);
    catalog.fail_member_updates(true);

    let returned = return_item(
        &deps,
        ReturnItem {
            loan_id: loan.loan_id,
            returned_at: Utc::now(),
        },
    )
    .await
    .expect("return should never block on catalog failures");

    assert_eq!(returned.status, LoanStatus::Returned);
    // 復元は失敗したまま残る（後から突合可能）
    assert_eq!(catalog.item_availability(item_id), Some(false));
    assert_eq!(catalog.member_borrowed_items(member_id), vec![item_id]);
}

// ============================================================================
// 延滞スイープ
// ============================================================================

#[tokio::test]
async fn test_get_overdue_loans_sweeps_then_reads() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    // 7日間の貸出を8日前に作成（既に期限超過）
    let mut cmd = borrow_cmd(item_id, member_id);
    cmd.days = Some(7);
    cmd.borrowed_at = Utc::now() - Duration::days(8);

    let loan = create_loan(&deps, cmd).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Active);

    let overdue = get_overdue_loans(&deps).await.unwrap();

    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].loan_id, loan.loan_id);
    assert_eq!(overdue[0].status, LoanStatus::Overdue);
    assert!(overdue[0].is_overdue);

    // スイープは永続化される：独立した再取得でもOverdueを反映
    let stored = get_loan_by_id(&deps, loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Overdue);
    assert!(stored.is_overdue);
}

#[tokio::test]
async fn test_get_overdue_loans_ignores_loans_within_period() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let loan = create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();

    let overdue = get_overdue_loans(&deps).await.unwrap();

    assert!(overdue.is_empty());
    // 期限内の貸出はActiveのまま
    let stored = get_loan_by_id(&deps, loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Active);
}

#[tokio::test]
async fn test_get_overdue_loans_ignores_returned_loans() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let mut cmd = borrow_cmd(item_id, member_id);
    cmd.days = Some(7);
    cmd.borrowed_at = Utc::now() - Duration::days(8);

    let loan = create_loan(&deps, cmd).await.unwrap();
    return_item(
        &deps,
        ReturnItem {
            loan_id: loan.loan_id,
            returned_at: Utc::now(),
        },
    )
    .await
    .unwrap();

    let overdue = get_overdue_loans(&deps).await.unwrap();
    assert!(overdue.is_empty());
}

/// 具体シナリオ：アイテム"B1"を会員"M1"が0日目に7日間で借用
/// → Loan{status=Active, due=7日目}、8日目の延滞照会に含まれる
#[tokio::test]
async fn test_borrow_then_overdue_after_due_date_scenario() {
    let (deps, _loan_store, catalog) = setup_deps();

    let b1 = ItemId::new();
    let m1 = MemberId::new();
    catalog.add_item(b1, "B1", true);
    catalog.add_member(m1, vec![]);

    let day0 = Utc::now() - Duration::days(8);
    let cmd = BorrowItem {
        item_id: b1,
        member_id: m1,
        days: Some(7),
        borrowed_at: day0,
    };

    let loan = create_loan(&deps, cmd).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.due_date, day0 + Duration::days(7));
    assert_eq!(catalog.item_availability(b1), Some(false));

    // 8日目（現在）の延滞照会
    let overdue = get_overdue_loans(&deps).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].loan_id, loan.loan_id);
    assert_eq!(overdue[0].status, LoanStatus::Overdue);
    assert!(overdue[0].is_overdue);
}

// ============================================================================
// クエリ（パススルー）
// ============================================================================

#[tokio::test]
async fn test_queries_pass_through_to_loan_store() {
    let (deps, _loan_store, catalog) = setup_deps();
    let (item_id, member_id) = setup_catalog_entities(&catalog);

    let other_item = ItemId::new();
    let other_member = MemberId::new();
    catalog.add_item(other_item, "Solaris", true);
    catalog.add_member(other_member, vec![]);

    let loan1 = create_loan(&deps, borrow_cmd(item_id, member_id))
        .await
        .unwrap();
    let loan2 = create_loan(&deps, borrow_cmd(other_item, other_member))
        .await
        .unwrap();

    let by_member = get_loans_by_member_id(&deps, member_id).await.unwrap();
    assert_eq!(by_member.len(), 1);
    assert_eq!(by_member[0].loan_id, loan1.loan_id);

    let by_item = get_loans_by_item_id(&deps, other_item).await.unwrap();
    assert_eq!(by_item.len(), 1);
    assert_eq!(by_item[0].loan_id, loan2.loan_id);

    let active = get_active_loans(&deps).await.unwrap();
    assert_eq!(active.len(), 2);

    // 未知のIDは空振り（エラーではない）
    assert!(get_loan_by_id(&deps, LoanId::new()).await.unwrap().is_none());
    assert!(
        get_loans_by_member_id(&deps, MemberId::new())
            .await
            .unwrap()
            .is_empty()
    );
}
