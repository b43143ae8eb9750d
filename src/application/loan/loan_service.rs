use crate::domain::{self, commands::*, loan::LOAN_PERIOD_DAYS, value_objects::*};
use crate::ports::catalog_service::CatalogServiceError;
use crate::ports::*;
use std::sync::Arc;

use super::errors::{CirculationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// このパターンにより：
/// - すべての依存が明示的
/// - データと振る舞いの分離
/// - テストが明確
#[derive(Clone)]
#[allow(dead_code)]
pub struct ServiceDependencies {
    pub loan_store: Arc<dyn LoanStore>,
    pub catalog_service: Arc<dyn CatalogService>,
}

/// 会員の借用リストへアイテムを追加するヘルパー関数
///
/// 現在のリストを読み、既に含まれていればスキップし、
/// 追加したリストを正パスのみで書き戻す。
async fn append_member_borrowed_item(
    deps: &ServiceDependencies,
    member_id: MemberId,
    item_id: ItemId,
) -> std::result::Result<(), CatalogServiceError> {
    let member = deps.catalog_service.get_member(member_id).await?;

    let mut borrowed_items = member.borrowed_items;
    if !borrowed_items.contains(&item_id) {
        borrowed_items.push(item_id);
        deps.catalog_service
            .set_member_borrowed_items(member_id, borrowed_items)
            .await?;
    }

    Ok(())
}

/// 会員の借用リストからアイテムを除去するヘルパー関数
async fn remove_member_borrowed_item(
    deps: &ServiceDependencies,
    member_id: MemberId,
    item_id: ItemId,
) -> std::result::Result<(), CatalogServiceError> {
    let member = deps.catalog_service.get_member(member_id).await?;

    let mut borrowed_items = member.borrowed_items;
    if borrowed_items.contains(&item_id) {
        borrowed_items.retain(|id| *id != item_id);
        deps.catalog_service
            .set_member_borrowed_items(member_id, borrowed_items)
            .await?;
    }

    Ok(())
}

/// アイテムを貸し出す
///
/// カタログと貸出台帳は別サービスが所有し、両者をまたぐトランザクションは
/// 存在しない。整合性は補償プロトコルで維持する：
///
/// 事前条件（この順で即時失敗、Loan書き込み前に部分状態を残さない）：
/// 1. ゲートウェイ経由でアイテムの可用性を確認
/// 2. 同一アイテムの未返却貸出が存在しないことを確認
///
/// 書き込みシーケンス：
/// a. Loanレコードを作成（耐久的な「意図」レコード）
/// b. アイテムの可用性をfalseへ更新（正パス失敗時のみレガシーパスで1回再試行）
/// c. (b)が両パスとも失敗した場合は作成済みLoanを削除して失敗させる。
///    これが唯一のロールバック経路。
/// d. (b)成功後、会員の借用リストへ追加。失敗してもロールバックせず、
///    ログに記録して貸出を成功として返す。
///
/// # 競合
///
/// ステップ2の存在チェックと(a)の書き込みの間にロックは無く、同一アイテムへの
/// 並行借用は両方ともチェックを通過し得る。低競合を前提とした許容ギャップ。
/// ストア層の一意制約で強化してもよい（契約は変わらない）。
#[allow(dead_code)]
pub async fn create_loan(deps: &ServiceDependencies, cmd: BorrowItem) -> Result<domain::loan::Loan> {
    // 1. アイテムの可用性確認
    let item = match deps.catalog_service.get_item(cmd.item_id).await {
        Ok(item) => item,
        Err(CatalogServiceError::NotFound) => return Err(CirculationError::ItemNotFound),
        Err(e) => return Err(CirculationError::AvailabilityCheckFailed(e)),
    };

    if !item.availability {
        return Err(CirculationError::ItemUnavailable);
    }

    // 2. 同一アイテムの未返却貸出の確認
    let existing = deps
        .loan_store
        .find_open_by_item_id(cmd.item_id)
        .await
        .map_err(CirculationError::LoanStoreError)?;

    if existing.is_some() {
        return Err(CirculationError::ItemAlreadyOnLoan);
    }

    // 3. 意図レコードの作成
    let days = cmd.days.unwrap_or(LOAN_PERIOD_DAYS);
    let loan = domain::loan::borrow_item(cmd.item_id, cmd.member_id, cmd.borrowed_at, days)
        .map_err(|e| CirculationError::DomainError(format!("{:?}", e)))?;

    deps.loan_store
        .create(loan.clone())
        .await
        .map_err(CirculationError::LoanStoreError)?;

    // 4. アイテムを貸出中（availability=false）へ更新
    if let Err(update_err) = deps
        .catalog_service
        .set_item_availability(cmd.item_id, false)
        .await
    {
        // 補償：作成済みのLoanレコードを削除し、操作全体を失敗させる。
        // アイテムが「貸出中」のままLoanレコードが無い状態より、
        // 貸出自体を失敗させる方を選ぶ。
        if let Err(delete_err) = deps.loan_store.delete(loan.loan_id).await {
            tracing::error!(
                loan_id = %loan.loan_id.value(),
                error = %delete_err,
                "Compensating delete failed, orphaned loan record remains"
            );
        }
        return Err(CirculationError::AvailabilityUpdateFailed(update_err));
    }

    tracing::info!(
        item_id = %cmd.item_id,
        title = %item.title,
        "Item marked as unavailable (on loan)"
    );

    // 5. 会員の借用リストへ追加（ベストエフォート、ロールバックしない）
    if let Err(e) = append_member_borrowed_item(deps, cmd.member_id, cmd.item_id).await {
        let non_fatal = CirculationError::MemberListUpdateFailed(e);
        tracing::warn!(
            member_id = %cmd.member_id.value(),
            item_id = %cmd.item_id,
            error = %non_fatal,
            "Member borrowed items update failed, loan remains committed"
        );
    }

    Ok(loan)
}

/// アイテムを返却する
///
/// Loanレコードの更新が正となるステップであり、最初に永続化する。
/// その後のカタログ側の復元（可用性をtrueへ、借用リストから除去）は
/// ベストエフォートで、失敗しても返却は成立させる。
#[allow(dead_code)]
pub async fn return_item(deps: &ServiceDependencies, cmd: ReturnItem) -> Result<domain::loan::Loan> {
    // 1. 貸出の取得
    let loan = deps
        .loan_store
        .get_by_id(cmd.loan_id)
        .await
        .map_err(CirculationError::LoanStoreError)?
        .ok_or(CirculationError::LoanNotFound)?;

    // 2. ドメイン層の純粋関数で返却遷移
    let returned = domain::loan::return_item(&loan, cmd.returned_at).map_err(|e| match e {
        domain::ReturnItemError::AlreadyReturned => CirculationError::LoanAlreadyReturned,
    })?;

    // 3. 永続化（導出フィールドは保存前に収束させる）
    let returned = domain::loan::reconcile(&returned, cmd.returned_at);
    deps.loan_store
        .update(returned.clone())
        .await
        .map_err(CirculationError::LoanStoreError)?;

    // 4. アイテムの可用性を復元（ベストエフォート）
    if let Err(e) = deps
        .catalog_service
        .set_item_availability(loan.item_id, true)
        .await
    {
        tracing::warn!(
            item_id = %loan.item_id,
            error = %e,
            "Failed to restore item availability after return"
        );
    }

    // 5. 会員の借用リストから除去（ベストエフォート）
    if let Err(e) = remove_member_borrowed_item(deps, loan.member_id, loan.item_id).await {
        tracing::warn!(
            member_id = %loan.member_id.value(),
            item_id = %loan.item_id,
            error = %e,
            "Failed to remove item from member borrowed items after return"
        );
    }

    Ok(returned)
}

// ============================================================================
// クエリ（貸出台帳へのパススルー）
// ============================================================================

/// 全貸出を取得する
#[allow(dead_code)]
pub async fn get_all_loans(deps: &ServiceDependencies) -> Result<Vec<domain::loan::Loan>> {
    deps.loan_store
        .find_all()
        .await
        .map_err(CirculationError::LoanStoreError)
}

/// IDで貸出を取得する
///
/// 見つからない場合はNoneを返す（エラーにはしない）。
#[allow(dead_code)]
pub async fn get_loan_by_id(
    deps: &ServiceDependencies,
    loan_id: LoanId,
) -> Result<Option<domain::loan::Loan>> {
    deps.loan_store
        .get_by_id(loan_id)
        .await
        .map_err(CirculationError::LoanStoreError)
}

/// 会員の全貸出を取得する
#[allow(dead_code)]
pub async fn get_loans_by_member_id(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<domain::loan::Loan>> {
    deps.loan_store
        .find_by_member_id(member_id)
        .await
        .map_err(CirculationError::LoanStoreError)
}

/// アイテムの全貸出を取得する
#[allow(dead_code)]
pub async fn get_loans_by_item_id(
    deps: &ServiceDependencies,
    item_id: ItemId,
) -> Result<Vec<domain::loan::Loan>> {
    deps.loan_store
        .find_by_item_id(item_id)
        .await
        .map_err(CirculationError::LoanStoreError)
}

/// 貸出中（Active）の貸出を取得する
#[allow(dead_code)]
pub async fn get_active_loans(deps: &ServiceDependencies) -> Result<Vec<domain::loan::Loan>> {
    deps.loan_store
        .find_by_status(domain::loan::LoanStatus::Active)
        .await
        .map_err(CirculationError::LoanStoreError)
}
