use crate::domain;
use crate::ports::*;

use super::errors::{CirculationError, Result};
use super::loan_service::ServiceDependencies;

/// 延滞中の貸出を取得する
///
/// 「スイープしてからリード」の2フェーズを厳守する：
/// スイープ前に読むと遷移しきっていないレコードを数え漏らすため。
///
/// 処理フロー：
/// 1. スイープ：due_dateを過ぎたActiveの貸出を取得し、
///    それぞれをOverdue（is_overdue=true）へ遷移させて永続化
/// 2. リード：Overdueステータスの全貸出を取得して返す
///
/// # 引数
/// * `deps` - サービスの依存関係
///
/// # 戻り値
/// スイープ後にOverdue状態にある全貸出
#[allow(dead_code)]
pub async fn get_overdue_loans(deps: &ServiceDependencies) -> Result<Vec<domain::loan::Loan>> {
    let now = chrono::Utc::now();
    let mut detected_count = 0;

    // 1. スイープ：延滞候補を取得して遷移
    let candidates = deps
        .loan_store
        .find_active_due_before(now)
        .await
        .map_err(CirculationError::LoanStoreError)?;

    for loan in candidates {
        // 保存済みフラグを信頼せず再判定する
        if !domain::loan::is_overdue(&loan, now) {
            continue;
        }

        let overdue = domain::loan::mark_overdue(&loan, now);
        deps.loan_store
            .update(overdue)
            .await
            .map_err(CirculationError::LoanStoreError)?;

        detected_count += 1;
    }

    if detected_count > 0 {
        tracing::debug!(detected_count, "Swept active loans past due date to overdue");
    }

    // 2. リード：スイープ後のOverdueを返す
    deps.loan_store
        .find_by_status(domain::loan::LoanStatus::Overdue)
        .await
        .map_err(CirculationError::LoanStoreError)
}
