use crate::domain::loan::{Loan, LoanStatus};
use crate::domain::value_objects::{ItemId, LoanId, MemberId};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// PostgreSQLの行データをLoanに変換する
///
/// statusカラムの文字列からLoanStatusへの変換でエラーハンドリングを行う。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.get("status");
    let status = LoanStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        item_id: ItemId::from_uuid(row.get("item_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        borrow_date: row.get("borrow_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
        status,
        is_overdue: row.get("is_overdue"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// LoanStoreのPostgreSQL実装
///
/// 貸出台帳を単一のloansテーブルに永続化する。
#[allow(dead_code)]
pub struct LoanStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl LoanStore {
    /// PostgreSQLコネクションプールから新しいLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        loan_id,
        item_id,
        member_id,
        borrow_date,
        due_date,
        return_date,
        status,
        is_overdue,
        created_at,
        updated_at
    FROM loans
"#;

#[async_trait]
impl LoanStoreTrait for LoanStore {
    /// 貸出レコードを新規作成する
    ///
    /// 未返却（active/overdue）の貸出に対する部分ユニークインデックスが
    /// ストア層でも二重貸出を防ぐ。重複時はエラーとして呼び出し側へ伝播する。
    async fn create(&self, loan: Loan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                item_id,
                member_id,
                borrow_date,
                due_date,
                return_date,
                status,
                is_overdue,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.item_id.value())
        .bind(loan.member_id.value())
        .bind(loan.borrow_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.status.as_str())
        .bind(loan.is_overdue)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 既存の貸出レコードを更新する
    async fn update(&self, loan: Loan) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE loans
            SET
                due_date = $2,
                return_date = $3,
                status = $4,
                is_overdue = $5,
                updated_at = $6
            WHERE loan_id = $1
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.status.as_str())
        .bind(loan.is_overdue)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 貸出レコードを削除する（補償ロールバック用）
    async fn delete(&self, loan_id: LoanId) -> Result<()> {
        sqlx::query("DELETE FROM loans WHERE loan_id = $1")
            .bind(loan_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("{} WHERE loan_id = $1", SELECT_COLUMNS))
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!("{} ORDER BY borrow_date DESC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE member_id = $1 ORDER BY borrow_date DESC",
            SELECT_COLUMNS
        ))
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn find_by_item_id(&self, item_id: ItemId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE item_id = $1 ORDER BY borrow_date DESC",
            SELECT_COLUMNS
        ))
        .bind(item_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn find_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE status = $1 ORDER BY borrow_date DESC",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// アイテムの未返却の貸出を検索する（二重貸出チェック用）
    ///
    /// (item_id, status)の部分インデックスを使用してパフォーマンスを最適化。
    async fn find_open_by_item_id(&self, item_id: ItemId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!(
            "{} WHERE item_id = $1 AND status IN ('active', 'overdue') LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(item_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// 延滞スイープの候補を検索する
    ///
    /// (status, due_date)の部分インデックスを使用してパフォーマンスを最適化。
    async fn find_active_due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{} WHERE status = 'active' AND due_date < $1 ORDER BY due_date ASC",
            SELECT_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
