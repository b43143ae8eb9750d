use crate::domain::loan::{Loan, LoanStatus};
use crate::domain::value_objects::{ItemId, LoanId, MemberId};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory mock implementation of LoanStore
///
/// Backs the loan ledger with a plain HashMap for tests and local runs.
#[allow(dead_code)]
pub struct LoanStore {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

#[allow(dead_code)]
impl LoanStore {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored loan records (for test assertions)
    pub fn len(&self) -> usize {
        self.loans.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.lock().unwrap().is_empty()
    }
}

impl Default for LoanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn create(&self, loan: Loan) -> Result<()> {
        self.loans.lock().unwrap().insert(loan.loan_id, loan);
        Ok(())
    }

    async fn update(&self, loan: Loan) -> Result<()> {
        self.loans.lock().unwrap().insert(loan.loan_id, loan);
        Ok(())
    }

    async fn delete(&self, loan_id: LoanId) -> Result<()> {
        self.loans.lock().unwrap().remove(&loan_id);
        Ok(())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans.lock().unwrap().get(&loan_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        Ok(self.loans.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn find_by_item_id(&self, item_id: ItemId) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.status == status)
            .cloned()
            .collect())
    }

    async fn find_open_by_item_id(&self, item_id: ItemId) -> Result<Option<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .find(|l| l.item_id == item_id && l.status.is_open())
            .cloned())
    }

    async fn find_active_due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.status == LoanStatus::Active && l.due_date < cutoff)
            .cloned()
            .collect())
    }
}
