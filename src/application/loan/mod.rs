mod errors;
mod loan_service;
mod overdue_detection;

#[allow(unused_imports)]
pub use errors::{CirculationError, Result};
#[allow(unused_imports)]
pub use loan_service::{
    ServiceDependencies, create_loan, get_active_loans, get_all_loans, get_loan_by_id,
    get_loans_by_item_id, get_loans_by_member_id, return_item,
};
#[allow(unused_imports)]
pub use overdue_detection::get_overdue_loans;
