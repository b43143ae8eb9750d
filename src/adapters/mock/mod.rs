pub mod catalog_service;
pub mod loan_store;

#[allow(unused_imports)]
pub use catalog_service::CatalogService;
#[allow(unused_imports)]
pub use loan_store::LoanStore;
