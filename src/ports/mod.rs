#[allow(unused_imports)]
pub mod catalog_service;
#[allow(unused_imports)]
pub mod loan_store;

#[allow(unused_imports)]
pub use catalog_service::*;
#[allow(unused_imports)]
pub use loan_store::*;
