//! Repository implementations
//!
//! Read paths hang off repository structs that own the pool; the
//! transactional steps used by the payment and register services are free
//! functions over any executor so they can run inside a caller's transaction.

pub mod accounts;
pub mod catalog;
pub mod payments;
pub mod registers;
pub mod sales;

pub use accounts::AccountRepository;
pub use catalog::CatalogRepository;
pub use payments::{PaymentService, ServiceError};
pub use registers::RegisterRepository;
pub use sales::SaleRepository;
