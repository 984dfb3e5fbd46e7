pub mod aggregate;
pub mod compliance;
pub mod engine;
pub mod invoice_number;
pub mod ledger;
pub mod report;
pub mod summary;

pub use crate::domain::model::{GstReport, LedgerEntry};
pub use crate::domain::ports::{ConfigProvider, LedgerFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
