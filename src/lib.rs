pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::storage::LocalStorage;
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::compliance::{validate_invoice, validate_ledger};
pub use crate::core::engine::ReportEngine;
pub use crate::core::invoice_number::{format_invoice_number, next_invoice_number, next_sequence};
pub use crate::core::ledger::{check_ledger, load_ledger, next_sale_number, LedgerCheck};
pub use crate::core::report::ReportPipeline;
pub use crate::core::summary::{calculate_net_payable, round_to_rupee, summarize, try_summarize};
pub use crate::domain::fiscal_year::FiscalYear;
pub use crate::domain::model::{
    ComplianceViolation, GstComponent, GstInvoice, GstSummaryInput, GstSummaryResult,
    LedgerEntry, ValidationResult,
};
pub use crate::utils::error::{GstError, Result};
