//! Whole-ledger operations behind the `validate` and `next-number` commands.

use crate::core::compliance::validate_ledger;
use crate::core::invoice_number::next_invoice_number;
use crate::core::report::parse_ledger;
use crate::core::{LedgerFormat, Storage};
use crate::domain::model::{EntryKind, LedgerEntry, ValidationResult};
use crate::utils::error::{GstError, Result};

pub async fn load_ledger<S: Storage>(
    storage: &S,
    path: &str,
    format: LedgerFormat,
) -> Result<Vec<LedgerEntry>> {
    let data = storage.read_file(path).await?;
    parse_ledger(&data, format)
}

/// Outcome of checking every sale invoice in a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCheck {
    pub sales: usize,
    pub failures: Vec<(String, ValidationResult)>,
}

impl LedgerCheck {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of sales checked, or a `ValidationError` when any of them failed.
    pub fn into_result(self) -> Result<usize> {
        if self.passed() {
            Ok(self.sales)
        } else {
            Err(GstError::ValidationError {
                message: format!(
                    "{} of {} sale invoices failed",
                    self.failures.len(),
                    self.sales
                ),
            })
        }
    }
}

pub fn check_ledger(entries: &[LedgerEntry]) -> LedgerCheck {
    LedgerCheck {
        sales: entries.iter().filter(|e| e.kind == EntryKind::Sale).count(),
        failures: validate_ledger(entries),
    }
}

pub fn sale_numbers(entries: &[LedgerEntry]) -> Vec<&str> {
    entries
        .iter()
        .filter(|e| e.kind == EntryKind::Sale)
        .map(|e| e.number.as_str())
        .collect()
}

/// Next sale number for `fiscal_year` given the sales already in the ledger. Purchase bill
/// numbers belong to suppliers and are ignored.
pub fn next_sale_number(fiscal_year: &str, entries: &[LedgerEntry]) -> Result<String> {
    next_invoice_number(fiscal_year, &sale_numbers(entries))
}
