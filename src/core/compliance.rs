//! Statutory checks on an invoice's GST fields.
//!
//! Rules are independent and reported in a fixed order; nothing here fails, every problem is a
//! [`ComplianceViolation`] in the result.

use crate::domain::model::{
    ComplianceViolation, EntryKind, GstInvoice, LedgerEntry, ValidationResult,
};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static GSTIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][0-9]Z[A-Z0-9]$").unwrap()
});

const OUTSIDE_INDIA: &str = "Outside India";
const SECTION_2_6: &str = "Section 2-6";

pub fn is_valid_gstin(gstin: &str) -> bool {
    GSTIN_PATTERN.is_match(gstin)
}

fn is_export(invoice: &GstInvoice) -> bool {
    invoice.place_of_supply.contains(OUTSIDE_INDIA)
}

fn is_eight_digit_code(code: Option<&str>) -> bool {
    code.is_some_and(|c| c.len() == 8 && c.bytes().all(|b| b.is_ascii_digit()))
}

pub fn validate_invoice(invoice: &GstInvoice) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(gstin) = invoice.gstin.as_deref() {
        if !is_valid_gstin(gstin) {
            errors.push(ComplianceViolation::InvalidGstin);
        }
    }

    if is_export(invoice) && !is_eight_digit_code(invoice.service_code.as_deref()) {
        errors.push(ComplianceViolation::ExportServiceCode);
    }

    if invoice.lut_number.is_some() && invoice.igst_rate != Decimal::ZERO {
        errors.push(ComplianceViolation::LutRequiresZeroIgst);
    }

    // Fires when the export reference is absent. Whether the product meant the opposite is
    // still open, see DESIGN.md.
    if !invoice.place_of_supply.contains(SECTION_2_6) && is_export(invoice) {
        errors.push(ComplianceViolation::MissingSection26Reference);
    }

    ValidationResult { errors }
}

/// Sale entries that fail at least one rule, with their results.
pub fn validate_ledger(entries: &[LedgerEntry]) -> Vec<(String, ValidationResult)> {
    entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::Sale)
        .filter_map(|entry| {
            let result = validate_invoice(&entry.as_gst_invoice());
            if result.is_valid() {
                None
            } else {
                tracing::debug!("Invoice {} failed: {:?}", entry.number, result.messages());
                Some((entry.number.clone(), result))
            }
        })
        .collect()
}
