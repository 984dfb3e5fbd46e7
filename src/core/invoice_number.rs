//! Fiscal-year scoped invoice numbers of the form `FY25-26/007`.
//!
//! Sequences below 10 are padded to three digits, larger ones are written as-is
//! (`FY25-26/42`). Existing books already carry numbers in this shape, so the rule stays.
//!
//! Nothing here reserves a number: two callers reading the same list get the same next
//! sequence. Assignment has to be serialized by whoever persists the invoice.

use crate::domain::fiscal_year::FiscalYear;
use crate::utils::error::Result;
use regex::Regex;
use std::sync::LazyLock;

static TRAILING_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)$").unwrap());

impl FiscalYear {
    pub fn invoice_number(&self, sequence: u32) -> String {
        let padded = if sequence < 10 {
            format!("{:03}", sequence)
        } else {
            sequence.to_string()
        };
        format!("FY{}/{}", self.short(), padded)
    }

    fn invoice_prefix(&self) -> String {
        format!("FY{}/", self.short())
    }
}

pub fn format_invoice_number(fiscal_year: &str, sequence: u32) -> Result<String> {
    let fiscal_year = FiscalYear::parse(fiscal_year)?;
    Ok(fiscal_year.invoice_number(sequence))
}

/// `max + 1` over the trailing `/<digits>` of each number, or 1 when none parse.
pub fn next_sequence<S: AsRef<str>>(existing: &[S]) -> u32 {
    existing
        .iter()
        .filter_map(|number| parse_sequence(number.as_ref()))
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

fn parse_sequence(number: &str) -> Option<u32> {
    let caps = TRAILING_SEQUENCE.captures(number)?;
    caps[1].parse().ok()
}

/// Next number for `fiscal_year`; numbers issued in other fiscal years are ignored.
pub fn next_invoice_number<S: AsRef<str>>(fiscal_year: &str, existing: &[S]) -> Result<String> {
    let fiscal_year = FiscalYear::parse(fiscal_year)?;
    let prefix = fiscal_year.invoice_prefix();
    let same_year: Vec<&str> = existing
        .iter()
        .map(|number| number.as_ref())
        .filter(|number| number.starts_with(&prefix))
        .collect();

    let sequence = next_sequence(&same_year);
    tracing::debug!(
        "Next sequence for {} is {} ({} existing numbers in year)",
        fiscal_year,
        sequence,
        same_year.len()
    );
    Ok(fiscal_year.invoice_number(sequence))
}
