use crate::domain::amount::{deserialize_amount, deserialize_flag};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tax split across the three GST heads.
///
/// `total` is always exactly `igst + cgst + sgst`; the fields are private so the only way to
/// build one is [`GstComponent::new`]. No rounding happens here, see
/// [`crate::core::summary::round_to_rupee`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GstComponent {
    igst: Decimal,
    cgst: Decimal,
    sgst: Decimal,
    total: Decimal,
}

impl GstComponent {
    pub fn new(igst: Decimal, cgst: Decimal, sgst: Decimal) -> Self {
        Self {
            igst,
            cgst,
            sgst,
            total: igst + cgst + sgst,
        }
    }

    /// `None` when the total does not fit in a `Decimal`.
    pub fn checked_new(igst: Decimal, cgst: Decimal, sgst: Decimal) -> Option<Self> {
        let total = igst.checked_add(cgst)?.checked_add(sgst)?;
        Some(Self {
            igst,
            cgst,
            sgst,
            total,
        })
    }

    pub fn igst(&self) -> Decimal {
        self.igst
    }

    pub fn cgst(&self) -> Decimal {
        self.cgst
    }

    pub fn sgst(&self) -> Decimal {
        self.sgst
    }

    pub fn total(&self) -> Decimal {
        self.total
    }
}

/// Period totals fed into the summary engine.
///
/// Negative amounts are accepted as given; range checks belong to whoever builds the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GstSummaryInput {
    #[serde(deserialize_with = "deserialize_amount")]
    pub output_igst: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub output_cgst: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub output_sgst: Decimal,
    /// ITC from B2B purchases.
    #[serde(deserialize_with = "deserialize_amount")]
    pub itc_igst: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub itc_cgst: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub itc_sgst: Decimal,
    /// Tax paid under reverse charge.
    #[serde(deserialize_with = "deserialize_amount")]
    pub rcm_igst: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub rcm_cgst: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub rcm_sgst: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GstSummaryResult {
    pub output_liability: GstComponent,
    pub itc_available: GstComponent,
    pub rcm_liability: GstComponent,
    pub net_payable: GstComponent,
    /// Credit carried forward; `max(0, -net_payable.total)`.
    pub accumulated_itc: Decimal,
}

/// Tax attributes of an invoice that the compliance rules look at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GstInvoice {
    pub gstin: Option<String>,
    pub pan: Option<String>,
    pub place_of_supply: String,
    pub service_code: Option<String>,
    /// Percentage, e.g. `18` for 18%.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub igst_rate: Decimal,
    pub lut_number: Option<String>,
    pub lut_date: Option<NaiveDate>,
}

/// One failed compliance rule. `Display` renders the message shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComplianceViolation {
    InvalidGstin,
    ExportServiceCode,
    LutRequiresZeroIgst,
    MissingSection26Reference,
}

impl ComplianceViolation {
    pub fn message(&self) -> &'static str {
        match self {
            ComplianceViolation::InvalidGstin => "Invalid GSTIN format",
            ComplianceViolation::ExportServiceCode => "Service code must be 8 digits for exports",
            ComplianceViolation::LutRequiresZeroIgst => "IGST must be 0% for exports under LUT",
            ComplianceViolation::MissingSection26Reference => {
                "Place of supply must include Section 2-6 reference for exports"
            }
        }
    }
}

impl fmt::Display for ComplianceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub errors: Vec<ComplianceViolation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, violation: ComplianceViolation) -> bool {
        self.errors.contains(&violation)
    }

    /// Messages in the order the rules fired.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Sale,
    Purchase,
}

/// A sale invoice or a purchase bill as exported from the books.
///
/// Deserializes directly from JSON. CSV ledgers go through
/// [`crate::core::report::parse_ledger`], which reads amount cells as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: EntryKind,
    pub number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub counterparty_gstin: Option<String>,
    #[serde(default)]
    pub place_of_supply: Option<String>,
    #[serde(default)]
    pub service_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub igst_rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub igst: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub cgst: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub sgst: Decimal,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub reverse_charge: bool,
    #[serde(default)]
    pub lut_number: Option<String>,
    #[serde(default)]
    pub lut_date: Option<NaiveDate>,
}

impl LedgerEntry {
    pub fn tax(&self) -> GstComponent {
        GstComponent::new(self.igst, self.cgst, self.sgst)
    }

    pub fn as_gst_invoice(&self) -> GstInvoice {
        GstInvoice {
            gstin: self.counterparty_gstin.clone(),
            pan: None,
            place_of_supply: self.place_of_supply.clone().unwrap_or_default(),
            service_code: self.service_code.clone(),
            igst_rate: self.igst_rate,
            lut_number: self.lut_number.clone(),
            lut_date: self.lut_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceIssue {
    pub invoice_number: String,
    pub errors: Vec<String>,
}

/// Everything the load stage writes out for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GstReport {
    pub business_name: String,
    pub gstin: Option<String>,
    pub fiscal_year: String,
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub entries_in_period: usize,
    pub input: GstSummaryInput,
    pub summary: GstSummaryResult,
    pub compliance_issues: Vec<ComplianceIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_component_total_is_exact() {
        let component = GstComponent::new(dec!(0.1), dec!(0.2), dec!(0.3));
        assert_eq!(component.total(), dec!(0.6));
    }

    #[test]
    fn test_violation_messages() {
        let result = ValidationResult {
            errors: vec![
                ComplianceViolation::InvalidGstin,
                ComplianceViolation::LutRequiresZeroIgst,
            ],
        };
        assert!(!result.is_valid());
        assert_eq!(
            result.messages(),
            vec![
                "Invalid GSTIN format".to_string(),
                "IGST must be 0% for exports under LUT".to_string()
            ]
        );
        assert!(ValidationResult::default().is_valid());
    }

    #[test]
    fn test_ledger_entry_from_json() {
        let json = r#"{
            "kind": "purchase",
            "number": "BILL-17",
            "date": "2025-05-02",
            "igst": 180,
            "reverse_charge": true
        }"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::Purchase);
        assert!(entry.reverse_charge);
        assert_eq!(entry.tax().total(), dec!(180));
        assert_eq!(entry.as_gst_invoice().place_of_supply, "");
    }

    #[test]
    fn test_ledger_entry_amounts_are_exact() {
        let json = r#"{
            "kind": "sale",
            "number": "FY25-26/001",
            "date": "2025-04-05",
            "igst_rate": 18,
            "igst": 1234567890123456.78,
            "cgst": "0.10",
            "sgst": null
        }"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.igst, dec!(1234567890123456.78));
        assert_eq!(entry.tax().total(), dec!(1234567890123456.88));
        assert_eq!(entry.sgst, Decimal::ZERO);
        assert!(!entry.reverse_charge);
    }

    #[test]
    fn test_summary_input_from_json() {
        let input: GstSummaryInput =
            serde_json::from_str(r#"{"output_igst": 99999999999999999.99, "rcm_cgst": 4.5}"#)
                .unwrap();
        assert_eq!(input.output_igst, dec!(99999999999999999.99));
        assert_eq!(input.rcm_cgst, dec!(4.5));
        assert_eq!(input.itc_igst, Decimal::ZERO);
    }

    #[test]
    fn test_checked_component_overflow() {
        assert!(GstComponent::checked_new(Decimal::MAX, Decimal::ONE, Decimal::ZERO).is_none());
        assert_eq!(
            GstComponent::checked_new(dec!(1), dec!(2), dec!(3)),
            Some(GstComponent::new(dec!(1), dec!(2), dec!(3)))
        );
    }
}
