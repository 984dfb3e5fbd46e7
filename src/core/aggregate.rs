use crate::domain::fiscal_year::FiscalYear;
use crate::domain::model::{EntryKind, GstSummaryInput, LedgerEntry};
use crate::utils::error::{GstError, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Inclusive date range a return is filed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    from: NaiveDate,
    to: NaiveDate,
}

impl ReportingPeriod {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(GstError::InvalidConfigValueError {
                field: "period".to_string(),
                value: format!("{}..{}", from, to),
                reason: "period start is after period end".to_string(),
            });
        }
        Ok(Self { from, to })
    }

    pub fn for_fiscal_year(fiscal_year: &FiscalYear) -> Self {
        Self {
            from: fiscal_year.start_date(),
            to: fiscal_year.end_date(),
        }
    }

    /// A calendar month, the usual GSTR-3B period.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let invalid = || GstError::InvalidConfigValueError {
            field: "period".to_string(),
            value: format!("{}-{:02}", year, month),
            reason: "not a calendar month".to_string(),
        };
        let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let to = next.pred_opt().ok_or_else(invalid)?;
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    pub fn label(&self) -> String {
        let same_month =
            self.from.month() == self.to.month() && self.from.year() == self.to.year();
        let month_end = self.to.succ_opt().is_some_and(|next| next.day() == 1);
        if self.from.day() == 1 && same_month && month_end {
            self.from.format("%b %Y").to_string()
        } else {
            format!("{} to {}", self.from, self.to)
        }
    }
}

fn accumulate(total: &mut Decimal, amount: Decimal, entry: &LedgerEntry) -> Result<()> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| GstError::ProcessingError {
            message: format!(
                "Tax total overflowed while adding entry {} ({})",
                entry.number, amount
            ),
        })?;
    Ok(())
}

/// Sums ledger tax into the nine summary inputs.
///
/// Sales go to output tax, reverse-charge purchases to RCM, every other purchase to ITC.
/// Entries dated outside `period` are skipped. Fails with `ProcessingError` when a running
/// total leaves the `Decimal` range.
pub fn aggregate(entries: &[LedgerEntry], period: &ReportingPeriod) -> Result<GstSummaryInput> {
    let mut input = GstSummaryInput::default();
    let mut skipped = 0usize;

    for entry in entries {
        if !period.contains(entry.date) {
            skipped += 1;
            continue;
        }

        let (igst, cgst, sgst) = match (entry.kind, entry.reverse_charge) {
            (EntryKind::Sale, _) => (
                &mut input.output_igst,
                &mut input.output_cgst,
                &mut input.output_sgst,
            ),
            (EntryKind::Purchase, true) => {
                (&mut input.rcm_igst, &mut input.rcm_cgst, &mut input.rcm_sgst)
            }
            (EntryKind::Purchase, false) => {
                (&mut input.itc_igst, &mut input.itc_cgst, &mut input.itc_sgst)
            }
        };
        accumulate(igst, entry.igst, entry)?;
        accumulate(cgst, entry.cgst, entry)?;
        accumulate(sgst, entry.sgst, entry)?;
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} entries outside {}", skipped, period.label());
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(kind: EntryKind, date: &str, igst: Decimal, cgst: Decimal, rcm: bool) -> LedgerEntry {
        LedgerEntry {
            kind,
            number: format!("{:?}-{}", kind, date),
            date: date.parse().unwrap(),
            counterparty_gstin: None,
            place_of_supply: None,
            service_code: None,
            igst_rate: Decimal::ZERO,
            igst,
            cgst,
            sgst: cgst,
            reverse_charge: rcm,
            lut_number: None,
            lut_date: None,
        }
    }

    #[test]
    fn test_entries_route_to_heads() {
        let fy = FiscalYear::parse("2025-26").unwrap();
        let entries = vec![
            entry(EntryKind::Sale, "2025-04-10", dec!(1000), dec!(0), false),
            entry(EntryKind::Sale, "2025-05-10", dec!(0), dec!(45), false),
            entry(EntryKind::Purchase, "2025-06-01", dec!(200), dec!(0), false),
            entry(EntryKind::Purchase, "2025-06-02", dec!(100), dec!(9), true),
        ];

        let input = aggregate(&entries, &ReportingPeriod::for_fiscal_year(&fy)).unwrap();

        assert_eq!(input.output_igst, dec!(1000));
        assert_eq!(input.output_cgst, dec!(45));
        assert_eq!(input.output_sgst, dec!(45));
        assert_eq!(input.itc_igst, dec!(200));
        assert_eq!(input.rcm_igst, dec!(100));
        assert_eq!(input.rcm_cgst, dec!(9));
        assert_eq!(input.rcm_sgst, dec!(9));
    }

    #[test]
    fn test_out_of_period_entries_are_skipped() {
        let entries = vec![
            entry(EntryKind::Sale, "2025-03-31", dec!(500), dec!(0), false),
            entry(EntryKind::Sale, "2025-04-01", dec!(50), dec!(0), false),
            entry(EntryKind::Sale, "2025-04-30", dec!(5), dec!(0), false),
            entry(EntryKind::Sale, "2025-05-01", dec!(7), dec!(0), false),
        ];

        let input = aggregate(&entries, &ReportingPeriod::month(2025, 4).unwrap()).unwrap();
        assert_eq!(input.output_igst, dec!(55));
    }

    #[test]
    fn test_overflowing_totals_are_an_error() {
        let fy = FiscalYear::parse("2025-26").unwrap();
        let entries = vec![
            entry(EntryKind::Purchase, "2025-06-01", Decimal::MAX, dec!(0), false),
            entry(EntryKind::Purchase, "2025-06-02", dec!(1), dec!(0), false),
        ];

        let err = aggregate(&entries, &ReportingPeriod::for_fiscal_year(&fy)).unwrap_err();
        assert!(matches!(err, GstError::ProcessingError { .. }));
        assert!(err.to_string().contains("Purchase-2025-06-02"));

        // the same amounts under different heads do not interfere
        let entries = vec![
            entry(EntryKind::Purchase, "2025-06-01", Decimal::MAX, dec!(0), false),
            entry(EntryKind::Sale, "2025-06-02", Decimal::MAX, dec!(0), false),
        ];
        let input = aggregate(&entries, &ReportingPeriod::for_fiscal_year(&fy)).unwrap();
        assert_eq!(input.itc_igst, Decimal::MAX);
        assert_eq!(input.output_igst, Decimal::MAX);
    }

    #[test]
    fn test_period_construction() {
        let december = ReportingPeriod::month(2025, 12).unwrap();
        assert_eq!(december.to(), "2025-12-31".parse::<NaiveDate>().unwrap());
        assert_eq!(december.label(), "Dec 2025");

        assert!(ReportingPeriod::month(2025, 13).is_err());

        let from: NaiveDate = "2025-05-01".parse().unwrap();
        let to: NaiveDate = "2025-04-01".parse().unwrap();
        assert!(ReportingPeriod::new(from, to).is_err());
    }
}
