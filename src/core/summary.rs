//! Net GST position for a period.
//!
//! Tax paid under reverse charge shows up twice: once as RCM liability (reported separately in
//! GSTR-3B) and once as ITC available in the same period.
//!
//! The net payable is a coarse indicator. Each head is netted on its own and the three nets are
//! added up; the statutory cross-utilisation order (IGST credit against IGST, then CGST, then
//! SGST; CGST credit never against SGST; SGST credit never against CGST) is NOT applied. A
//! filing-grade computation would need its own, separately named function.

use crate::domain::model::{GstComponent, GstSummaryInput, GstSummaryResult};
use crate::utils::error::{GstError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// # Panics
///
/// When a sum or difference leaves the `Decimal` range (about 7.9e28). Inputs built from
/// untrusted data should go through [`try_summarize`].
pub fn summarize(input: &GstSummaryInput) -> GstSummaryResult {
    let output_liability = GstComponent::new(input.output_igst, input.output_cgst, input.output_sgst);

    let itc_available = GstComponent::new(
        input.itc_igst + input.rcm_igst,
        input.itc_cgst + input.rcm_cgst,
        input.itc_sgst + input.rcm_sgst,
    );

    let rcm_liability = GstComponent::new(input.rcm_igst, input.rcm_cgst, input.rcm_sgst);

    let net_payable = calculate_net_payable(&output_liability, &itc_available);

    let accumulated_itc = if net_payable.total() < Decimal::ZERO {
        net_payable.total().abs()
    } else {
        Decimal::ZERO
    };

    tracing::trace!(
        "GST summary: output {} itc {} rcm {} net {}",
        output_liability.total(),
        itc_available.total(),
        rcm_liability.total(),
        net_payable.total()
    );

    GstSummaryResult {
        output_liability,
        itc_available,
        rcm_liability,
        net_payable,
        accumulated_itc,
    }
}

/// [`summarize`] with checked arithmetic; overflow is a `ProcessingError`.
pub fn try_summarize(input: &GstSummaryInput) -> Result<GstSummaryResult> {
    let overflow = |what: &str| GstError::ProcessingError {
        message: format!("{} is outside the decimal range", what),
    };
    let add = |a: Decimal, b: Decimal, what: &str| a.checked_add(b).ok_or_else(|| overflow(what));

    let output_liability =
        GstComponent::checked_new(input.output_igst, input.output_cgst, input.output_sgst)
            .ok_or_else(|| overflow("output liability"))?;

    let itc_available = GstComponent::checked_new(
        add(input.itc_igst, input.rcm_igst, "IGST credit")?,
        add(input.itc_cgst, input.rcm_cgst, "CGST credit")?,
        add(input.itc_sgst, input.rcm_sgst, "SGST credit")?,
    )
    .ok_or_else(|| overflow("credit available"))?;

    let rcm_liability = GstComponent::checked_new(input.rcm_igst, input.rcm_cgst, input.rcm_sgst)
        .ok_or_else(|| overflow("reverse charge liability"))?;

    let sub = |a: Decimal, b: Decimal, what: &str| a.checked_sub(b).ok_or_else(|| overflow(what));
    let net_payable = GstComponent::checked_new(
        sub(output_liability.igst(), itc_available.igst(), "IGST net")?,
        sub(output_liability.cgst(), itc_available.cgst(), "CGST net")?,
        sub(output_liability.sgst(), itc_available.sgst(), "SGST net")?,
    )
    .ok_or_else(|| overflow("net payable"))?;

    let accumulated_itc = if net_payable.total() < Decimal::ZERO {
        net_payable.total().abs()
    } else {
        Decimal::ZERO
    };

    Ok(GstSummaryResult {
        output_liability,
        itc_available,
        rcm_liability,
        net_payable,
        accumulated_itc,
    })
}

/// Per-head `output - itc`. Negative heads are kept as-is.
pub fn calculate_net_payable(output: &GstComponent, itc: &GstComponent) -> GstComponent {
    GstComponent::new(
        output.igst() - itc.igst(),
        output.cgst() - itc.cgst(),
        output.sgst() - itc.sgst(),
    )
}

/// Nearest whole rupee, halves away from zero. Display only.
pub fn round_to_rupee(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if amount.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// Rupee-rounded heads for display, `[igst, cgst, sgst, total]`.
///
/// The total is rounded from the exact total, not summed from the rounded heads.
pub fn rounded(component: &GstComponent) -> [i64; 4] {
    [
        round_to_rupee(component.igst()),
        round_to_rupee(component.cgst()),
        round_to_rupee(component.sgst()),
        round_to_rupee(component.total()),
    ]
}
