//! # Totals
//!
//! Subtotal, discount, tax and balance for an invoice. The layout engine
//! reads these numbers straight into the summary block, so the calculation
//! has to be total: a NaN quantity or a negative price typed into the form
//! must come out as zero, never as a NaN or negative total.

use crate::model::{Adjustments, Invoice, LineItem};
use serde::Serialize;

/// The derived money figures of one invoice. Never persisted; recomputed on
/// every export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub discount: f64,
    pub taxable_amount: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub amount_paid: f64,
    pub balance_due: f64,
}

impl Totals {
    pub fn for_invoice(invoice: &Invoice) -> Self {
        calc_totals(&invoice.items, &invoice.adjustments)
    }
}

/// Non-finite or negative values read as zero.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Compute the totals for a list of line items and their adjustments.
pub fn calc_totals(items: &[LineItem], adjustments: &Adjustments) -> Totals {
    let subtotal: f64 = items.iter().map(LineItem::line_total).sum();

    let discount = clamp_non_negative(adjustments.discount_amount);
    let taxable_amount = (subtotal - discount).max(0.0);

    let rate = if adjustments.tax_enabled {
        clamp_non_negative(adjustments.tax_rate_percent)
    } else {
        0.0
    };
    let tax_amount = taxable_amount * (rate / 100.0);

    let total = taxable_amount + tax_amount;
    let amount_paid = clamp_non_negative(adjustments.amount_paid);
    let balance_due = (total - amount_paid).max(0.0);

    Totals {
        subtotal,
        discount,
        taxable_amount,
        tax_amount,
        total,
        amount_paid,
        balance_due,
    }
}
