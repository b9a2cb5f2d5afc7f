//! Money calculation using rust_decimal for precision
//!
//! All arithmetic runs at full `Decimal` precision; values are rounded to
//! 2 decimal places (midpoint away from zero) only at the output boundary.
//! The stored total is the sum of the already-rounded components, so
//! `total == subtotal + tax + service_charge` holds exactly, not just
//! within tolerance.

use rust_decimal::prelude::*;
use shared::order::OrderItem;

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price per item
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Round a monetary value for storage or display
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Monetary fields derived from an item set and the order's captured rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub total: Decimal,
}

/// Recompute all monetary fields from the item lines
///
/// Rates come from the order record, captured once at creation; they are
/// never re-derived from the current totals (repeated edits would compound
/// rounding error otherwise).
pub fn compute_totals(
    items: &[OrderItem],
    tax_rate: Decimal,
    service_charge_rate: Decimal,
) -> Totals {
    let raw_subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
    let subtotal = round_money(raw_subtotal);
    let tax = round_money(raw_subtotal * tax_rate);
    let service_charge = round_money(raw_subtotal * service_charge_rate);
    Totals {
        subtotal,
        tax,
        service_charge,
        total: subtotal + tax + service_charge,
    }
}
