//! Pricing engine: pure monetary arithmetic for items and orders.
//!
//! All rounding is to 2 decimal places, half away from zero (`f64::round`
//! semantics). Monetary values are `f64`; any NaN produced by degenerate
//! inputs is coerced to 0 rather than propagated.
//!
//! Summation across items is performed in slice order. For pathological
//! inputs, floating-point addition is not associative at the bit level, so
//! bit-identical results under reordering are not guaranteed; within the
//! half-cent rounding applied here the totals are order-independent for all
//! realistic catalogs. This is a known limitation, not a defect.

use crate::domain::order::{OrderItem, OrderTotals};

/// Tax rate carried as a *multiplier string*: `"1.20"` means 20% tax.
///
/// This convention comes from the provider's price metadata and is easy to
/// misread as a percentage; the raw string is preserved verbatim on the
/// order item and only interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRate {
    raw: String,
}

impl TaxRate {
    /// Multiplier meaning zero tax.
    pub const NONE: &'static str = "1.0";

    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The verbatim multiplier string, as stored on the order item.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parse the multiplier, degrading gracefully.
    ///
    /// An unparseable or negative value means the tax metadata is broken,
    /// which must never reject the item: the multiplier falls back to 1.0
    /// (zero tax).
    pub fn multiplier(&self) -> f64 {
        match self.raw.trim().parse::<f64>() {
            Ok(value) if value >= 0.0 => value,
            _ => 1.0,
        }
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::new(Self::NONE)
    }
}

/// Computed monetary figures for a single item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Compute subtotal, tax, and total for one item.
///
/// `discount_rate` is a percentage in 0..=100; `None` means no discount.
/// The three outputs are each rounded independently to 2 decimals.
pub fn item_totals(
    base_price: f64,
    quantity: u32,
    discount_rate: Option<f64>,
    tax_rate: &TaxRate,
) -> ItemTotals {
    let discount_rate = discount_rate.unwrap_or(0.0);
    let multiplier = tax_rate.multiplier();

    let discounted = base_price * (1.0 - discount_rate / 100.0);
    let subtotal = discounted * f64::from(quantity);
    let tax = subtotal * (multiplier - 1.0);
    let total = subtotal + tax;

    ItemTotals {
        subtotal: round_currency(subtotal),
        tax: round_currency(tax),
        total: round_currency(total),
    }
}

/// Sum item-level figures into order totals.
///
/// Each field is summed across items and rounded once at the end. The
/// currency is taken from the caller (single-currency-per-order).
pub fn order_totals(items: &[OrderItem], currency: impl Into<String>) -> OrderTotals {
    let subtotal: f64 = items.iter().map(|i| i.subtotal).sum();
    let tax: f64 = items.iter().map(|i| i.tax).sum();
    let total: f64 = items.iter().map(|i| i.total).sum();

    OrderTotals {
        subtotal: round_currency(subtotal),
        tax: round_currency(tax),
        total: round_currency(total),
        currency: currency.into(),
    }
}

/// Round to 2 decimals, half away from zero; NaN coerces to 0.
fn round_currency(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}
