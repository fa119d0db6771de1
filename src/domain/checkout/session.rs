//! Typed view of provider checkout data.
//!
//! Product and price metadata arrive from the provider as untyped string
//! maps. Everything here is the parse-with-defaults step that turns those
//! maps into typed values before any of it reaches the pricing engine or
//! the order aggregate.

use std::collections::HashMap;

use crate::domain::order::{Discount, Money, OrderItem};
use crate::domain::pricing::{self, TaxRate};
use crate::ports::SessionLineItem;

/// Sentinel used when no size selection is known for an item.
pub const ONE_SIZE: &str = "one size";

/// Typed product metadata, parsed with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMetadata {
    /// Catalog product id. Absent when the provider product was created
    /// without one; such items cannot become order items.
    pub product_id: Option<String>,

    /// Brand name, defaulting to "Unknown".
    pub brand: String,

    /// Discount percentage, present only when positive and parseable.
    pub discount_rate: Option<f64>,
}

impl ProductMetadata {
    /// Parse a provider metadata map.
    pub fn from_map(metadata: &HashMap<String, String>) -> Self {
        let product_id = metadata
            .get("productId")
            .filter(|id| !id.is_empty())
            .cloned();

        let brand = metadata
            .get("brand")
            .filter(|b| !b.is_empty())
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        let discount_rate = metadata
            .get("discountRate")
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|rate| *rate > 0.0);

        Self {
            product_id,
            brand,
            discount_rate,
        }
    }
}

/// Tax rate from a price metadata map, defaulting to the zero-tax
/// multiplier when the key is absent.
pub fn tax_rate_from_metadata(metadata: &HashMap<String, String>) -> TaxRate {
    metadata
        .get("taxRate")
        .filter(|raw| !raw.is_empty())
        .map(TaxRate::new)
        .unwrap_or_default()
}

/// Result of turning one provider line item into an order item.
#[derive(Debug, Clone)]
pub enum ItemResolution {
    /// The line item resolved to a complete order item.
    Resolved(OrderItem),

    /// The line item carries no price or expanded product and is skipped.
    MissingPriceOrProduct { line_item_id: String },

    /// The provider product has no catalog product id in its metadata and
    /// is skipped.
    MissingProductId { provider_product_id: String },
}

/// Build an order item from a provider line item.
///
/// `sizes` is the per-session size record from the cart side-channel; when
/// it has no entry for the product, the [`ONE_SIZE`] sentinel applies.
/// Unusable line items are reported, not failed: the caller decides whether
/// an order can still be formed from what survived.
pub fn resolve_line_item(
    line: &SessionLineItem,
    sizes: Option<&HashMap<String, String>>,
) -> ItemResolution {
    let (price, product) = match line.price.as_ref().and_then(|p| {
        p.product.as_ref().map(|product| (p, product))
    }) {
        Some(pair) => pair,
        None => {
            return ItemResolution::MissingPriceOrProduct {
                line_item_id: line.id.clone(),
            }
        }
    };

    let metadata = ProductMetadata::from_map(&product.metadata);
    let product_id = match metadata.product_id {
        Some(id) => id,
        None => {
            return ItemResolution::MissingProductId {
                provider_product_id: product.id.clone(),
            }
        }
    };

    let tax_rate = tax_rate_from_metadata(&price.metadata);

    // Unit amounts arrive in minor units.
    let unit_price = price.unit_amount.unwrap_or(0) as f64 / 100.0;
    let currency = price.currency.to_uppercase();
    let quantity = line.quantity.unwrap_or(1);

    let size = sizes
        .and_then(|map| map.get(&product_id))
        .cloned()
        .unwrap_or_else(|| ONE_SIZE.to_string());

    let totals = pricing::item_totals(unit_price, quantity, metadata.discount_rate, &tax_rate);

    ItemResolution::Resolved(OrderItem {
        product_id,
        title: product.name.clone(),
        brand: metadata.brand,
        price: Money {
            amount: unit_price,
            currency,
        },
        discount: metadata.discount_rate.map(|rate| Discount { rate }),
        size: Some(size),
        quantity,
        image: product.images.first().cloned().unwrap_or_default(),
        tax_rate: tax_rate.as_str().to_string(),
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
    })
}
