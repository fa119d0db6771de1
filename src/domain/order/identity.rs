//! Order identity generation.
//!
//! Two identifiers per order:
//!
//! - an opaque, globally unique document id (`order_` + UUID v4), and
//! - a human-facing order number derived from the durable counter,
//!   `ORD-{counter:06}-{SUFFIX}` where SUFFIX is 8 uppercase hex characters.
//!
//! The zero-padded counter makes lexicographic order of order numbers equal
//! counter order, which back-office tooling relies on for sorting. The random
//! suffix exists so a customer reading a number over the phone can be matched
//! unambiguously even if a counter value were ever reused.

use thiserror::Error;
use uuid::Uuid;

/// Highest counter value representable in the 6-digit field.
pub const MAX_ORDER_COUNTER: u64 = 999_999;

/// Violations of the order-number counter constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    /// Counter must be a positive integer; zero is not a valid allocation.
    #[error("order counter must be positive, got 0")]
    CounterNotPositive,

    /// Counter exceeds the fixed-width field.
    #[error("order counter {counter} exceeds maximum 999999")]
    CounterOverflow { counter: u64 },
}

/// Generate an opaque, globally unique order id.
pub fn generate_order_id() -> String {
    format!("order_{}", Uuid::new_v4().simple())
}

/// Derive the human-facing order number for an allocated counter value.
///
/// # Errors
///
/// Returns [`OrderNumberError`] when the counter is zero or greater than
/// [`MAX_ORDER_COUNTER`]. Non-integer counters are unrepresentable here; the
/// durable counter document is validated when decoded.
pub fn generate_order_number(counter: u64) -> Result<String, OrderNumberError> {
    if counter == 0 {
        return Err(OrderNumberError::CounterNotPositive);
    }
    if counter > MAX_ORDER_COUNTER {
        return Err(OrderNumberError::CounterOverflow { counter });
    }

    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();

    Ok(format!("ORD-{:06}-{}", counter, suffix))
}
