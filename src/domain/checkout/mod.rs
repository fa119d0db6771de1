//! Checkout domain: typed session data and the pipeline error taxonomy.

mod errors;
mod session;

pub use errors::{CheckoutError, StepCaveat};
pub use session::{
    resolve_line_item, tax_rate_from_metadata, ItemResolution, ProductMetadata, ONE_SIZE,
};
