//! Stripe adapter: the payment provider port over the Stripe REST API.

mod client;
mod types;

pub use client::{StripeClient, StripeConfig};
