//! Boutique API - E-commerce checkout backend.
//!
//! Processes payment-provider webhook events into durable orders, stock
//! adjustments, and customer notifications.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
