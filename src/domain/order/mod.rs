//! Order domain: the aggregate, identity generation, and the durable counter.

mod aggregate;
mod counter;
mod identity;

pub use aggregate::{
    Address, CustomerInfo, Discount, Money, Order, OrderItem, OrderStatus, OrderTotals,
};
pub use counter::{CounterError, OrderCounter};
pub use identity::{
    generate_order_id, generate_order_number, OrderNumberError, MAX_ORDER_COUNTER,
};
