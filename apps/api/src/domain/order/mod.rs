// Order domain module
// Order aggregate, payment snapshot and lifecycle statuses

#![allow(clippy::module_inception)]

pub mod order;
pub mod value_objects;

pub use order::{
    Order, OrderDraft, OrderItem, OrderLine, Payment, ShippingAddress, StatusChange,
    RETURN_WINDOW_DAYS,
};
pub use value_objects::{order_number, OrderStatus, PaymentMethod, PaymentStatus};
