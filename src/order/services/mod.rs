//! Application services for orders and payments.

mod payment;

pub use payment::{DEFAULT_CHANNEL, OrderPaymentError, OrderPaymentResult, OrderPaymentService};
