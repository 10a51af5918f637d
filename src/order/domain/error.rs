//! Error types for order domain validation and parsing.

use super::OrderId;
use thiserror::Error;

/// Errors returned while constructing or mutating orders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderDomainError {
    /// The order identifier is not a UUID.
    #[error("invalid order id: {0}")]
    InvalidOrderId(String),

    /// The order has no line items.
    #[error("order must contain at least one item")]
    EmptyItems,

    /// A line item has an empty type or a zero quantity.
    #[error("invalid order item at position {0}")]
    InvalidItem(usize),

    /// The amount is not positive.
    #[error("order amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// The idempotency key is blank.
    #[error("idempotency key must not be empty")]
    EmptyIdempotencyKey,

    /// The idempotency key is longer than the stored column allows.
    #[error("idempotency key has {0} characters, at most 128 are accepted")]
    IdempotencyKeyTooLong(usize),

    /// Payment was requested for an order that is already paid.
    #[error("order {0} is already paid")]
    AlreadyPaid(OrderId),

    /// A different idempotency key was already recorded.
    #[error("order {0} was already submitted with a different idempotency key")]
    IdempotencyKeyMismatch(OrderId),
}

/// Error returned while parsing order statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);
