//! Payment gateway port for issuing client payment intents.

use crate::order::domain::{Order, PaymentIntent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for payment gateway operations.
pub type PaymentGatewayResult<T> = Result<T, PaymentGatewayError>;

/// Issues payment intents for orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issues a payment intent for `order` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentGatewayError`] when the gateway refuses or cannot be
    /// reached.
    async fn issue_intent(
        &self,
        order: &Order,
        channel: &str,
        issued_at: DateTime<Utc>,
    ) -> PaymentGatewayResult<PaymentIntent>;
}

/// Errors returned by payment gateways.
#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    /// The channel is not supported by this gateway.
    #[error("unsupported payment channel: {0}")]
    UnsupportedChannel(String),

    /// The gateway declined to issue an intent.
    #[error("payment gateway rejected the order: {0}")]
    Rejected(String),

    /// Transport or protocol failure.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl PaymentGatewayError {
    /// Wraps a transport error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
