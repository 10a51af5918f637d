//! Port contracts for order persistence and payment issuance.

pub mod payment;
pub mod repository;

pub use payment::{PaymentGateway, PaymentGatewayError, PaymentGatewayResult};
pub use repository::{OrderRepository, OrderRepositoryError, OrderRepositoryResult};

#[cfg(test)]
pub use payment::MockPaymentGateway;
