//! Sandbox payment gateway issuing unsigned mock intents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::order::{
    domain::{Order, PaymentIntent},
    ports::{PaymentGateway, PaymentGatewayResult},
};

/// Signature algorithm reported by sandbox intents.
pub const SANDBOX_SIGN_TYPE: &str = "RSA";

/// Placeholder signature carried by sandbox intents.
pub const SANDBOX_PAY_SIGN: &str = "MOCK_SIGN";

/// Payment gateway that fabricates intents without contacting a provider.
#[derive(Debug, Clone)]
pub struct SandboxPaymentGateway {
    app_id: String,
}

impl SandboxPaymentGateway {
    /// Creates a sandbox gateway reporting `app_id` in its intents.
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    /// Returns the merchant application id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

#[async_trait]
impl PaymentGateway for SandboxPaymentGateway {
    async fn issue_intent(
        &self,
        order: &Order,
        channel: &str,
        issued_at: DateTime<Utc>,
    ) -> PaymentGatewayResult<PaymentIntent> {
        debug!(order_id = %order.id(), channel, "issuing sandbox payment intent");
        Ok(PaymentIntent {
            app_id: self.app_id.clone(),
            time_stamp: issued_at.timestamp().to_string(),
            nonce_str: Uuid::new_v4().simple().to_string(),
            package: format!("prepay_id=mock-{}", Uuid::new_v4().simple()),
            sign_type: SANDBOX_SIGN_TYPE.to_owned(),
            pay_sign: SANDBOX_PAY_SIGN.to_owned(),
        })
    }
}
