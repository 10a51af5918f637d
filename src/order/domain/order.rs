//! Order aggregate root, line items and payment intents.

use super::{IdempotencyKey, OrderDomainError, OrderId, ParseOrderStatusError};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order recorded, no payment attempted.
    Created,
    /// A payment intent was issued.
    Pending,
    /// Payment confirmed.
    Paid,
    /// Order canceled.
    Canceled,
    /// Payment refunded.
    Refunded,
}

impl OrderStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
            Self::Refunded => "refunded",
        }
    }

    /// Parses a status reported by a payment callback.
    ///
    /// Callbacks may report every status except `created`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseOrderStatusError`] for unknown tokens and `created`.
    pub fn from_callback(token: &str) -> Result<Self, ParseOrderStatusError> {
        match Self::try_from(token)? {
            Self::Created => Err(ParseOrderStatusError(token.to_owned())),
            status => Ok(status),
        }
    }
}

impl TryFrom<&str> for OrderStatus {
    type Error = ParseOrderStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "canceled" => Ok(Self::Canceled),
            "refunded" => Ok(Self::Refunded),
            _ => Err(ParseOrderStatusError(value.to_owned())),
        }
    }
}

/// One purchased item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Item kind, for example `print` or `digital`.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Number of units.
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl OrderItem {
    /// Creates a line item.
    #[must_use]
    pub fn new(item_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_type: item_type.into(),
            quantity,
        }
    }

    fn is_valid(&self) -> bool {
        !self.item_type.trim().is_empty() && self.quantity > 0
    }
}

/// Client-side parameters for completing a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Merchant application id.
    pub app_id: String,
    /// Issue time as Unix seconds.
    pub time_stamp: String,
    /// Random nonce.
    pub nonce_str: String,
    /// Prepay package, `prepay_id=<id>`.
    pub package: String,
    /// Signature algorithm.
    pub sign_type: String,
    /// Signature over the other fields.
    pub pay_sign: String,
}

/// Caller-supplied fields for a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Task the order pays for.
    pub task_id: TaskId,
    /// Purchased items.
    pub items: Vec<OrderItem>,
    /// Delivery city.
    pub city: String,
    /// Free-form remark.
    pub remark: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// Preferred payment channel.
    pub channel: String,
}

/// Order aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    task_id: TaskId,
    items: Vec<OrderItem>,
    city: String,
    remark: String,
    amount_minor: i64,
    channel: String,
    status: OrderStatus,
    #[serde(skip)]
    payment_key: Option<IdempotencyKey>,
    #[serde(skip)]
    payment_intent: Option<PaymentIntent>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOrderData {
    /// Persisted order identifier.
    pub id: OrderId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted line items.
    pub items: Vec<OrderItem>,
    /// Persisted city.
    pub city: String,
    /// Persisted remark.
    pub remark: String,
    /// Persisted amount in minor units.
    pub amount_minor: i64,
    /// Persisted payment channel.
    pub channel: String,
    /// Persisted status.
    pub status: OrderStatus,
    /// Persisted idempotency key.
    pub payment_key: Option<IdempotencyKey>,
    /// Persisted cached payment intent.
    pub payment_intent: Option<PaymentIntent>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates an order in the `created` status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDomainError::InvalidAmount`] for non-positive amounts,
    /// [`OrderDomainError::EmptyItems`] without items and
    /// [`OrderDomainError::InvalidItem`] for an item with an empty type or a
    /// zero quantity.
    pub fn create(new_order: NewOrder, clock: &impl Clock) -> Result<Self, OrderDomainError> {
        if new_order.amount_minor <= 0 {
            return Err(OrderDomainError::InvalidAmount(new_order.amount_minor));
        }
        if new_order.items.is_empty() {
            return Err(OrderDomainError::EmptyItems);
        }
        if let Some(position) = new_order.items.iter().position(|item| !item.is_valid()) {
            return Err(OrderDomainError::InvalidItem(position));
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: OrderId::new(),
            task_id: new_order.task_id,
            items: new_order.items,
            city: new_order.city.trim().to_owned(),
            remark: new_order.remark.trim().to_owned(),
            amount_minor: new_order.amount_minor,
            channel: new_order.channel.trim().to_owned(),
            status: OrderStatus::Created,
            payment_key: None,
            payment_intent: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an order from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedOrderData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            items: data.items,
            city: data.city,
            remark: data.remark,
            amount_minor: data.amount_minor,
            channel: data.channel,
            status: data.status,
            payment_key: data.payment_key,
            payment_intent: data.payment_intent,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the order identifier.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the referenced task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the line items.
    #[must_use]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the delivery city.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns the remark.
    #[must_use]
    pub fn remark(&self) -> &str {
        &self.remark
    }

    /// Returns the amount in minor currency units.
    #[must_use]
    pub const fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    /// Returns the payment channel.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns the payment status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the recorded idempotency key.
    #[must_use]
    pub const fn payment_key(&self) -> Option<&IdempotencyKey> {
        self.payment_key.as_ref()
    }

    /// Returns the cached payment intent.
    #[must_use]
    pub const fn payment_intent(&self) -> Option<&PaymentIntent> {
        self.payment_intent.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks whether a payment attempt with `key` may proceed.
    ///
    /// Returns the cached intent when `key` already produced one.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDomainError::AlreadyPaid`] for paid orders and
    /// [`OrderDomainError::IdempotencyKeyMismatch`] when another key was
    /// recorded.
    pub fn cached_intent_for(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<&PaymentIntent>, OrderDomainError> {
        if self.status == OrderStatus::Paid {
            return Err(OrderDomainError::AlreadyPaid(self.id));
        }
        match &self.payment_key {
            Some(recorded) if recorded != key => {
                Err(OrderDomainError::IdempotencyKeyMismatch(self.id))
            }
            Some(_) => Ok(self.payment_intent.as_ref()),
            None => Ok(None),
        }
    }

    /// Records a freshly issued payment intent and moves to `pending`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::cached_intent_for`].
    pub fn begin_payment(
        &mut self,
        key: IdempotencyKey,
        channel: impl Into<String>,
        intent: PaymentIntent,
        clock: &impl Clock,
    ) -> Result<(), OrderDomainError> {
        self.cached_intent_for(&key)?;
        self.status = OrderStatus::Pending;
        self.channel = channel.into();
        self.payment_key = Some(key);
        self.payment_intent = Some(intent);
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Applies a status reported by the payment callback.
    ///
    /// Returns the previous status.
    pub fn apply_callback(&mut self, status: OrderStatus, clock: &impl Clock) -> OrderStatus {
        let previous = self.status;
        self.status = status;
        self.updated_at = clock.utc();
        previous
    }
}
