//! Order creation, payment initiation and payment callbacks.

use crate::error::ErrorKind;
use crate::order::{
    domain::{
        IdempotencyKey, NewOrder, Order, OrderDomainError, OrderId, OrderStatus, Page,
        ParseOrderStatusError, PaymentIntent,
    },
    ports::{OrderRepository, OrderRepositoryError, PaymentGateway, PaymentGatewayError},
};
use crate::task::{
    domain::TaskId,
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Channel used when neither the caller nor the order names one.
pub const DEFAULT_CHANNEL: &str = "wechat";

/// Service-level errors for order operations.
#[derive(Debug, Error)]
pub enum OrderPaymentError {
    /// Order validation or a state rule failed.
    #[error(transparent)]
    Domain(#[from] OrderDomainError),

    /// The callback reported an unrecognized status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseOrderStatusError),

    /// The requested order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The payment gateway failed.
    #[error(transparent)]
    Gateway(#[from] PaymentGatewayError),

    /// Order repository operation failed.
    #[error(transparent)]
    Repository(#[from] OrderRepositoryError),

    /// Task lookup failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),
}

impl OrderPaymentError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(
                OrderDomainError::AlreadyPaid(_) | OrderDomainError::IdempotencyKeyMismatch(_),
            )
            | Self::Repository(OrderRepositoryError::DuplicateOrder(_)) => ErrorKind::Conflict,
            Self::Domain(_)
            | Self::InvalidStatus(_)
            | Self::Gateway(PaymentGatewayError::UnsupportedChannel(_)) => ErrorKind::BadRequest,
            Self::NotFound(_)
            | Self::TaskNotFound(_)
            | Self::Repository(OrderRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::Gateway(_) | Self::Repository(_) | Self::TaskRepository(_) => {
                ErrorKind::ServerError
            }
        }
    }
}

/// Result type for order payment operations.
pub type OrderPaymentResult<T> = Result<T, OrderPaymentError>;

/// Drives orders through payment.
pub struct OrderPaymentService<R, G, T, C>
where
    R: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    orders: Arc<R>,
    gateway: Arc<G>,
    tasks: Arc<T>,
    clock: Arc<C>,
}

impl<R, G, T, C> Clone for OrderPaymentService<R, G, T, C>
where
    R: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            orders: Arc::clone(&self.orders),
            gateway: Arc::clone(&self.gateway),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, G, T, C> OrderPaymentService<R, G, T, C>
where
    R: OrderRepository + ?Sized,
    G: PaymentGateway + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new order payment service.
    #[must_use]
    pub const fn new(orders: Arc<R>, gateway: Arc<G>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            orders,
            gateway,
            tasks,
            clock,
        }
    }

    /// Creates an order for an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`OrderPaymentError::TaskNotFound`] when the task is absent and
    /// [`OrderPaymentError::Domain`] when the order fails validation.
    #[tracing::instrument(skip(self, new_order), fields(task_id = %new_order.task_id))]
    pub async fn create(&self, new_order: NewOrder) -> OrderPaymentResult<Order> {
        let task_id = new_order.task_id;
        if self.tasks.find_by_id(task_id).await?.is_none() {
            return Err(OrderPaymentError::TaskNotFound(task_id));
        }

        let order = Order::create(new_order, &*self.clock)?;
        self.orders.store(&order).await?;
        info!(order_id = %order.id(), amount_minor = order.amount_minor(), "order created");
        Ok(order)
    }

    /// Issues or replays the payment intent for an order.
    ///
    /// A repeated call with the same key returns the cached intent without
    /// contacting the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`OrderPaymentError::NotFound`] for unknown orders,
    /// [`OrderPaymentError::Domain`] for blank keys, paid orders and key
    /// mismatches, and [`OrderPaymentError::Gateway`] when issuance fails.
    #[tracing::instrument(skip(self, idempotency_key), fields(order_id = %order_id))]
    pub async fn pay(
        &self,
        order_id: OrderId,
        channel: &str,
        idempotency_key: &str,
    ) -> OrderPaymentResult<PaymentIntent> {
        let mut order = self.load(order_id).await?;
        let key = IdempotencyKey::new(idempotency_key)?;

        if let Some(cached) = order.cached_intent_for(&key)? {
            debug!("replaying cached payment intent");
            return Ok(cached.clone());
        }

        let resolved_channel = resolve_channel(channel, order.channel());
        let intent = self
            .gateway
            .issue_intent(&order, &resolved_channel, self.clock.utc())
            .await?;
        order.begin_payment(key, resolved_channel, intent.clone(), &*self.clock)?;
        self.orders.update(&order).await?;
        info!(channel = order.channel(), "payment intent issued");
        Ok(intent)
    }

    /// Applies a status reported by the payment provider.
    ///
    /// # Errors
    ///
    /// Returns [`OrderPaymentError::InvalidStatus`] for unrecognized tokens,
    /// without touching the order, and [`OrderPaymentError::NotFound`] for
    /// unknown orders.
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    pub async fn callback(&self, order_id: OrderId, status: &str) -> OrderPaymentResult<Order> {
        let reported = OrderStatus::from_callback(status)?;
        let mut order = self.load(order_id).await?;

        let previous = order.apply_callback(reported, &*self.clock);
        if previous == OrderStatus::Paid && reported != OrderStatus::Paid {
            warn!(
                from = previous.as_str(),
                to = reported.as_str(),
                "callback moved a paid order"
            );
        }
        self.orders.update(&order).await?;
        info!(
            from = previous.as_str(),
            to = reported.as_str(),
            "payment callback applied"
        );
        Ok(order)
    }

    /// Finds an order by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OrderPaymentError::NotFound`] when the order is absent.
    pub async fn find(&self, order_id: OrderId) -> OrderPaymentResult<Order> {
        self.load(order_id).await
    }

    /// Lists orders newest first.
    ///
    /// Out-of-range page numbers and sizes are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`OrderPaymentError::Repository`] when listing fails.
    pub async fn list(&self, page: u32, page_size: u32) -> OrderPaymentResult<(Vec<Order>, u64)> {
        Ok(self.orders.list(Page::new(page, page_size)).await?)
    }

    async fn load(&self, order_id: OrderId) -> OrderPaymentResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderPaymentError::NotFound(order_id))
    }
}

fn resolve_channel(requested: &str, recorded: &str) -> String {
    [requested, recorded]
        .into_iter()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(DEFAULT_CHANNEL)
        .to_owned()
}
