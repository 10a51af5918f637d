//! Domain model for orders and payment intents.

mod error;
mod ids;
mod order;
mod page;

pub use error::{OrderDomainError, ParseOrderStatusError};
pub use ids::{IdempotencyKey, MAX_IDEMPOTENCY_KEY_CHARS, OrderId};
pub use order::{NewOrder, Order, OrderItem, OrderStatus, PaymentIntent, PersistedOrderData};
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page};
