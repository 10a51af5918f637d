//! In-memory repository for orders.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, RwLock};

use crate::order::{
    domain::{Order, OrderId, Page},
    ports::{OrderRepository, OrderRepositoryError, OrderRepositoryResult},
};

/// Thread-safe in-memory order repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: &impl Display) -> OrderRepositoryError {
    OrderRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn store(&self, order: &Order) -> OrderRepositoryResult<()> {
        let mut orders = self.state.write().map_err(|err| lock_error(&err))?;
        if orders.contains_key(&order.id()) {
            return Err(OrderRepositoryError::DuplicateOrder(order.id()));
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> OrderRepositoryResult<()> {
        let mut orders = self.state.write().map_err(|err| lock_error(&err))?;
        let Some(existing) = orders.get_mut(&order.id()) else {
            return Err(OrderRepositoryError::NotFound(order.id()));
        };
        *existing = order.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> OrderRepositoryResult<Option<Order>> {
        let orders = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(orders.get(&id).cloned())
    }

    async fn list(&self, page: Page) -> OrderRepositoryResult<(Vec<Order>, u64)> {
        let orders = self.state.read().map_err(|err| lock_error(&err))?;
        let mut sorted: Vec<&Order> = orders.values().collect();
        sorted.sort_by_key(|order| (Reverse(order.created_at()), order.id()));

        let total = u64::try_from(sorted.len()).map_err(OrderRepositoryError::persistence)?;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.size()).map_err(OrderRepositoryError::persistence)?;
        let items = sorted.into_iter().skip(skip).take(take).cloned().collect();
        Ok((items, total))
    }
}
