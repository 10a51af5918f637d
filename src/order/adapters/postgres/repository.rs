//! `PostgreSQL` repository implementation for orders.

use super::{
    models::{NewOrderRow, OrderRow},
    schema::orders,
};
use crate::order::{
    domain::{IdempotencyKey, Order, OrderId, OrderStatus, Page, PersistedOrderData},
    ports::{OrderRepository, OrderRepositoryError, OrderRepositoryResult},
};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by order adapters.
pub type OrderPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed order repository.
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    pool: OrderPgPool,
}

impl PostgresOrderRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: OrderPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> OrderRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> OrderRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(OrderRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(OrderRepositoryError::persistence)?
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn store(&self, order: &Order) -> OrderRepositoryResult<()> {
        let order_id = order.id();
        let new_row = to_new_row(order)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(orders::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        OrderRepositoryError::DuplicateOrder(order_id)
                    }
                    _ => OrderRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, order: &Order) -> OrderRepositoryResult<()> {
        let order_id = order.id();
        let row = to_new_row(order)?;

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(orders::table.filter(orders::id.eq(order_id.into_inner())))
                    .set(&row)
                    .execute(connection)
                    .map_err(OrderRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(OrderRepositoryError::NotFound(order_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: OrderId) -> OrderRepositoryResult<Option<Order>> {
        self.run_blocking(move |connection| {
            let row = orders::table
                .filter(orders::id.eq(id.into_inner()))
                .select(OrderRow::as_select())
                .first::<OrderRow>(connection)
                .optional()
                .map_err(OrderRepositoryError::persistence)?;
            row.map(row_to_order).transpose()
        })
        .await
    }

    async fn list(&self, page: Page) -> OrderRepositoryResult<(Vec<Order>, u64)> {
        let offset = i64::try_from(page.offset()).map_err(OrderRepositoryError::persistence)?;
        let limit = i64::from(page.size());

        self.run_blocking(move |connection| {
            let total: i64 = orders::table
                .count()
                .get_result(connection)
                .map_err(OrderRepositoryError::persistence)?;
            let rows = orders::table
                .order((orders::created_at.desc(), orders::id.asc()))
                .offset(offset)
                .limit(limit)
                .select(OrderRow::as_select())
                .load::<OrderRow>(connection)
                .map_err(OrderRepositoryError::persistence)?;
            let items = rows
                .into_iter()
                .map(row_to_order)
                .collect::<OrderRepositoryResult<Vec<_>>>()?;
            let count = u64::try_from(total).map_err(OrderRepositoryError::persistence)?;
            Ok((items, count))
        })
        .await
    }
}

fn to_new_row(order: &Order) -> OrderRepositoryResult<NewOrderRow> {
    Ok(NewOrderRow {
        id: order.id().into_inner(),
        task_id: order.task_id().into_inner(),
        items: serde_json::to_value(order.items()).map_err(OrderRepositoryError::persistence)?,
        city: order.city().to_owned(),
        remark: order.remark().to_owned(),
        amount_minor: order.amount_minor(),
        channel: order.channel().to_owned(),
        status: order.status().as_str().to_owned(),
        payment_key: order.payment_key().map(|key| key.as_str().to_owned()),
        payment_intent: order
            .payment_intent()
            .map(serde_json::to_value)
            .transpose()
            .map_err(OrderRepositoryError::persistence)?,
        created_at: order.created_at(),
        updated_at: order.updated_at(),
    })
}

fn row_to_order(row: OrderRow) -> OrderRepositoryResult<Order> {
    let OrderRow {
        id,
        task_id,
        items,
        city,
        remark,
        amount_minor,
        channel,
        status: persisted_status,
        payment_key,
        payment_intent,
        created_at,
        updated_at,
    } = row;

    let status = OrderStatus::try_from(persisted_status.as_str())
        .map_err(OrderRepositoryError::persistence)?;
    let key = payment_key
        .as_deref()
        .map(IdempotencyKey::new)
        .transpose()
        .map_err(OrderRepositoryError::persistence)?;

    Ok(Order::from_persisted(PersistedOrderData {
        id: OrderId::from_uuid(id),
        task_id: TaskId::from_uuid(task_id),
        items: serde_json::from_value(items).map_err(OrderRepositoryError::persistence)?,
        city,
        remark,
        amount_minor,
        channel,
        status,
        payment_key: key,
        payment_intent: payment_intent
            .map(serde_json::from_value)
            .transpose()
            .map_err(OrderRepositoryError::persistence)?,
        created_at,
        updated_at,
    }))
}
