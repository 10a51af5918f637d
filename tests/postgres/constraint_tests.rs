//! Schema constraints surfaced through the `PostgreSQL` repositories.

use crate::postgres::helpers::{postgres_cluster, repositories, temporary_database, test_runtime};
use eyre::{Result, bail};
use permit::download::domain::DownloadToken;
use permit::download::ports::DownloadTokenRepositoryError;
use permit::order::domain::{NewOrder, Order, OrderItem};
use permit::order::ports::OrderRepositoryError;
use permit::task::domain::TaskId;
use permit::testing::ManualClock;
use permit::user::domain::UserId;
use rstest::rstest;

#[rstest]
fn orders_require_a_stored_task() -> Result<()> {
    let Some(cluster) = postgres_cluster() else {
        return Ok(());
    };
    let guard = temporary_database(cluster, "test_order_fk")?;
    let repos = repositories(&guard)?;
    let clock = ManualClock::at_epoch();
    let order = Order::create(
        NewOrder {
            task_id: TaskId::new(),
            items: vec![OrderItem::new("digital", 1)],
            city: String::new(),
            remark: String::new(),
            amount_minor: 990,
            channel: String::new(),
        },
        &clock,
    )?;

    let result = test_runtime()?.block_on(repos.orders.store(&order));
    drop(repos);

    match result {
        Err(OrderRepositoryError::Persistence(_)) => Ok(()),
        other => bail!("expected a persistence error, got {other:?}"),
    }
}

#[rstest]
fn tokens_require_a_stored_task() -> Result<()> {
    let Some(cluster) = postgres_cluster() else {
        return Ok(());
    };
    let guard = temporary_database(cluster, "test_token_fk")?;
    let repos = repositories(&guard)?;
    let clock = ManualClock::at_epoch();
    let token = DownloadToken::issue(TaskId::new(), UserId::new("user-1")?, 60, &clock);

    let result = test_runtime()?.block_on(repos.tokens.store(&token));
    drop(repos);

    match result {
        Err(DownloadTokenRepositoryError::Persistence(_)) => Ok(()),
        other => bail!("expected a persistence error, got {other:?}"),
    }
}
