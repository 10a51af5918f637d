//! Repository behaviour shared by every storage backend.
//!
//! Each check takes freshly created [`Repositories`] and fails with a
//! description of the first divergence. Backend test modules call them so
//! the in-memory and `PostgreSQL` adapters are held to the same contract.

use std::sync::Arc;

use chrono::Duration;
use eyre::{Result, bail, ensure};
use permit::app::Repositories;
use permit::download::domain::{DownloadToken, Redemption, TokenStatus, TokenValue};
use permit::download::ports::DownloadTokenRepositoryError;
use permit::error::ErrorKind;
use permit::order::adapters::payment::SandboxPaymentGateway;
use permit::order::domain::{
    IdempotencyKey, MAX_IDEMPOTENCY_KEY_CHARS, NewOrder, Order, OrderId, OrderItem, OrderStatus,
    Page, PaymentIntent,
};
use permit::order::ports::OrderRepositoryError;
use permit::order::services::OrderPaymentService;
use permit::task::domain::{ColorName, NewTask, Task, TaskId, TaskSpec};
use permit::task::ports::TaskRepositoryError;
use permit::testing::{ManualClock, finished_task};
use permit::user::domain::{MAX_OPEN_ID_CHARS, MAX_USER_ID_CHARS, OpenId, User, UserId};
use permit::user::ports::UserRepositoryError;

fn longest_user_id() -> Result<UserId> {
    Ok(UserId::new("u".repeat(MAX_USER_ID_CHARS))?)
}

async fn stored_task(repositories: &Repositories, clock: &ManualClock) -> Result<Task> {
    let task = finished_task(Some(longest_user_id()?), clock)?;
    repositories.tasks.store(&task).await?;
    Ok(task)
}

fn new_order(task_id: TaskId) -> NewOrder {
    NewOrder {
        task_id,
        items: vec![OrderItem::new("print", 2), OrderItem::new("digital", 1)],
        city: "Hangzhou".repeat(40),
        remark: "matte paper".to_owned(),
        amount_minor: 2990,
        channel: "wechat-mini-program".repeat(10),
    }
}

fn intent() -> PaymentIntent {
    PaymentIntent {
        app_id: "wx-app".to_owned(),
        time_stamp: "1704067200".to_owned(),
        nonce_str: "nonce".to_owned(),
        package: "prepay_id=contract".to_owned(),
        sign_type: "RSA".to_owned(),
        pay_sign: "MOCK_SIGN".to_owned(),
    }
}

/// Tasks round-trip, reject duplicates and refuse updates of unknown ids.
pub async fn task_lifecycle(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let mut task = stored_task(repositories, &clock).await?;

    let found = repositories.tasks.find_by_id(task.id()).await?;
    ensure!(found.as_ref() == Some(&task), "stored task differs: {found:?}");

    match repositories.tasks.store(&task).await {
        Err(TaskRepositoryError::DuplicateTask(id)) => ensure!(id == task.id()),
        other => bail!("expected duplicate task, got {other:?}"),
    }

    clock.advance(Duration::seconds(5));
    let base = format!("memory://assets/{}", task.id());
    task.record_variant(ColorName::new("blue")?, format!("{base}/blue.png"), &clock);
    task.record_layout("six_inch", format!("{base}/six.png"), &clock);
    repositories.tasks.update(&task).await?;
    let updated = repositories.tasks.find_by_id(task.id()).await?;
    ensure!(updated.as_ref() == Some(&task), "updated task differs: {updated:?}");

    let unknown = finished_task(None, &clock)?;
    match repositories.tasks.update(&unknown).await {
        Err(TaskRepositoryError::NotFound(id)) => ensure!(id == unknown.id()),
        other => bail!("expected not found, got {other:?}"),
    }
    ensure!(repositories.tasks.find_by_id(TaskId::new()).await?.is_none());
    Ok(())
}

/// Geometry keeps the full `u32` range and blank sources are stored.
pub async fn task_extremes(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let task = Task::new(
        NewTask {
            owner: None,
            spec: TaskSpec {
                code: "custom-".repeat(20),
                width_px: u32::MAX,
                height_px: 0,
                dpi: u32::MAX,
            },
            source_ref: "   ".to_owned(),
            available_colors: Vec::new(),
        },
        &clock,
    );
    repositories.tasks.store(&task).await?;

    let found = repositories.tasks.find_by_id(task.id()).await?;
    ensure!(found.as_ref() == Some(&task), "stored task differs: {found:?}");
    Ok(())
}

/// Orders round-trip their payment intent and refuse unknown updates.
pub async fn order_lifecycle(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let task = stored_task(repositories, &clock).await?;
    let mut order = Order::create(new_order(task.id()), &clock)?;
    repositories.orders.store(&order).await?;

    match repositories.orders.store(&order).await {
        Err(OrderRepositoryError::DuplicateOrder(id)) => ensure!(id == order.id()),
        other => bail!("expected duplicate order, got {other:?}"),
    }

    clock.advance(Duration::seconds(3));
    let key = IdempotencyKey::new(&"k".repeat(MAX_IDEMPOTENCY_KEY_CHARS))?;
    order.begin_payment(key, "wechat", intent(), &clock)?;
    repositories.orders.update(&order).await?;
    let found = repositories
        .orders
        .find_by_id(order.id())
        .await?
        .ok_or_else(|| eyre::eyre!("order {} vanished", order.id()))?;
    ensure!(found == order, "stored order differs: {found:?}");
    ensure!(found.payment_intent() == Some(&intent()));
    ensure!(found.status() == OrderStatus::Pending);

    let unknown = Order::create(new_order(task.id()), &clock)?;
    match repositories.orders.update(&unknown).await {
        Err(OrderRepositoryError::NotFound(id)) => ensure!(id == unknown.id()),
        other => bail!("expected not found, got {other:?}"),
    }
    ensure!(repositories.orders.find_by_id(OrderId::new()).await?.is_none());
    Ok(())
}

/// Listing is newest first, breaks timestamp ties by id and counts all rows.
pub async fn order_listing(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let task = stored_task(repositories, &clock).await?;

    let oldest = Order::create(new_order(task.id()), &clock)?;
    clock.advance(Duration::seconds(1));
    let middle = Order::create(new_order(task.id()), &clock)?;
    clock.advance(Duration::seconds(1));
    let first_tied = Order::create(new_order(task.id()), &clock)?;
    let second_tied = Order::create(new_order(task.id()), &clock)?;
    for order in [&middle, &second_tied, &oldest, &first_tied] {
        repositories.orders.store(order).await?;
    }

    let mut tied = [first_tied.id(), second_tied.id()];
    tied.sort();
    let mut expected = tied.to_vec();
    expected.extend([middle.id(), oldest.id()]);

    let (everything, total) = repositories.orders.list(Page::new(1, 10)).await?;
    let ids: Vec<OrderId> = everything.iter().map(Order::id).collect();
    ensure!(total == 4, "expected 4 orders, counted {total}");
    ensure!(ids == expected, "unexpected order {ids:?}, wanted {expected:?}");

    let (second_page, paged_total) = repositories.orders.list(Page::new(2, 3)).await?;
    let paged: Vec<OrderId> = second_page.iter().map(Order::id).collect();
    ensure!(paged_total == 4);
    ensure!(paged == vec![oldest.id()], "unexpected second page {paged:?}");

    let (beyond, beyond_total) = repositories.orders.list(Page::new(5, 3)).await?;
    ensure!(beyond.is_empty());
    ensure!(beyond_total == 4);
    Ok(())
}

/// Tokens round-trip, reject duplicates and refuse unknown updates.
pub async fn token_lifecycle(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let task = stored_task(repositories, &clock).await?;
    let mut token = DownloadToken::issue(task.id(), longest_user_id()?, 60, &clock);
    repositories.tokens.store(&token).await?;

    match repositories.tokens.store(&token).await {
        Err(DownloadTokenRepositoryError::DuplicateToken(value)) => {
            ensure!(&value == token.token());
        }
        other => bail!("expected duplicate token, got {other:?}"),
    }

    clock.advance(Duration::seconds(10));
    ensure!(token.redeem(&clock)? == Redemption::Granted);
    repositories.tokens.update(&token).await?;
    let found = repositories.tokens.find_by_token(token.token()).await?;
    ensure!(found.as_ref() == Some(&token), "stored token differs: {found:?}");
    ensure!(found.map(|stored| stored.status()) == Some(TokenStatus::Used));

    let unknown = DownloadToken::issue(task.id(), longest_user_id()?, 60, &clock);
    match repositories.tokens.update(&unknown).await {
        Err(DownloadTokenRepositoryError::NotFound(value)) => ensure!(&value == unknown.token()),
        other => bail!("expected not found, got {other:?}"),
    }
    ensure!(repositories.tokens.find_by_token(&TokenValue::generate()).await?.is_none());
    Ok(())
}

/// Open ids are unique and profile updates persist.
pub async fn user_lifecycle(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let open_id = OpenId::new("o".repeat(MAX_OPEN_ID_CHARS))?;
    let mut user = User::register(open_id.clone(), &clock);
    repositories.users.store(&user).await?;

    let by_open_id = repositories.users.find_by_open_id(&open_id).await?;
    ensure!(by_open_id.as_ref() == Some(&user), "lookup by open id differs: {by_open_id:?}");

    let impostor = User::register(open_id.clone(), &clock);
    match repositories.users.store(&impostor).await {
        Err(UserRepositoryError::DuplicateOpenId(duplicate)) => ensure!(duplicate == open_id),
        other => bail!("expected duplicate open id, got {other:?}"),
    }

    clock.advance(Duration::seconds(7));
    user.update_profile("Ada ".repeat(100), " https://cdn.example/ada.png ", &clock);
    repositories.users.update(&user).await?;
    let by_id = repositories.users.find_by_id(user.id()).await?;
    ensure!(by_id.as_ref() == Some(&user), "updated user differs: {by_id:?}");

    match repositories.users.update(&impostor).await {
        Err(UserRepositoryError::NotFound(id)) => ensure!(&id == impostor.id()),
        other => bail!("expected not found, got {other:?}"),
    }
    Ok(())
}

/// Over-long payment keys are rejected before the gateway or storage.
pub async fn over_long_key_is_bad_request(repositories: &Repositories) -> Result<()> {
    let clock = ManualClock::at_epoch();
    let task = stored_task(repositories, &clock).await?;
    let service = OrderPaymentService::new(
        Arc::clone(&repositories.orders),
        Arc::new(SandboxPaymentGateway::new("wx-contract")),
        Arc::clone(&repositories.tasks),
        Arc::new(clock.clone()),
    );
    let order = service.create(new_order(task.id())).await?;

    let too_long = "k".repeat(MAX_IDEMPOTENCY_KEY_CHARS + 1);
    match service.pay(order.id(), "wechat", &too_long).await {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest, "unexpected error {err}"),
        Ok(intent) => bail!("expected bad request, got {intent:?}"),
    }
    let untouched = repositories.orders.find_by_id(order.id()).await?;
    ensure!(untouched.as_ref().map(Order::status) == Some(OrderStatus::Created));

    let longest = "k".repeat(MAX_IDEMPOTENCY_KEY_CHARS);
    let issued = service.pay(order.id(), "wechat", &longest).await?;
    let replayed = service.pay(order.id(), "wechat", &longest).await?;
    ensure!(issued == replayed);
    Ok(())
}
