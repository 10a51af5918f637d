//! Tests for order creation, payment and callbacks.

use std::sync::Arc;

use crate::error::ErrorKind;
use crate::order::{
    adapters::memory::InMemoryOrderRepository,
    domain::{
        MAX_IDEMPOTENCY_KEY_CHARS, NewOrder, Order, OrderId, OrderItem, OrderStatus,
        PaymentIntent,
    },
    ports::{MockPaymentGateway, OrderRepository, PaymentGatewayError},
    services::{OrderPaymentError, OrderPaymentService},
};
use crate::task::{adapters::memory::InMemoryTaskRepository, domain::TaskId, ports::TaskRepository};
use crate::testing::{ManualClock, finished_task};
use chrono::Duration;
use eyre::{Result, ensure};
use rstest::rstest;

type TestService =
    OrderPaymentService<InMemoryOrderRepository, MockPaymentGateway, InMemoryTaskRepository, ManualClock>;

struct Fixture {
    service: TestService,
    orders: Arc<InMemoryOrderRepository>,
    clock: ManualClock,
    task_id: TaskId,
}

async fn setup(gateway: MockPaymentGateway) -> Result<Fixture> {
    let clock = ManualClock::at_epoch();
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let task = finished_task(None, &clock)?;
    tasks.store(&task).await?;
    let orders = Arc::new(InMemoryOrderRepository::new());
    let service = OrderPaymentService::new(
        Arc::clone(&orders),
        Arc::new(gateway),
        tasks,
        Arc::new(clock.clone()),
    );
    Ok(Fixture {
        service,
        orders,
        clock,
        task_id: task.id(),
    })
}

fn new_order(task_id: TaskId) -> NewOrder {
    NewOrder {
        task_id,
        items: vec![OrderItem::new("print", 2), OrderItem::new("digital", 1)],
        city: "Hangzhou".to_owned(),
        remark: "matte paper".to_owned(),
        amount_minor: 2990,
        channel: String::new(),
    }
}

fn intent(package: &str) -> PaymentIntent {
    PaymentIntent {
        app_id: "wx-app".to_owned(),
        time_stamp: "1704067200".to_owned(),
        nonce_str: "nonce".to_owned(),
        package: package.to_owned(),
        sign_type: "RSA".to_owned(),
        pay_sign: "MOCK_SIGN".to_owned(),
    }
}

fn gateway_issuing(package: &'static str, times: usize) -> MockPaymentGateway {
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_issue_intent()
        .times(times)
        .returning(move |_, _, _| Ok(intent(package)));
    gateway
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_requires_existing_task() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;

    let created = fx.service.create(new_order(fx.task_id)).await?;
    let missing = fx.service.create(new_order(TaskId::new())).await;

    ensure!(created.status() == OrderStatus::Created);
    ensure!(fx.orders.find_by_id(created.id()).await?.as_ref() == Some(&created));
    match missing {
        Err(err) => ensure!(err.kind() == ErrorKind::NotFound),
        Ok(order) => eyre::bail!("expected missing task, got {order:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_order_is_bad_request() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let mut order = new_order(fx.task_id);
    order.amount_minor = 0;

    let result = fx.service.create(order).await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest),
        Ok(created) => eyre::bail!("expected validation error, got {created:?}"),
    }
    let (_, total) = fx.service.list(1, 20).await?;
    ensure!(total == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pay_is_idempotent_per_key() -> Result<()> {
    let fx = setup(gateway_issuing("prepay_id=mock-1", 1)).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;

    let first = fx.service.pay(order.id(), "", "attempt-1").await?;
    let second = fx.service.pay(order.id(), "alipay", " attempt-1 ").await?;

    ensure!(first == second);
    let stored = fx.service.find(order.id()).await?;
    ensure!(stored.status() == OrderStatus::Pending);
    ensure!(stored.channel() == "wechat");
    ensure!(stored.payment_intent() == Some(&first));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pay_with_another_key_conflicts() -> Result<()> {
    let fx = setup(gateway_issuing("prepay_id=mock-2", 1)).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;
    fx.service.pay(order.id(), "wechat", "attempt-1").await?;

    let result = fx.service.pay(order.id(), "wechat", "attempt-2").await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::Conflict),
        Ok(intent) => eyre::bail!("expected conflict, got {intent:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pay_on_paid_order_conflicts_even_with_new_key() -> Result<()> {
    let fx = setup(gateway_issuing("prepay_id=mock-3", 1)).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;
    fx.service.pay(order.id(), "wechat", "attempt-1").await?;
    fx.service.callback(order.id(), "paid").await?;

    let same_key = fx.service.pay(order.id(), "wechat", "attempt-1").await;
    let new_key = fx.service.pay(order.id(), "wechat", "attempt-9").await;

    for result in [same_key, new_key] {
        match result {
            Err(err) => ensure!(err.kind() == ErrorKind::Conflict),
            Ok(intent) => eyre::bail!("expected conflict, got {intent:?}"),
        }
    }
    Ok(())
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test(flavor = "multi_thread")]
async fn blank_key_is_bad_request(#[case] key: &str) -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;

    let result = fx.service.pay(order.id(), "wechat", key).await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest),
        Ok(intent) => eyre::bail!("expected bad request, got {intent:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn over_long_key_is_rejected_before_the_gateway() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;
    let key = "k".repeat(MAX_IDEMPOTENCY_KEY_CHARS + 1);

    let result = fx.service.pay(order.id(), "wechat", &key).await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest),
        Ok(intent) => eyre::bail!("expected bad request, got {intent:?}"),
    }
    let stored = fx.orders.find_by_id(order.id()).await?;
    ensure!(stored.as_ref().map(Order::status) == Some(OrderStatus::Created));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pay_on_unknown_order_is_not_found() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let missing = OrderId::new();

    let result = fx.service.pay(missing, "wechat", "").await;

    ensure!(matches!(result, Err(OrderPaymentError::NotFound(id)) if id == missing));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gateway_failure_leaves_order_untouched() -> Result<()> {
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_issue_intent()
        .times(1)
        .returning(|_, channel, _| Err(PaymentGatewayError::UnsupportedChannel(channel.to_owned())));
    let fx = setup(gateway).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;

    let result = fx.service.pay(order.id(), "paypal", "attempt-1").await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest),
        Ok(intent) => eyre::bail!("expected gateway failure, got {intent:?}"),
    }
    let stored = fx.service.find(order.id()).await?;
    ensure!(stored.status() == OrderStatus::Created);
    ensure!(stored.payment_key().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_callback_does_not_mutate() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;
    fx.clock.advance(Duration::minutes(5));

    let result = fx.service.callback(order.id(), "shipped").await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest),
        Ok(updated) => eyre::bail!("expected bad request, got {updated:?}"),
    }
    ensure!(fx.service.find(order.id()).await? == order);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn callbacks_apply_unconditionally() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let order = fx.service.create(new_order(fx.task_id)).await?;

    let paid = fx.service.callback(order.id(), " PAID ").await?;
    fx.clock.advance(Duration::minutes(1));
    let refunded = fx.service.callback(order.id(), "refunded").await?;

    ensure!(paid.status() == OrderStatus::Paid);
    ensure!(refunded.status() == OrderStatus::Refunded);
    ensure!(refunded.updated_at() == order.created_at() + Duration::minutes(1));
    ensure!(fx.service.find(order.id()).await?.status() == OrderStatus::Refunded);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_is_newest_first_and_paged() -> Result<()> {
    let fx = setup(MockPaymentGateway::new()).await?;
    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(fx.service.create(new_order(fx.task_id)).await?.id());
        fx.clock.advance(Duration::seconds(1));
    }

    let (first_page, total) = fx.service.list(1, 2).await?;
    let (last_page, _) = fx.service.list(3, 2).await?;
    let (clamped, _) = fx.service.list(0, 0).await?;

    ensure!(total == 5);
    let first_ids: Vec<OrderId> = first_page.iter().map(|order| order.id()).collect();
    ensure!(first_ids == created.iter().rev().take(2).copied().collect::<Vec<_>>());
    ensure!(last_page.len() == 1);
    ensure!(last_page.first().map(|order| order.id()) == created.first().copied());
    ensure!(clamped.len() == 1);
    Ok(())
}
