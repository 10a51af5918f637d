//! End-to-end purchase flow over in-memory adapters.

use super::helpers::{SOURCE_REF, TestApp, test_app};
use chrono::Duration;
use eyre::{Result, bail, ensure};
use mockable::Clock;
use permit::download::domain::TokenStatus;
use permit::error::ErrorKind;
use permit::order::domain::{NewOrder, OrderItem, OrderStatus};
use permit::task::domain::TaskStatus;
use permit::task::services::CreateTaskRequest;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paid_task_is_downloaded_once(test_app: TestApp) -> Result<()> {
    let TestApp { app, clock, .. } = test_app;
    let user = app.users.find_or_register("wx-open-77").await?;

    let task = app
        .pipeline
        .create_task(
            CreateTaskRequest::new("passport", SOURCE_REF)
                .with_owner(user.id().clone())
                .with_color("blue"),
        )
        .await?;
    ensure!(task.status() == &TaskStatus::Done);

    let order = app
        .orders
        .create(NewOrder {
            task_id: task.id(),
            items: vec![OrderItem::new("digital", 1)],
            city: String::new(),
            remark: String::new(),
            amount_minor: 990,
            channel: String::new(),
        })
        .await?;
    let intent = app.orders.pay(order.id(), "", "checkout-1").await?;
    ensure!(intent.app_id == "wx-test-app");
    ensure!(intent.package.starts_with("prepay_id=mock-"));
    ensure!(intent.time_stamp == clock.utc().timestamp().to_string());
    let replay = app.orders.pay(order.id(), "", "checkout-1").await?;
    ensure!(replay == intent);
    let paid = app.orders.callback(order.id(), "paid").await?;
    ensure!(paid.status() == OrderStatus::Paid);

    let token = app
        .downloads
        .create_token(&task.id().to_string(), user.id().as_str(), 300)
        .await?;
    clock.advance(Duration::seconds(10));
    let used = app.downloads.use_token(token.token().as_str()).await?;
    ensure!(used.status() == TokenStatus::Used);

    match app.downloads.use_token(token.token().as_str()).await {
        Err(err) => ensure!(err.kind() == ErrorKind::Conflict),
        Ok(again) => bail!("token redeemed twice: {again:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_users_cannot_take_tokens(test_app: TestApp) -> Result<()> {
    let TestApp { app, .. } = test_app;
    let owner = app.users.find_or_register("wx-owner").await?;
    let stranger = app.users.find_or_register("wx-stranger").await?;
    let task = app
        .pipeline
        .create_task(CreateTaskRequest::new("passport", SOURCE_REF).with_owner(owner.id().clone()))
        .await?;

    let result = app
        .downloads
        .create_token(&task.id().to_string(), stranger.id().as_str(), 0)
        .await;

    match result {
        Err(err) => ensure!(err.kind() == ErrorKind::BadRequest),
        Ok(token) => bail!("stranger received {token:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paid_order_refuses_second_checkout(test_app: TestApp) -> Result<()> {
    let TestApp { app, .. } = test_app;
    let task = app
        .pipeline
        .create_task(CreateTaskRequest::new("", SOURCE_REF))
        .await?;
    let order = app
        .orders
        .create(NewOrder {
            task_id: task.id(),
            items: vec![OrderItem::new("print", 4)],
            city: "Suzhou".to_owned(),
            remark: String::new(),
            amount_minor: 2500,
            channel: "wechat".to_owned(),
        })
        .await?;
    app.orders.pay(order.id(), "wechat", "first").await?;
    app.orders.callback(order.id(), "PAID").await?;

    match app.orders.pay(order.id(), "wechat", "second").await {
        Err(err) => ensure!(err.kind() == ErrorKind::Conflict),
        Ok(intent) => bail!("paid order issued {intent:?}"),
    }
    let (orders, total) = app.orders.list(1, 10).await?;
    ensure!(total == 1);
    ensure!(orders.first().map(|listed| listed.status()) == Some(OrderStatus::Paid));
    Ok(())
}
