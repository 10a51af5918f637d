//! Repository contract over the `PostgreSQL` adapters.

use crate::postgres::helpers::{postgres_cluster, repositories, temporary_database, test_runtime};
use crate::repository_contract;
use eyre::Result;
use permit::app::Repositories;
use rstest::rstest;
use std::future::Future;

/// Runs `check` against a fresh database cloned from the template.
fn run_contract<F, Fut>(prefix: &str, check: F) -> Result<()>
where
    F: FnOnce(Repositories) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let Some(cluster) = postgres_cluster() else {
        return Ok(());
    };
    let guard = temporary_database(cluster, prefix)?;
    let repos = repositories(&guard)?;
    let rt = test_runtime()?;
    let outcome = rt.block_on(check(repos));
    drop(rt);
    drop(guard);
    outcome
}

#[rstest]
fn task_lifecycle() -> Result<()> {
    run_contract("test_task_lifecycle", |repos| async move {
        repository_contract::task_lifecycle(&repos).await
    })
}

#[rstest]
fn task_extremes() -> Result<()> {
    run_contract("test_task_extremes", |repos| async move {
        repository_contract::task_extremes(&repos).await
    })
}

#[rstest]
fn order_lifecycle() -> Result<()> {
    run_contract("test_order_lifecycle", |repos| async move {
        repository_contract::order_lifecycle(&repos).await
    })
}

#[rstest]
fn order_listing() -> Result<()> {
    run_contract("test_order_listing", |repos| async move {
        repository_contract::order_listing(&repos).await
    })
}

#[rstest]
fn token_lifecycle() -> Result<()> {
    run_contract("test_token_lifecycle", |repos| async move {
        repository_contract::token_lifecycle(&repos).await
    })
}

#[rstest]
fn user_lifecycle() -> Result<()> {
    run_contract("test_user_lifecycle", |repos| async move {
        repository_contract::user_lifecycle(&repos).await
    })
}

#[rstest]
fn over_long_key_is_bad_request() -> Result<()> {
    run_contract("test_over_long_key", |repos| async move {
        repository_contract::over_long_key_is_bad_request(&repos).await
    })
}
