//! Repository contract over the in-memory adapters.

use crate::repository_contract;
use eyre::Result;
use permit::app::Repositories;
use rstest::{fixture, rstest};

#[fixture]
fn repositories() -> Repositories {
    Repositories::in_memory()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_lifecycle(repositories: Repositories) -> Result<()> {
    repository_contract::task_lifecycle(&repositories).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_extremes(repositories: Repositories) -> Result<()> {
    repository_contract::task_extremes(&repositories).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn order_lifecycle(repositories: Repositories) -> Result<()> {
    repository_contract::order_lifecycle(&repositories).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn order_listing(repositories: Repositories) -> Result<()> {
    repository_contract::order_listing(&repositories).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn token_lifecycle(repositories: Repositories) -> Result<()> {
    repository_contract::token_lifecycle(&repositories).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_lifecycle(repositories: Repositories) -> Result<()> {
    repository_contract::user_lifecycle(&repositories).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn over_long_key_is_bad_request(repositories: Repositories) -> Result<()> {
    repository_contract::over_long_key_is_bad_request(&repositories).await
}
