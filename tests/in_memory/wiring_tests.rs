//! Configuration-driven assembly of the application.

use camino::Utf8PathBuf;
use eyre::{Result, bail, ensure};
use permit::app::{AppError, Application};
use permit::config::AppConfig;
use permit::error::ErrorKind;
use permit::task::domain::TaskId;
use uuid::Uuid;

fn scratch_config() -> AppConfig {
    let root = std::env::temp_dir().join(format!("permit-wiring-{}", Uuid::new_v4().simple()));
    let root_path = Utf8PathBuf::from_path_buf(root).unwrap_or_else(|_| Utf8PathBuf::from("target/permit-wiring"));
    AppConfig {
        assets_dir: root_path.join("assets"),
        uploads_dir: root_path.join("uploads"),
        ..AppConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn default_configuration_wires_in_memory_services() -> Result<()> {
    let config = scratch_config();

    let app = Application::build(&config)?;

    ensure!(config.assets_dir.is_dir());
    ensure!(config.uploads_dir.is_dir());
    match app.pipeline.find_task(TaskId::new()).await {
        Err(err) => ensure!(err.kind() == ErrorKind::NotFound),
        Ok(task) => bail!("empty repository returned {task:?}"),
    }
    let (orders, total) = app.orders.list(1, 20).await?;
    ensure!(orders.is_empty() && total == 0);
    Ok(())
}

#[test]
fn live_payments_are_refused() {
    let config = AppConfig {
        pay_mock: false,
        ..scratch_config()
    };

    let result = Application::build(&config);

    assert!(matches!(result, Err(AppError::LivePaymentsUnsupported)));
}
