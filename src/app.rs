//! Start-up wiring of repositories, adapters and services.
//!
//! Services hold trait objects so the backend is chosen once, from
//! configuration, and never named inside a service.

use crate::config::AppConfig;
use crate::download::{
    adapters::{memory::InMemoryDownloadTokenRepository, postgres::PostgresDownloadTokenRepository},
    ports::DownloadTokenRepository,
    services::DownloadTokenService,
};
use crate::order::{
    adapters::{
        memory::InMemoryOrderRepository, payment::SandboxPaymentGateway,
        postgres::PostgresOrderRepository,
    },
    ports::{OrderRepository, PaymentGateway},
    services::OrderPaymentService,
};
use crate::task::{
    adapters::{
        filesystem::{FsAssetStore, FsUploadStore},
        http::HttpPhotoProcessor,
        memory::InMemoryTaskRepository,
        postgres::PostgresTaskRepository,
    },
    ports::{AssetStore, AssetStoreError, PhotoProcessor, PhotoProcessorError, TaskRepository, UploadStore},
    services::{PipelineSettings, TaskPipelineService},
};
use crate::user::{
    adapters::{memory::InMemoryUserRepository, postgres::PostgresUserRepository},
    ports::UserRepository,
    services::UserDirectoryService,
};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Task pipeline over trait-object collaborators.
pub type PipelineService<C = DefaultClock> =
    TaskPipelineService<dyn TaskRepository, dyn AssetStore, dyn UploadStore, dyn PhotoProcessor, C>;

/// Order service over trait-object collaborators.
pub type OrderService<C = DefaultClock> =
    OrderPaymentService<dyn OrderRepository, dyn PaymentGateway, dyn TaskRepository, C>;

/// Download token service over trait-object collaborators.
pub type DownloadService<C = DefaultClock> =
    DownloadTokenService<dyn DownloadTokenRepository, dyn TaskRepository, C>;

/// User directory over a trait-object repository.
pub type UserService<C = DefaultClock> = UserDirectoryService<dyn UserRepository, C>;

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// The `PostgreSQL` pool could not be created.
    #[error("failed to connect to PostgreSQL: {0}")]
    Database(#[from] PoolError),

    /// An asset or upload directory could not be opened.
    #[error(transparent)]
    Storage(#[from] AssetStoreError),

    /// The photo processor client could not be built.
    #[error(transparent)]
    Processor(#[from] PhotoProcessorError),

    /// Only the sandbox payment gateway is available.
    #[error("live payments are not supported; set PERMIT_PAY_MOCK=true")]
    LivePaymentsUnsupported,
}

/// Persistence backend selected at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Process-local maps.
    InMemory,
    /// `PostgreSQL` through a shared connection pool.
    Postgres,
}

impl Backend {
    /// Returns the backend name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

/// One repository per aggregate, all on the same backend.
#[derive(Clone)]
pub struct Repositories {
    /// Selected backend.
    pub backend: Backend,
    /// Task repository.
    pub tasks: Arc<dyn TaskRepository>,
    /// Order repository.
    pub orders: Arc<dyn OrderRepository>,
    /// Download token repository.
    pub tokens: Arc<dyn DownloadTokenRepository>,
    /// User repository.
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Creates empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::InMemory,
            tasks: Arc::new(InMemoryTaskRepository::new()),
            orders: Arc::new(InMemoryOrderRepository::new()),
            tokens: Arc::new(InMemoryDownloadTokenRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    /// Creates `PostgreSQL` repositories sharing one pool.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] when the pool cannot be established.
    pub fn postgres(dsn: &str) -> Result<Self, AppError> {
        let pool = Pool::builder().build(ConnectionManager::<PgConnection>::new(dsn))?;
        Ok(Self::postgres_pool(pool))
    }

    /// Creates `PostgreSQL` repositories over an existing pool.
    #[must_use]
    pub fn postgres_pool(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self {
            backend: Backend::Postgres,
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            tokens: Arc::new(PostgresDownloadTokenRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
        }
    }
}

/// External collaborators of the services.
#[derive(Clone)]
pub struct Collaborators {
    /// Generated asset storage.
    pub assets: Arc<dyn AssetStore>,
    /// Uploaded source photos.
    pub uploads: Arc<dyn UploadStore>,
    /// Photo-processing service.
    pub processor: Arc<dyn PhotoProcessor>,
    /// Payment intent issuer.
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Fully wired application services.
pub struct Application<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    /// Task pipeline.
    pub pipeline: PipelineService<C>,
    /// Orders and payments.
    pub orders: OrderService<C>,
    /// Download tokens.
    pub downloads: DownloadService<C>,
    /// User directory.
    pub users: UserService<C>,
}

impl Application<DefaultClock> {
    /// Wires the application from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when a backend or adapter cannot be created.
    pub fn build(config: &AppConfig) -> Result<Self, AppError> {
        if !config.pay_mock {
            return Err(AppError::LivePaymentsUnsupported);
        }
        let repositories = match config.postgres_dsn.as_deref() {
            Some(dsn) => Repositories::postgres(dsn)?,
            None => Repositories::in_memory(),
        };
        let collaborators = Collaborators {
            assets: Arc::new(FsAssetStore::open(
                config.assets_dir.clone(),
                config.assets_public_url.clone(),
            )?),
            uploads: Arc::new(FsUploadStore::open(config.uploads_dir.clone())?),
            processor: Arc::new(HttpPhotoProcessor::new(
                config.algo_url.clone(),
                config.algo_timeout,
            )?),
            gateway: Arc::new(SandboxPaymentGateway::new(config.wechat_app_id.clone())),
        };
        info!(
            environment = %config.environment,
            backend = repositories.backend.as_str(),
            layout_rendering = config.layout_rendering.as_str(),
            "application wired"
        );
        Ok(Self::with_collaborators(
            repositories,
            collaborators,
            PipelineSettings {
                layout_rendering: config.layout_rendering,
            },
            Arc::new(DefaultClock),
        ))
    }
}

impl<C> Application<C>
where
    C: Clock + Send + Sync,
{
    /// Wires services over explicit collaborators.
    #[must_use]
    pub fn with_collaborators(
        repositories: Repositories,
        collaborators: Collaborators,
        settings: PipelineSettings,
        clock: Arc<C>,
    ) -> Self {
        let Repositories {
            tasks,
            orders,
            tokens,
            users,
            ..
        } = repositories;
        let Collaborators {
            assets,
            uploads,
            processor,
            gateway,
        } = collaborators;

        Self {
            pipeline: TaskPipelineService::new(
                Arc::clone(&tasks),
                assets,
                uploads,
                processor,
                Arc::clone(&clock),
            )
            .with_settings(settings),
            orders: OrderPaymentService::new(orders, gateway, Arc::clone(&tasks), Arc::clone(&clock)),
            downloads: DownloadTokenService::new(tokens, tasks, Arc::clone(&clock)),
            users: UserDirectoryService::new(users, clock),
        }
    }
}
