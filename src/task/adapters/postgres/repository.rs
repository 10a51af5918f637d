//! `PostgreSQL` repository implementation for tasks.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{PersistedTaskData, Task, TaskId, TaskSpec, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                    .set(&row)
                    .execute(connection)
                    .map_err(TaskRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let spec = task.spec();
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().map(|owner| owner.as_str().to_owned()),
        spec_code: spec.code.clone(),
        width_px: i64::from(spec.width_px),
        height_px: i64::from(spec.height_px),
        dpi: i64::from(spec.dpi),
        source_ref: task.source_ref().to_owned(),
        status: task.status().as_str().to_owned(),
        error_msg: task.status().error_message().map(str::to_owned),
        baseline_url: task.baseline_url().map(str::to_owned),
        processed_urls: serde_json::to_value(task.processed_urls())
            .map_err(TaskRepositoryError::persistence)?,
        layout_urls: serde_json::to_value(task.layout_urls())
            .map_err(TaskRepositoryError::persistence)?,
        available_colors: serde_json::to_value(task.available_colors())
            .map_err(TaskRepositoryError::persistence)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        spec_code,
        width_px,
        height_px,
        dpi,
        source_ref,
        status: persisted_status,
        error_msg,
        baseline_url,
        processed_urls,
        layout_urls,
        available_colors,
        created_at,
        updated_at,
    } = row;

    let owner = owner_id
        .map(UserId::new)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::from_parts(&persisted_status, error_msg.as_deref())
        .map_err(TaskRepositoryError::persistence)?;
    let spec = TaskSpec {
        code: spec_code,
        width_px: u32::try_from(width_px).map_err(TaskRepositoryError::persistence)?,
        height_px: u32::try_from(height_px).map_err(TaskRepositoryError::persistence)?,
        dpi: u32::try_from(dpi).map_err(TaskRepositoryError::persistence)?,
    };

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner,
        spec,
        source_ref,
        status,
        baseline_url,
        processed_urls: serde_json::from_value(processed_urls)
            .map_err(TaskRepositoryError::persistence)?,
        layout_urls: serde_json::from_value(layout_urls)
            .map_err(TaskRepositoryError::persistence)?,
        available_colors: serde_json::from_value(available_colors)
            .map_err(TaskRepositoryError::persistence)?,
        created_at,
        updated_at,
    }))
}
