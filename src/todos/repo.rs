use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::TodoPatch,
    repo_types::{NewTodo, Todo},
};
use crate::db::{with_timeout, StoreError};

const TODO_COLUMNS: &str = "id, title, description, is_completed, created_at, user_id";

const LIST_SQL: &str = "SELECT id, title, description, is_completed, created_at, user_id \
     FROM todos WHERE user_id = $1 ORDER BY created_at ASC, id ASC";

const INSERT_SQL: &str = "INSERT INTO todos (id, title, description, is_completed, created_at, user_id) \
     VALUES ($1, $2, $3, FALSE, $4, $5) \
     RETURNING id, title, description, is_completed, created_at, user_id";

const DELETE_SQL: &str = "DELETE FROM todos WHERE id = $1 AND user_id = $2";

/// Owner-scoped todo storage. Every method filters by `owner_id`.
#[async_trait]
pub trait TodoRepo: Send + Sync {
    /// All of the owner's todos, oldest first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError>;

    async fn create(&self, owner_id: Uuid, todo: NewTodo) -> Result<Todo, StoreError>;

    /// `Ok(None)` when no row matches both `id` and `owner_id`.
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>, StoreError>;

    /// `Ok(false)` when no row matches both `id` and `owner_id`.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError>;
}

/// Builds `UPDATE todos SET ... WHERE id = $n AND user_id = $m RETURNING ...`
/// from the present patch fields, in the fixed order title, description,
/// completed. Returns `None` for an empty patch.
pub(crate) fn update_statement(
    id: Uuid,
    owner_id: Uuid,
    patch: &TodoPatch,
) -> Option<QueryBuilder<'static, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("UPDATE todos SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(title) = &patch.title {
            set.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(description) = &patch.description {
            set.push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(completed) = patch.completed {
            set.push("is_completed = ").push_bind_unseparated(completed);
        }
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(owner_id)
        .push(" RETURNING ")
        .push(TODO_COLUMNS);
    Some(qb)
}

pub struct PgTodoRepo {
    db: PgPool,
    timeout: Duration,
}

impl PgTodoRepo {
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl TodoRepo for PgTodoRepo {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let q = sqlx::query_as::<_, Todo>(LIST_SQL)
            .bind(owner_id)
            .fetch_all(&self.db);
        with_timeout(self.timeout, q).await
    }

    async fn create(&self, owner_id: Uuid, todo: NewTodo) -> Result<Todo, StoreError> {
        let q = sqlx::query_as::<_, Todo>(INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(todo.title)
            .bind(todo.description)
            .bind(OffsetDateTime::now_utc())
            .bind(owner_id)
            .fetch_one(&self.db);
        with_timeout(self.timeout, q).await
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        let mut qb = update_statement(id, owner_id, patch).ok_or(StoreError::EmptyPatch)?;
        let q = qb.build_query_as::<Todo>().fetch_optional(&self.db);
        with_timeout(self.timeout, q).await
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let q = sqlx::query(DELETE_SQL)
            .bind(id)
            .bind(owner_id)
            .execute(&self.db);
        let res = with_timeout(self.timeout, q).await?;
        Ok(res.rows_affected() > 0)
    }
}
