//! In-process repositories backing unit and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    db::StoreError,
    todos::{
        dto::TodoPatch,
        repo::TodoRepo,
        repo_types::{NewTodo, Todo},
    },
};

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(Some("users_email_key".into())));
        }
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryTodoRepo {
    rows: Mutex<Vec<Todo>>,
}

#[async_trait]
impl TodoRepo for MemoryTodoRepo {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|t| t.user_id == owner_id).cloned().collect())
    }

    async fn create(&self, owner_id: Uuid, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        // strictly increasing timestamps keep insertion order == created_at order
        let mut created_at = OffsetDateTime::now_utc();
        if let Some(last) = rows.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + Duration::microseconds(1);
            }
        }
        let row = Todo {
            id: Uuid::new_v4(),
            title: todo.title,
            description: todo.description,
            completed: false,
            created_at,
            user_id: owner_id,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::EmptyPatch);
        }
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner_id)
        else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            row.title = title.clone();
        }
        if let Some(description) = &patch.description {
            row.description = Some(description.clone());
        }
        if let Some(completed) = patch.completed {
            row.completed = completed;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.user_id == owner_id));
        Ok(rows.len() < before)
    }
}
