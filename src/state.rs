use std::sync::Arc;

use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::db;
use crate::todos::repo::{PgTodoRepo, TodoRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub todos: Arc<dyn TodoRepo>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;
        let timeout = config.db_timeout();

        let users = Arc::new(PgUserRepo::new(pool.clone(), timeout)) as Arc<dyn UserRepo>;
        let todos = Arc::new(PgTodoRepo::new(pool, timeout)) as Arc<dyn TodoRepo>;

        Ok(Self::from_parts(config, users, todos))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        todos: Arc<dyn TodoRepo>,
    ) -> Self {
        Self {
            config,
            users,
            todos,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        use crate::memory::{MemoryTodoRepo, MemoryUserRepo};

        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryUserRepo::default()),
            Arc::new(MemoryTodoRepo::default()),
        )
    }

    pub async fn seed_user(&self, email: &str) -> crate::auth::repo_types::User {
        use crate::auth::repo_types::NewUser;

        self.users
            .create(NewUser {
                email: email.into(),
                name: "Test".into(),
                password_hash: "unused".into(),
            })
            .await
            .expect("seed user")
    }
}
