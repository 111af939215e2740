use std::{future::Future, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

/// Errors surfaced by the repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique violation; carries the constraint name when the driver reports one.
    #[error("unique constraint violated: {}", .0.as_deref().unwrap_or("unknown"))]
    Conflict(Option<String>),

    #[error("no fields to update")]
    EmptyPatch,

    #[error("store call exceeded {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.constraint().map(str::to_owned));
            }
        }
        StoreError::Database(e)
    }
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_timeout())
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    Ok(db)
}

/// Runs a single store call under `limit`. Dropping the returned future
/// (e.g. when the client goes away) cancels the statement as well.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_passes_through_result() {
        let v = with_timeout(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(7) })
            .await
            .expect("ok");
        assert_eq!(v, 7);
    }

    #[tokio::test]
    async fn with_timeout_maps_row_not_found_to_database() {
        let err = with_timeout(Duration::from_secs(1), async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test(start_paused = true)]
    async fn with_timeout_expires_stalled_calls() {
        let err = with_timeout(Duration::from_secs(3), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Timeout(d) if d == Duration::from_secs(3)));
    }
}
