use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{title_is_valid, CreateTodoRequest, TodoPatch, MIN_TITLE_LEN},
    repo::TodoRepo,
    repo_types::{NewTodo, Todo},
};
use crate::error::AppError;

fn title_error() -> AppError {
    AppError::Validation {
        message: "Validation failed".into(),
        details: Some(format!("title must be at least {MIN_TITLE_LEN} characters")),
    }
}

pub async fn list_todos(todos: &dyn TodoRepo, owner_id: Uuid) -> Result<Vec<Todo>, AppError> {
    Ok(todos.list(owner_id).await?)
}

pub async fn create_todo(
    todos: &dyn TodoRepo,
    owner_id: Uuid,
    input: CreateTodoRequest,
) -> Result<Todo, AppError> {
    if !title_is_valid(&input.title) {
        return Err(title_error());
    }
    let todo = todos
        .create(
            owner_id,
            NewTodo {
                title: input.title,
                description: input.description,
            },
        )
        .await?;
    info!(todo_id = %todo.id, user_id = %owner_id, "todo created");
    Ok(todo)
}

/// Missing ids and ids owned by someone else both come back as `NotFound`.
pub async fn update_todo(
    todos: &dyn TodoRepo,
    id: Uuid,
    owner_id: Uuid,
    patch: TodoPatch,
) -> Result<Todo, AppError> {
    if patch.is_empty() {
        return Err(AppError::validation("No updates provided"));
    }
    if matches!(&patch.title, Some(t) if !title_is_valid(t)) {
        return Err(title_error());
    }
    match todos.update(id, owner_id, &patch).await? {
        Some(todo) => Ok(todo),
        None => {
            warn!(todo_id = %id, user_id = %owner_id, "update target missing or not owned");
            Err(AppError::NotFound("Todo"))
        }
    }
}

pub async fn delete_todo(todos: &dyn TodoRepo, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
    if todos.delete(id, owner_id).await? {
        info!(todo_id = %id, user_id = %owner_id, "todo deleted");
        Ok(())
    } else {
        warn!(todo_id = %id, user_id = %owner_id, "delete target missing or not owned");
        Err(AppError::NotFound("Todo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTodoRepo;

    fn create_req(title: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            title: title.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_defaults() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        let todo = create_todo(
            &repo,
            owner,
            CreateTodoRequest {
                title: "Buy milk".into(),
                description: Some("2 litres".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description.as_deref(), Some("2 litres"));
        assert!(!todo.completed);
        assert_eq!(todo.user_id, owner);
    }

    #[tokio::test]
    async fn short_title_writes_nothing() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        for title in ["", "ab"] {
            let err = create_todo(&repo, owner, create_req(title)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
        assert!(list_todos(&repo, owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let repo = MemoryTodoRepo::default();
        let owners: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for i in 0..12 {
            let owner = owners[i % owners.len()];
            create_todo(&repo, owner, create_req(&format!("todo {i}")))
                .await
                .unwrap();
        }
        for owner in &owners {
            let mine = list_todos(&repo, *owner).await.unwrap();
            assert_eq!(mine.len(), 4);
            assert!(mine.iter().all(|t| t.user_id == *owner));
        }
        assert!(list_todos(&repo, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        for title in ["first", "second", "third"] {
            create_todo(&repo, owner, create_req(title)).await.unwrap();
        }
        let titles: Vec<String> = list_todos(&repo, owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        let todo = create_todo(&repo, owner, create_req("Buy milk")).await.unwrap();
        let err = update_todo(&repo, todo.id, owner, TodoPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn patch_touches_only_present_fields() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        let todo = create_todo(
            &repo,
            owner,
            CreateTodoRequest {
                title: "Buy milk".into(),
                description: Some("skimmed".into()),
            },
        )
        .await
        .unwrap();
        let updated = update_todo(
            &repo,
            todo.id,
            owner,
            TodoPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.description.as_deref(), Some("skimmed"));
        assert_eq!(updated.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn patch_with_short_title_is_rejected() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        let todo = create_todo(&repo, owner, create_req("Buy milk")).await.unwrap();
        let patch = TodoPatch {
            title: Some("no".into()),
            ..Default::default()
        };
        assert!(matches!(
            update_todo(&repo, todo.id, owner, patch).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn foreign_todo_is_not_found_for_update_and_delete() {
        let repo = MemoryTodoRepo::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let todo = create_todo(&repo, alice, create_req("Alice's")).await.unwrap();

        let patch = TodoPatch {
            completed: Some(true),
            ..Default::default()
        };
        let err = update_todo(&repo, todo.id, bob, patch).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete_todo(&repo, todo.id, bob).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let missing = update_todo(
            &repo,
            Uuid::new_v4(),
            bob,
            TodoPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(missing.to_string(), "Todo not found");

        let still = list_todos(&repo, alice).await.unwrap();
        assert_eq!(still.len(), 1);
        assert!(!still[0].completed);
    }

    #[tokio::test]
    async fn delete_removes_row_once() {
        let repo = MemoryTodoRepo::default();
        let owner = Uuid::new_v4();
        let todo = create_todo(&repo, owner, create_req("Buy milk")).await.unwrap();
        delete_todo(&repo, todo.id, owner).await.unwrap();
        assert!(matches!(
            delete_todo(&repo, todo.id, owner).await,
            Err(AppError::NotFound(_))
        ));
    }
}
