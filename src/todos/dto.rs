use serde::Deserialize;

/// Minimum title length, in characters.
pub const MIN_TITLE_LEN: usize = 3;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Sparse update. `None` (absent or `null`) leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

pub(crate) fn title_is_valid(title: &str) -> bool {
    title.chars().count() >= MIN_TITLE_LEN
}
