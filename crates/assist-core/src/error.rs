use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("recipe named '{0}' already exists")]
    RecipeExists(String),

    #[error("recipe not found: {0}")]
    RecipeNotFound(String),

    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AssistError>;
