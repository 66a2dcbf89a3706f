use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StnoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize entry: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Could not allocate a unique name for '{prefix}' in {dir} after {attempts} attempts")]
    Exhausted {
        dir: PathBuf,
        prefix: String,
        attempts: usize,
    },

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid entry identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Aborting due to no changes.")]
    Unchanged,

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, StnoError>;
