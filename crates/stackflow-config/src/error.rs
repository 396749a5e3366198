use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Stack file not found. Looked in:\n\
        - current directory: stack.local.kdl, .stack.local.kdl, stack.kdl, .stack.kdl\n\
        - ./.stackflow/ directory\n\
        - ~/.config/stackflow/stack.kdl\n\
        Set STACKFLOW_FILE to point at a stack file directly"
    )]
    StackFileNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config value '{key}' in {path} must be a string, number or boolean")]
    InvalidValue { key: String, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
