use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("IO error: {path}\nreason: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required config value '{key}' for stack '{stack}'")]
    MissingConfig { key: String, stack: String },

    #[error("Missing required secret '{key}' for stack '{stack}'")]
    MissingSecret { key: String, stack: String },

    #[error("Invalid output reference '{0}': expected <resource>.<field>")]
    InvalidOutputRef(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, StackError>;
