use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentryError>;

#[derive(Error, Debug)]
pub enum SentryError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Rule compilation failed in {file}: {message}")]
    Compilation { file: String, message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scan failed for {path}: {message}")]
    Scan { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SentryError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
