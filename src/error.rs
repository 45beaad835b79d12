use thiserror::Error;

pub type Result<T> = std::result::Result<T, KaizenError>;

#[derive(Error, Debug)]
pub enum KaizenError {
    #[error("Rule already registered: {0}")]
    DuplicateRule(String),

    #[error("Unknown rule id in config: {0}")]
    UnknownRule(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config store error for institution {institution_id}: {message}")]
    ConfigStore {
        institution_id: String,
        message: String,
    },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl KaizenError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
