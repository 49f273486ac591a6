use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidSetting { key: &'static str, message: String },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
