use thiserror::Error;

/// Failures while turning configuration into live store handles.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("required setting `{0}` is missing or empty")]
    MissingSetting(&'static str),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("{0} store is not configured")]
    Unconfigured(&'static str),

    #[error("unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("environment variable `{var}` referenced in configuration is not set")]
    Env { var: String },

    #[error(transparent)]
    Relational(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Document(#[from] mongodb::error::Error),

    #[error(transparent)]
    Cache(#[from] redis::RedisError),

    #[error("message bus: {0}")]
    Bus(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
