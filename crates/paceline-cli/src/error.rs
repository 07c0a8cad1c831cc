use paceline_core::{ApiError, ConfigError, ErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("[{code}] {source}", code = .source.code())]
    Api {
        #[from]
        source: ApiError,
    },

    #[error("background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Api { source } => match source.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::Authentication => 3,
                ErrorKind::NotFound => 4,
                ErrorKind::Api => 5,
                ErrorKind::Network => 6,
            },
            Self::Serialization(_) => 7,
            Self::Task(_) => 10,
        }
    }
}
