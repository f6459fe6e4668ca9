use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] quotemerge_core::ValidationError),

    #[error(transparent)]
    Configuration(#[from] quotemerge_core::ConfigurationError),

    #[error("failed to read '{}': {source}", path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}' is not valid input: {message}", path.display())]
    MalformedInput { path: PathBuf, message: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::MalformedInput { .. } => 2,
            Self::Configuration(_) => 3,
            Self::Serialization(_) => 4,
            Self::Input { .. } => 10,
        }
    }
}
