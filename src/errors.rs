use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum StartupError {
    #[error("Failed to read configuration")]
    ConfigurationError(#[from] config::ConfigError),
    #[error("Failed to set up the email client")]
    EmailClientError(#[source] anyhow::Error),
}

impl std::fmt::Debug for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Missing value for {0}")]
    MissingValue(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
