use super::schemas::ValidationErrors;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    Service(String, #[source] anyhow::Error),
    #[error("Registration was dismissed before the request completed")]
    Cancelled,
}

impl std::fmt::Debug for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl RegistrationError {
    /// Field errors when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            RegistrationError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Service failures can be retried without editing the form.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistrationError::Service(_, _))
    }
}
