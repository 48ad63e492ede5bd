use crate::account_client::AccountServiceError;
use crate::delivery_client::DeliveryError;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum OtpError {
    #[error("Please enter complete OTP")]
    Incomplete,
    #[error("Invalid OTP. Please try again.")]
    Mismatch,
    #[error("OTP has expired. Please request a new code.")]
    Expired,
    #[error("Too many incorrect attempts. Please request a new code.")]
    TooManyAttempts,
    #[error("{0} is already registered")]
    ContactTaken(String),
    #[error("{0}")]
    Service(String, #[source] anyhow::Error),
    #[error("Verification was dismissed before the request completed")]
    Cancelled,
}

impl std::fmt::Debug for OtpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl OtpError {
    /// The entered code can no longer succeed; only a resend helps.
    pub fn requires_resend(&self) -> bool {
        matches!(self, OtpError::Expired | OtpError::TooManyAttempts)
    }
}

impl From<DeliveryError> for OtpError {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::UnknownHandle => OtpError::Expired,
            e => OtpError::Service("Failed to verify the code".to_string(), e.into()),
        }
    }
}

impl From<AccountServiceError> for OtpError {
    fn from(e: AccountServiceError) -> Self {
        match e {
            AccountServiceError::ContactAlreadyRegistered(noun) => OtpError::ContactTaken(noun),
            e => OtpError::Service("Failed to create the account".to_string(), e.into()),
        }
    }
}
