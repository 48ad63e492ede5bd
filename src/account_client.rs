use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::ContactIdentifier;
use crate::flows::registration::CreateAccountRequest;
use crate::utils::{error_chain_fmt, lock_state, mask_contact, simulate_latency};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAccount {
    pub account_id: Uuid,
    pub contact: ContactIdentifier,
    pub created_at: DateTime<Utc>,
}

#[derive(thiserror::Error)]
pub enum AccountServiceError {
    #[error("{0} is already registered")]
    ContactAlreadyRegistered(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AccountServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<CreatedAccount, AccountServiceError>;
}

/// Keeps registered contacts in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct DummyAccountClient {
    latency: Duration,
    registered: Mutex<HashSet<ContactIdentifier>>,
}

impl DummyAccountClient {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            registered: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_registered(&self, contact: &ContactIdentifier) -> bool {
        lock_state(&self.registered).contains(contact)
    }
}

#[async_trait]
impl AccountService for DummyAccountClient {
    #[tracing::instrument(name = "Create account", skip(self, request), fields(contact = %mask_contact(request.contact.as_ref())))]
    async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<CreatedAccount, AccountServiceError> {
        simulate_latency(self.latency).await;
        if !lock_state(&self.registered).insert(request.contact.clone()) {
            return Err(AccountServiceError::ContactAlreadyRegistered(
                request.contact.contact_type().noun().to_string(),
            ));
        }
        let account = CreatedAccount {
            account_id: Uuid::new_v4(),
            contact: request.contact.clone(),
            created_at: Utc::now(),
        };
        tracing::info!(account_id = %account.account_id, "Account created");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountService, AccountServiceError, DummyAccountClient};
    use crate::domain::{ContactIdentifier, ContactType};
    use crate::flows::registration::CreateAccountRequest;
    use secrecy::SecretString;
    use std::time::Duration;

    #[tokio::test]
    async fn test_contact_can_only_register_once() {
        let client = DummyAccountClient::new(Duration::ZERO);
        let request = CreateAccountRequest {
            contact: ContactIdentifier::parse(ContactType::Email, "user@example.com").unwrap(),
            password: SecretString::from("Passw0rd!".to_string()),
        };
        let account = client.create_account(&request).await.unwrap();
        assert_eq!(account.contact.get(), "user@example.com");
        assert!(client.is_registered(&request.contact));

        let err = client.create_account(&request).await.unwrap_err();
        assert!(matches!(err, AccountServiceError::ContactAlreadyRegistered(_)));
        assert_eq!(err.to_string(), "Email is already registered");
    }
}
