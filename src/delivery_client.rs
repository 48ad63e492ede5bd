use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::constants::OTP_LENGTH;
use crate::domain::{ContactIdentifier, ContactType};
use crate::email_client::GenericEmailService;
use crate::sms_client::GenericSmsService;
use crate::utils::{error_chain_fmt, generate_otp, lock_state, mask_contact, simulate_latency};

/// Reference to a code that was sent to a contact. The code itself never leaves
/// the delivery service.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceHandle {
    pub id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Matched,
    Mismatched,
    Expired,
    AttemptsExhausted,
}

#[derive(thiserror::Error)]
pub enum DeliveryError {
    #[error("No code was issued for this request")]
    UnknownHandle,
    #[error("Failed to deliver the code to {0}")]
    TransportError(String, #[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait CodeDeliveryService: Send + Sync {
    async fn issue_code(&self, contact: &ContactIdentifier)
        -> Result<IssuanceHandle, DeliveryError>;

    async fn check_code(
        &self,
        handle: &IssuanceHandle,
        code: &SecretString,
    ) -> Result<CodeCheck, DeliveryError>;
}

/// Compares two codes without short-circuiting on the first differing byte.
pub fn codes_match(expected: &str, submitted: &str) -> bool {
    if expected.len() != submitted.len() {
        return false;
    }
    expected
        .bytes()
        .zip(submitted.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Pretends to send a fixed code. Every issuance accepts the same code and
/// nothing expires.
pub struct DummyCodeDelivery {
    code: SecretString,
    dispatch_latency: Duration,
    check_latency: Duration,
}

impl DummyCodeDelivery {
    pub fn new(code: SecretString, dispatch_latency: Duration, check_latency: Duration) -> Self {
        Self {
            code,
            dispatch_latency,
            check_latency,
        }
    }

    pub fn instant(code: &str) -> Self {
        Self::new(SecretString::from(code.to_string()), Duration::ZERO, Duration::ZERO)
    }
}

#[async_trait]
impl CodeDeliveryService for DummyCodeDelivery {
    #[tracing::instrument(name = "Issue demo code", skip(self, contact), fields(contact = %mask_contact(contact.as_ref())))]
    async fn issue_code(
        &self,
        contact: &ContactIdentifier,
    ) -> Result<IssuanceHandle, DeliveryError> {
        simulate_latency(self.dispatch_latency).await;
        tracing::info!("Demo code issued");
        Ok(IssuanceHandle {
            id: Uuid::new_v4(),
            expires_at: None,
        })
    }

    #[tracing::instrument(name = "Check demo code", skip(self, code), fields(handle = %handle.id))]
    async fn check_code(
        &self,
        handle: &IssuanceHandle,
        code: &SecretString,
    ) -> Result<CodeCheck, DeliveryError> {
        simulate_latency(self.check_latency).await;
        if codes_match(self.code.expose_secret(), code.expose_secret()) {
            Ok(CodeCheck::Matched)
        } else {
            Ok(CodeCheck::Mismatched)
        }
    }
}

struct IssuedCode {
    code: SecretString,
    expires_at: DateTime<Utc>,
    failed_attempts: u32,
}

/// Generates a random code per issuance and sends it over email or SMS.
/// Codes expire after `ttl`, lock after `max_attempts` misses and are
/// consumed once matched.
pub struct OutboundCodeDelivery {
    email_client: Arc<dyn GenericEmailService>,
    sms_client: Arc<dyn GenericSmsService>,
    ttl: chrono::Duration,
    max_attempts: u32,
    issued: Mutex<HashMap<Uuid, IssuedCode>>,
}

impl OutboundCodeDelivery {
    pub fn new(
        email_client: Arc<dyn GenericEmailService>,
        sms_client: Arc<dyn GenericSmsService>,
        ttl: chrono::Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            email_client,
            sms_client,
            ttl,
            max_attempts,
            issued: Mutex::new(HashMap::new()),
        }
    }

    pub fn outstanding(&self) -> usize {
        lock_state(&self.issued).len()
    }

    fn message_body(&self, code: &str) -> String {
        format!(
            "Your verification code is {}. It expires in {} minutes.",
            code,
            self.ttl.num_minutes().max(1)
        )
    }

    async fn send(&self, contact: &ContactIdentifier, code: &str) -> Result<(), anyhow::Error> {
        let body = self.message_body(code);
        match contact.contact_type() {
            ContactType::Email => {
                self.email_client
                    .send_text_email(contact.as_ref(), "Your verification code", body)
                    .await
            }
            ContactType::Phone => self.sms_client.send_sms(contact.as_ref(), body).await,
        }
    }
}

#[async_trait]
impl CodeDeliveryService for OutboundCodeDelivery {
    #[tracing::instrument(name = "Issue verification code", skip(self, contact), fields(contact = %mask_contact(contact.as_ref())))]
    async fn issue_code(
        &self,
        contact: &ContactIdentifier,
    ) -> Result<IssuanceHandle, DeliveryError> {
        let now = Utc::now();
        let code = generate_otp(OTP_LENGTH);
        let handle = IssuanceHandle {
            id: Uuid::new_v4(),
            expires_at: Some(now + self.ttl),
        };

        {
            let mut issued = lock_state(&self.issued);
            issued.retain(|_, entry| entry.expires_at > now);
            issued.insert(
                handle.id,
                IssuedCode {
                    code: SecretString::from(code.clone()),
                    expires_at: now + self.ttl,
                    failed_attempts: 0,
                },
            );
        }

        if let Err(e) = self.send(contact, &code).await {
            lock_state(&self.issued).remove(&handle.id);
            tracing::error!("Failed to deliver verification code: {:?}", e);
            return Err(DeliveryError::TransportError(
                mask_contact(contact.as_ref()),
                e,
            ));
        }
        tracing::info!(handle = %handle.id, "Verification code sent");
        Ok(handle)
    }

    #[tracing::instrument(name = "Check verification code", skip(self, code), fields(handle = %handle.id))]
    async fn check_code(
        &self,
        handle: &IssuanceHandle,
        code: &SecretString,
    ) -> Result<CodeCheck, DeliveryError> {
        let mut issued = lock_state(&self.issued);
        let entry = issued
            .get_mut(&handle.id)
            .ok_or(DeliveryError::UnknownHandle)?;

        if entry.expires_at <= Utc::now() {
            issued.remove(&handle.id);
            return Ok(CodeCheck::Expired);
        }
        if entry.failed_attempts >= self.max_attempts {
            return Ok(CodeCheck::AttemptsExhausted);
        }
        if codes_match(entry.code.expose_secret(), code.expose_secret()) {
            issued.remove(&handle.id);
            return Ok(CodeCheck::Matched);
        }
        entry.failed_attempts += 1;
        tracing::warn!(attempts = entry.failed_attempts, "Verification code mismatch");
        if entry.failed_attempts >= self.max_attempts {
            Ok(CodeCheck::AttemptsExhausted)
        } else {
            Ok(CodeCheck::Mismatched)
        }
    }
}
