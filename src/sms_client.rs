use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::utils::{lock_state, mask_contact};

#[async_trait]
pub trait GenericSmsService: Send + Sync {
    async fn send_sms(&self, to: &str, body: String) -> Result<(), anyhow::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// Logs instead of sending and keeps an outbox so a driver can read the code back.
#[derive(Debug, Default)]
pub struct DummySmsClient {
    send_count: AtomicU64,
    outbox: Mutex<Vec<SentSms>>,
}

impl DummySmsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<SentSms> {
        lock_state(&self.outbox).last().cloned()
    }
}

#[async_trait]
impl GenericSmsService for DummySmsClient {
    async fn send_sms(&self, to: &str, body: String) -> Result<(), anyhow::Error> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            to = %mask_contact(to),
            body_length = %body.len(),
            "[DUMMY] SMS would be sent"
        );
        lock_state(&self.outbox).push(SentSms {
            to: to.to_string(),
            body,
        });
        Ok(())
    }
}
