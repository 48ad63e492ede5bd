use config::{self, ConfigError, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use crate::constants::CONFIGURATION_FILE;
use crate::domain::{ContactIdentifier, ContactType};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub delivery: DeliverySettings,
    pub otp: OtpSettings,
    pub account: AccountSettings,
    pub email_client: EmailClientSettings,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    Demo,
    Outbound,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliverySettings {
    pub kind: DeliveryKind,
    pub demo_code: SecretString,
    pub dispatch_latency_ms: u64,
    pub check_latency_ms: u64,
}

impl DeliverySettings {
    pub fn dispatch_latency(&self) -> Duration {
        Duration::from_millis(self.dispatch_latency_ms)
    }

    pub fn check_latency(&self) -> Duration {
        Duration::from_millis(self.check_latency_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OtpSettings {
    pub ttl_seconds: i64,
    pub max_attempts: u32,
}

impl OtpSettings {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccountSettings {
    pub latency_ms: u64,
}

impl AccountSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub username: String,
    pub password: SecretString,
    pub sender_email: String,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<ContactIdentifier, String> {
        ContactIdentifier::parse(ContactType::Email, &self.sender_email)
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");
    let builder = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join(CONFIGURATION_FILE),
        ))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    builder.try_deserialize::<Settings>()
}
