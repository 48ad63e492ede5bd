use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::account_client::{AccountService, DummyAccountClient};
use crate::commands::run_console;
use crate::configuration::{DeliveryKind, EmailClientSettings, Settings};
use crate::delivery_client::{CodeDeliveryService, DummyCodeDelivery, OutboundCodeDelivery};
use crate::email_client::{GenericEmailService, SmtpEmailClient};
use crate::errors::StartupError;
use crate::flows::RegistrationForm;
use crate::sms_client::DummySmsClient;

pub struct Application {
    form: RegistrationForm,
    shutdown: CancellationToken,
}

impl Application {
    #[tracing::instrument(name = "Build application", skip(configuration), fields(delivery = ?configuration.delivery.kind))]
    pub fn build(configuration: &Settings) -> Result<Self, StartupError> {
        let shutdown = CancellationToken::new();
        let delivery = get_delivery_client(configuration)?;
        let accounts: Arc<dyn AccountService> =
            Arc::new(DummyAccountClient::new(configuration.account.latency()));
        let form = RegistrationForm::new(delivery, accounts, shutdown.child_token());
        Ok(Self { form, shutdown })
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    /// Abandons every pending call of every session.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        let reader = tokio::io::BufReader::new(tokio::io::stdin());
        let result = run_console(&self.form, reader, tokio::io::stdout()).await;
        self.shutdown();
        result
    }
}

pub fn get_email_client(
    settings: &EmailClientSettings,
) -> Result<Arc<dyn GenericEmailService>, StartupError> {
    let client = SmtpEmailClient::new(settings).map_err(StartupError::EmailClientError)?;
    Ok(Arc::new(client))
}

pub fn get_delivery_client(
    configuration: &Settings,
) -> Result<Arc<dyn CodeDeliveryService>, StartupError> {
    let delivery = &configuration.delivery;
    let client: Arc<dyn CodeDeliveryService> = match delivery.kind {
        DeliveryKind::Demo => Arc::new(DummyCodeDelivery::new(
            delivery.demo_code.clone(),
            delivery.dispatch_latency(),
            delivery.check_latency(),
        )),
        DeliveryKind::Outbound => Arc::new(OutboundCodeDelivery::new(
            get_email_client(&configuration.email_client)?,
            Arc::new(DummySmsClient::new()),
            configuration.otp.ttl(),
            configuration.otp.max_attempts,
        )),
    };
    Ok(client)
}
