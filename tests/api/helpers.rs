use once_cell::sync::Lazy;
use secrecy::SecretString;
use signup_flow::{
    account_client::DummyAccountClient,
    configuration::{
        AccountSettings, DeliveryKind, DeliverySettings, EmailClientSettings, OtpSettings,
        Settings,
    },
    delivery_client::OutboundCodeDelivery,
    domain::ContactType,
    email_client::DummyEmailClient,
    flows::{
        otp::OtpVerifier,
        registration::{FieldUpdate, SubmitOutcome},
        RegistrationForm,
    },
    sms_client::DummySmsClient,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    let test_log = std::env::var("TEST_LOG")
        .map(|value| value == "true")
        .unwrap_or(false);
    if test_log {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub const TEST_PHONE: &str = "+12345678901";
pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_PASSWORD: &str = "Abcd123!";

pub fn get_test_configuration() -> Settings {
    Settings {
        delivery: DeliverySettings {
            kind: DeliveryKind::Demo,
            demo_code: SecretString::from("123456".to_string()),
            dispatch_latency_ms: 0,
            check_latency_ms: 0,
        },
        otp: OtpSettings {
            ttl_seconds: 300,
            max_attempts: 5,
        },
        account: AccountSettings { latency_ms: 0 },
        email_client: EmailClientSettings {
            base_url: "smtp.example.com".to_string(),
            username: "mailer".to_string(),
            password: SecretString::from("password".to_string()),
            sender_email: "no-reply@example.com".to_string(),
        },
    }
}

pub fn spawn_app() -> Application {
    Lazy::force(&TRACING);
    Application::build(&get_test_configuration()).expect("Failed to build application.")
}

pub struct OutboundApp {
    pub form: RegistrationForm,
    pub sms: Arc<DummySmsClient>,
}

impl OutboundApp {
    /// Digits of the last code sent by SMS.
    pub fn last_code(&self) -> String {
        let message = self.sms.last_message().expect("No SMS was sent");
        message
            .body
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(6)
            .collect()
    }
}

pub fn spawn_outbound_app(max_attempts: u32) -> OutboundApp {
    Lazy::force(&TRACING);
    let sms = Arc::new(DummySmsClient::new());
    let delivery = Arc::new(OutboundCodeDelivery::new(
        Arc::new(DummyEmailClient::new()),
        sms.clone(),
        chrono::Duration::minutes(5),
        max_attempts,
    ));
    let form = RegistrationForm::new(
        delivery,
        Arc::new(DummyAccountClient::new(Duration::ZERO)),
        CancellationToken::new(),
    );
    OutboundApp { form, sms }
}

pub fn fill_form(form: &RegistrationForm, contact_type: ContactType, contact: &str) {
    form.update_field(FieldUpdate::ContactType(contact_type));
    form.update_field(FieldUpdate::Contact(contact.to_string()));
    form.update_field(FieldUpdate::Password(TEST_PASSWORD.to_string()));
    form.update_field(FieldUpdate::ConfirmPassword(TEST_PASSWORD.to_string()));
    form.update_field(FieldUpdate::AcceptedTerms(true));
    form.update_field(FieldUpdate::HumanVerified(true));
}

pub async fn submit_form(form: &RegistrationForm) -> OtpVerifier {
    match form.submit().await.expect("Submit failed") {
        SubmitOutcome::OtpRequested(verifier) => verifier,
        SubmitOutcome::Ignored => panic!("Submit was ignored"),
    }
}

pub fn type_code(verifier: &OtpVerifier, code: &str) {
    for (index, c) in code.chars().enumerate() {
        verifier.set_digit(index, &c.to_string());
    }
}
