#[cfg(test)]
pub mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use secrecy::SecretString;
    use tokio_util::sync::CancellationToken;

    use crate::account_client::{AccountService, DummyAccountClient};
    use crate::constants::DEMO_OTP;
    use crate::delivery_client::{CodeDeliveryService, DummyCodeDelivery};
    use crate::domain::ContactType;
    use crate::flows::otp::OtpVerifier;
    use crate::flows::registration::{FieldUpdate, RegistrationForm, SubmitOutcome};

    pub const DUMMY_PHONE: &str = "+12345678901";
    pub const DUMMY_PASSWORD: &str = "Abcd123!";

    pub fn get_dummy_form_with(
        delivery: Arc<dyn CodeDeliveryService>,
        accounts: Arc<dyn AccountService>,
    ) -> RegistrationForm {
        RegistrationForm::new(delivery, accounts, CancellationToken::new())
    }

    /// Form whose collaborators answer immediately and accept `code`.
    pub fn get_dummy_form(code: &str) -> RegistrationForm {
        get_dummy_form_with(
            Arc::new(DummyCodeDelivery::instant(code)),
            Arc::new(DummyAccountClient::new(Duration::ZERO)),
        )
    }

    /// Form with the demo round-trip latencies, for tests that pause time.
    pub fn get_slow_dummy_form() -> RegistrationForm {
        get_dummy_form_with(
            Arc::new(DummyCodeDelivery::new(
                SecretString::from(DEMO_OTP.to_string()),
                Duration::from_millis(1500),
                Duration::from_millis(1000),
            )),
            Arc::new(DummyAccountClient::new(Duration::ZERO)),
        )
    }

    pub fn fill_valid_phone_input(form: &RegistrationForm) {
        form.update_field(FieldUpdate::ContactType(ContactType::Phone));
        form.update_field(FieldUpdate::Contact(DUMMY_PHONE.to_string()));
        form.update_field(FieldUpdate::Password(DUMMY_PASSWORD.to_string()));
        form.update_field(FieldUpdate::ConfirmPassword(DUMMY_PASSWORD.to_string()));
        form.update_field(FieldUpdate::AcceptedTerms(true));
        form.update_field(FieldUpdate::HumanVerified(true));
    }

    pub async fn open_otp_step(form: &RegistrationForm) -> OtpVerifier {
        fill_valid_phone_input(form);
        match form.submit().await {
            Ok(SubmitOutcome::OtpRequested(verifier)) => verifier,
            other => panic!("Expected the passcode step to open, got {:?}", other),
        }
    }

    pub fn enter_code(verifier: &OtpVerifier, code: &str) {
        for (index, c) in code.chars().enumerate() {
            verifier.set_digit(index, &c.to_string());
        }
    }
}
