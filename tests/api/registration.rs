use crate::helpers::{
    fill_form, spawn_app, spawn_outbound_app, submit_form, type_code, TEST_EMAIL, TEST_PHONE,
};
use signup_flow::domain::ContactType;
use signup_flow::flows::otp::{OtpError, VerifyOutcome};
use signup_flow::flows::registration::RegistrationField;
use signup_flow::flows::RegistrationPhase;

#[tokio::test]
async fn phone_registration_completes_with_demo_code() {
    let app = spawn_app();
    let form = app.form();
    fill_form(form, ContactType::Phone, TEST_PHONE);

    let verifier = submit_form(form).await;
    assert_eq!(form.phase(), RegistrationPhase::AwaitingOtp);
    assert_eq!(verifier.destination().get(), TEST_PHONE);

    type_code(&verifier, "123456");
    match verifier.verify().await.expect("Verification failed") {
        VerifyOutcome::Verified(account) => {
            assert_eq!(account.contact.contact_type(), ContactType::Phone)
        }
        VerifyOutcome::Ignored => panic!("Verification was ignored"),
    }
    assert_eq!(form.phase(), RegistrationPhase::Verified);
}

#[tokio::test]
async fn wrong_code_can_be_retried_after_resend() {
    let app = spawn_app();
    let form = app.form();
    fill_form(form, ContactType::Email, TEST_EMAIL);
    let verifier = submit_form(form).await;

    type_code(&verifier, "000000");
    assert!(matches!(verifier.verify().await, Err(OtpError::Mismatch)));
    assert_eq!(verifier.digits().to_string(), "000000");

    let issued = verifier.resend().await.expect("Resend failed");
    assert!(issued.is_some());
    assert!(verifier.digits().is_empty());
    assert!(verifier.error().is_none());

    type_code(&verifier, "123456");
    assert!(matches!(
        verifier.verify().await,
        Ok(VerifyOutcome::Verified(_))
    ));
}

#[tokio::test]
async fn invalid_form_never_reaches_the_code_step() {
    let app = spawn_app();
    let form = app.form();
    fill_form(form, ContactType::Email, "not-an-email");

    let err = form.submit().await.expect_err("Submit should fail");
    let errors = err.validation_errors().expect("Expected field errors");
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec![RegistrationField::Contact]);
    assert_eq!(form.phase(), RegistrationPhase::Idle);
    assert!(form.verifier().is_none());
}

#[tokio::test]
async fn shutdown_closes_the_code_step() {
    let app = spawn_app();
    let form = app.form();
    fill_form(form, ContactType::Phone, TEST_PHONE);
    let verifier = submit_form(form).await;

    app.shutdown();
    type_code(&verifier, "123456");
    assert!(verifier.digits().is_empty());
    assert!(matches!(verifier.verify().await, Ok(VerifyOutcome::Ignored)));
}

#[tokio::test]
async fn outbound_code_locks_after_too_many_misses() {
    let app = spawn_outbound_app(2);
    fill_form(&app.form, ContactType::Phone, TEST_PHONE);
    let verifier = submit_form(&app.form).await;
    let code = app.last_code();
    let wrong: String = code
        .chars()
        .map(|c| if c == '9' { '0' } else { '9' })
        .collect();

    type_code(&verifier, &wrong);
    assert!(matches!(verifier.verify().await, Err(OtpError::Mismatch)));
    let err = verifier.verify().await.expect_err("Second miss should fail");
    assert!(matches!(err, OtpError::TooManyAttempts));
    assert!(err.requires_resend());

    verifier.resend().await.expect("Resend failed");
    type_code(&verifier, &app.last_code());
    assert!(matches!(
        verifier.verify().await,
        Ok(VerifyOutcome::Verified(_))
    ));
    assert_eq!(app.sms.send_count(), 2);
}
