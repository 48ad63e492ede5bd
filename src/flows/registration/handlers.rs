use anyhow::anyhow;
use secrecy::SecretString;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::errors::RegistrationError;
use super::schemas::{
    CreateAccountRequest, FieldUpdate, PasswordStrength, RegistrationInput, ValidationErrors,
};
use super::utils::{compute_strength, passwords_match, validate};
use crate::account_client::AccountService;
use crate::delivery_client::CodeDeliveryService;
use crate::domain::ContactIdentifier;
use crate::flows::otp::OtpVerifier;
use crate::flows::schemas::{PhaseTracker, RegistrationPhase};
use crate::utils::{lock_state, mask_contact};

struct FormState {
    input: RegistrationInput,
    errors: ValidationErrors,
    verifier: Option<OtpVerifier>,
    session: CancellationToken,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// A submission is already running or the form has moved past its first step.
    Ignored,
    OtpRequested(OtpVerifier),
}

/// First step of registration: field buffers, validation and code request.
///
/// A handle over shared state, so a clone can be given to the event source
/// while another drives `submit`. Overlapping calls never run twice.
#[derive(Clone)]
pub struct RegistrationForm {
    state: Arc<Mutex<FormState>>,
    phase: PhaseTracker,
    delivery: Arc<dyn CodeDeliveryService>,
    accounts: Arc<dyn AccountService>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("RegistrationForm")
            .field("input", &state.input)
            .field("errors", &state.errors)
            .field("phase", &self.phase.get())
            .finish()
    }
}

impl RegistrationForm {
    /// `shutdown` ends every session of this form when cancelled.
    pub fn new(
        delivery: Arc<dyn CodeDeliveryService>,
        accounts: Arc<dyn AccountService>,
        shutdown: CancellationToken,
    ) -> Self {
        let session = shutdown.child_token();
        Self {
            state: Arc::new(Mutex::new(FormState {
                input: RegistrationInput::default(),
                errors: ValidationErrors::default(),
                verifier: None,
                session,
            })),
            phase: PhaseTracker::default(),
            delivery,
            accounts,
            shutdown,
        }
    }

    pub fn input(&self) -> RegistrationInput {
        lock_state(&self.state).input.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        lock_state(&self.state).errors.clone()
    }

    pub fn strength(&self) -> PasswordStrength {
        compute_strength(&lock_state(&self.state).input.password)
    }

    pub fn passwords_match(&self) -> bool {
        let state = lock_state(&self.state);
        passwords_match(&state.input.password, &state.input.confirm_password)
    }

    pub fn phase(&self) -> RegistrationPhase {
        self.phase.get()
    }

    pub fn is_loading(&self) -> bool {
        self.phase.get().is_busy()
    }

    /// The open passcode step, if any.
    pub fn verifier(&self) -> Option<OtpVerifier> {
        match self.phase.get() {
            RegistrationPhase::AwaitingOtp | RegistrationPhase::VerifyingOtp => {
                lock_state(&self.state).verifier.clone()
            }
            _ => None,
        }
    }

    /// Sets one field and drops that field's error. Nothing is revalidated
    /// until the next submit.
    pub fn update_field(&self, update: FieldUpdate) {
        let field = update.field();
        tracing::debug!(field = %field, "Field updated");
        let mut state = lock_state(&self.state);
        state.input.apply(update);
        state.errors.remove(field);
    }

    #[tracing::instrument(name = "Submit registration", skip(self), fields(contact = tracing::field::Empty))]
    pub async fn submit(&self) -> Result<SubmitOutcome, RegistrationError> {
        let (request, session) = {
            let mut state = lock_state(&self.state);
            if self.phase.get() != RegistrationPhase::Idle {
                tracing::debug!(phase = %self.phase.get(), "Submit ignored");
                return Ok(SubmitOutcome::Ignored);
            }
            let errors = validate(&state.input);
            if !errors.is_empty() {
                tracing::info!(fields = %errors.len(), "Registration input rejected");
                state.errors = errors.clone();
                return Err(RegistrationError::Validation(errors));
            }
            let contact = ContactIdentifier::parse(state.input.contact_type, &state.input.contact)
                .map_err(|e| RegistrationError::Service(e.clone(), anyhow!(e)))?;
            if !self
                .phase
                .transition(RegistrationPhase::Idle, RegistrationPhase::Submitting)
            {
                return Ok(SubmitOutcome::Ignored);
            }
            state.errors = ValidationErrors::default();
            let request = CreateAccountRequest {
                contact,
                password: SecretString::from(state.input.password.clone()),
            };
            (request, state.session.clone())
        };
        tracing::Span::current().record(
            "contact",
            tracing::field::display(mask_contact(request.contact.as_ref())),
        );

        let issued = tokio::select! {
            _ = session.cancelled() => return Err(RegistrationError::Cancelled),
            issued = self.delivery.issue_code(&request.contact) => issued,
        };

        let mut state = lock_state(&self.state);
        if session.is_cancelled() {
            tracing::info!("Submission result discarded");
            return Err(RegistrationError::Cancelled);
        }
        match issued {
            Ok(handle) => {
                let verifier = OtpVerifier::new(
                    request,
                    handle,
                    self.phase.clone(),
                    self.delivery.clone(),
                    self.accounts.clone(),
                    session,
                );
                state.verifier = Some(verifier.clone());
                self.phase.set(RegistrationPhase::AwaitingOtp);
                Ok(SubmitOutcome::OtpRequested(verifier))
            }
            Err(e) => {
                tracing::error!("Failed to request a verification code: {:?}", e);
                self.phase.set(RegistrationPhase::Idle);
                Err(RegistrationError::Service(
                    "Failed to send the verification code. Please try again.".to_string(),
                    e.into(),
                ))
            }
        }
    }

    /// Tears down the current session: pending calls are abandoned, the
    /// passcode step is dropped and the form returns to `Idle` with its
    /// field values kept. A verified form stays `Verified`.
    pub fn dismiss(&self) {
        let mut state = lock_state(&self.state);
        state.session.cancel();
        state.session = self.shutdown.child_token();
        state.verifier = None;
        if self.phase.get() != RegistrationPhase::Verified {
            self.phase.set(RegistrationPhase::Idle);
        }
        tracing::info!(phase = %self.phase.get(), "Registration session dismissed");
    }
}
