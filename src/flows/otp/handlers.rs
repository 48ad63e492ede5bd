use secrecy::SecretString;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::errors::OtpError;
use super::schemas::{CodeIssued, FocusSlot, OtpDigits, VerifyOutcome};
use super::utils::{code_check_result, is_digit_input};
use crate::account_client::{AccountService, CreatedAccount};
use crate::constants::OTP_LENGTH;
use crate::delivery_client::{CodeDeliveryService, IssuanceHandle};
use crate::domain::ContactIdentifier;
use crate::flows::registration::CreateAccountRequest;
use crate::flows::schemas::{PhaseTracker, RegistrationPhase};
use crate::utils::{lock_state, mask_contact};

struct OtpState {
    digits: OtpDigits,
    error: Option<String>,
    handle: IssuanceHandle,
    // Bumped by every resend so an older resend cannot overwrite a newer handle.
    generation: u64,
    in_flight: Option<CancellationToken>,
    // Digits already matched against `handle`. A retry with the same digits
    // only repeats account creation since the code may have been consumed.
    confirmed: Option<OtpDigits>,
}

/// Second step of registration: collects the passcode and confirms it.
///
/// Cheap to clone; every clone drives the same step. Created by
/// [`crate::flows::RegistrationForm::submit`] and inert once the form session
/// is dismissed.
#[derive(Clone)]
pub struct OtpVerifier {
    state: Arc<Mutex<OtpState>>,
    request: Arc<CreateAccountRequest>,
    phase: PhaseTracker,
    delivery: Arc<dyn CodeDeliveryService>,
    accounts: Arc<dyn AccountService>,
    session: CancellationToken,
}

impl std::fmt::Debug for OtpVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpVerifier")
            .field("destination", &mask_contact(self.request.contact.as_ref()))
            .field("digits", &self.digits().to_string())
            .field("phase", &self.phase.get())
            .finish()
    }
}

impl OtpVerifier {
    pub(crate) fn new(
        request: CreateAccountRequest,
        handle: IssuanceHandle,
        phase: PhaseTracker,
        delivery: Arc<dyn CodeDeliveryService>,
        accounts: Arc<dyn AccountService>,
        session: CancellationToken,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(OtpState {
                digits: OtpDigits::default(),
                error: None,
                handle,
                generation: 0,
                in_flight: None,
                confirmed: None,
            })),
            request: Arc::new(request),
            phase,
            delivery,
            accounts,
            session,
        }
    }

    pub fn destination(&self) -> &ContactIdentifier {
        &self.request.contact
    }

    pub fn digits(&self) -> OtpDigits {
        lock_state(&self.state).digits
    }

    pub fn error(&self) -> Option<String> {
        lock_state(&self.state).error.clone()
    }

    pub fn handle(&self) -> IssuanceHandle {
        lock_state(&self.state).handle.clone()
    }

    pub fn phase(&self) -> RegistrationPhase {
        self.phase.get()
    }

    fn is_open(&self) -> bool {
        !self.session.is_cancelled()
            && matches!(
                self.phase.get(),
                RegistrationPhase::AwaitingOtp | RegistrationPhase::VerifyingOtp
            )
    }

    /// Writes one slot. Anything other than an empty string or a single digit
    /// is dropped silently. Returns the slot that should take focus next.
    pub fn set_digit(&self, index: usize, value: &str) -> Option<FocusSlot> {
        if index >= OTP_LENGTH || !is_digit_input(value) || !self.is_open() {
            return None;
        }
        let digit = value.chars().next();
        let mut state = lock_state(&self.state);
        state.digits.set(index, digit);
        state.error = None;
        match digit {
            Some(_) if index < OTP_LENGTH - 1 => Some(FocusSlot(index + 1)),
            _ => None,
        }
    }

    /// Backspace on an empty slot moves focus back without touching the neighbour.
    pub fn handle_backspace(&self, index: usize) -> Option<FocusSlot> {
        if index == 0 || index >= OTP_LENGTH {
            return None;
        }
        let state = lock_state(&self.state);
        match state.digits.get(index) {
            None => Some(FocusSlot(index - 1)),
            Some(_) => None,
        }
    }

    async fn confirm(
        &self,
        handle: &IssuanceHandle,
        digits: OtpDigits,
        generation: u64,
        already_matched: bool,
    ) -> Result<CreatedAccount, OtpError> {
        if !already_matched {
            let code = SecretString::from(digits.join());
            let check = self.delivery.check_code(handle, &code).await?;
            code_check_result(check)?;
            let mut state = lock_state(&self.state);
            if state.generation == generation {
                state.confirmed = Some(digits);
            }
        }
        Ok(self.accounts.create_account(&self.request).await?)
    }

    #[tracing::instrument(name = "Verify OTP", skip(self), fields(contact = %mask_contact(self.request.contact.as_ref())))]
    pub async fn verify(&self) -> Result<VerifyOutcome, OtpError> {
        let (digits, handle, generation, already_matched, attempt) = {
            let mut state = lock_state(&self.state);
            if self.session.is_cancelled() || self.phase.get() != RegistrationPhase::AwaitingOtp {
                tracing::debug!(phase = %self.phase.get(), "Verification ignored");
                return Ok(VerifyOutcome::Ignored);
            }
            if !state.digits.is_complete() {
                state.error = Some(OtpError::Incomplete.to_string());
                return Err(OtpError::Incomplete);
            }
            if !self
                .phase
                .transition(RegistrationPhase::AwaitingOtp, RegistrationPhase::VerifyingOtp)
            {
                return Ok(VerifyOutcome::Ignored);
            }
            state.error = None;
            let attempt = self.session.child_token();
            state.in_flight = Some(attempt.clone());
            (
                state.digits,
                state.handle.clone(),
                state.generation,
                state.confirmed == Some(state.digits),
                attempt,
            )
        };

        let result = tokio::select! {
            _ = attempt.cancelled() => Err(OtpError::Cancelled),
            result = self.confirm(&handle, digits, generation, already_matched) => result,
        };

        let mut state = lock_state(&self.state);
        if attempt.is_cancelled() {
            // Whoever cancelled has already moved the phase on.
            tracing::info!("Verification result discarded");
            return Err(OtpError::Cancelled);
        }
        state.in_flight = None;
        match result {
            Ok(account) => {
                self.phase.set(RegistrationPhase::Verified);
                tracing::info!(account_id = %account.account_id, "Contact verified");
                Ok(VerifyOutcome::Verified(account))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Verification failed");
                state.error = Some(e.to_string());
                self.phase.set(RegistrationPhase::AwaitingOtp);
                Err(e)
            }
        }
    }

    /// Clears the slots and the error, then asks for a new code. A verification
    /// still in flight is abandoned. No code is requested once the step is
    /// closed, in which case `Ok(None)` is returned.
    #[tracing::instrument(name = "Resend OTP", skip(self), fields(contact = %mask_contact(self.request.contact.as_ref())))]
    pub async fn resend(&self) -> Result<Option<CodeIssued>, OtpError> {
        let generation = {
            let mut state = lock_state(&self.state);
            state.digits.clear();
            state.error = None;
            state.confirmed = None;
            if let Some(attempt) = state.in_flight.take() {
                attempt.cancel();
                self.phase
                    .transition(RegistrationPhase::VerifyingOtp, RegistrationPhase::AwaitingOtp);
            }
            if self.session.is_cancelled() || self.phase.get() != RegistrationPhase::AwaitingOtp {
                return Ok(None);
            }
            state.generation += 1;
            state.generation
        };

        let issued = tokio::select! {
            _ = self.session.cancelled() => return Err(OtpError::Cancelled),
            issued = self.delivery.issue_code(&self.request.contact) => issued,
        };

        let mut state = lock_state(&self.state);
        if self.session.is_cancelled() {
            return Err(OtpError::Cancelled);
        }
        match issued {
            Ok(handle) if state.generation == generation => {
                let event = CodeIssued {
                    destination: self.request.contact.clone(),
                    expires_at: handle.expires_at,
                };
                state.handle = handle;
                tracing::info!("New OTP has been sent");
                Ok(Some(event))
            }
            Ok(_) => {
                tracing::debug!("Superseded by a newer resend");
                Ok(None)
            }
            Err(e) => {
                let error = OtpError::Service("Failed to send a new code".to_string(), e.into());
                state.error = Some(error.to_string());
                Err(error)
            }
        }
    }
}
