use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::utils::lock_state;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPhase {
    #[default]
    Idle,
    Submitting,
    AwaitingOtp,
    VerifyingOtp,
    Verified,
}

impl RegistrationPhase {
    /// True while a simulated round-trip is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            RegistrationPhase::Submitting | RegistrationPhase::VerifyingOtp
        )
    }
}

impl std::fmt::Display for RegistrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RegistrationPhase::Idle => "idle",
            RegistrationPhase::Submitting => "submitting",
            RegistrationPhase::AwaitingOtp => "awaiting_otp",
            RegistrationPhase::VerifyingOtp => "verifying_otp",
            RegistrationPhase::Verified => "verified",
        };
        write!(f, "{}", name)
    }
}

/// Phase shared by the form and the verifier it hands off to.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker(Arc<Mutex<RegistrationPhase>>);

impl PhaseTracker {
    pub fn get(&self) -> RegistrationPhase {
        *lock_state(&self.0)
    }

    pub(crate) fn set(&self, phase: RegistrationPhase) {
        let mut current = lock_state(&self.0);
        tracing::debug!(from = %*current, to = %phase, "Registration phase changed");
        *current = phase;
    }

    /// Moves to `to` only when the current phase is `from`.
    pub(crate) fn transition(&self, from: RegistrationPhase, to: RegistrationPhase) -> bool {
        let mut current = lock_state(&self.0);
        if *current != from {
            return false;
        }
        tracing::debug!(from = %from, to = %to, "Registration phase changed");
        *current = to;
        true
    }
}
