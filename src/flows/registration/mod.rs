pub(crate) mod errors;
mod handlers;
pub(crate) mod schemas;
pub(crate) mod utils;

pub use errors::RegistrationError;
pub use handlers::{RegistrationForm, SubmitOutcome};
pub use schemas::{
    CreateAccountRequest, FieldUpdate, PasswordStrength, RegistrationField, RegistrationInput,
    StrengthChecks, StrengthLabel, ValidationErrors,
};
pub use utils::{compute_strength, validate};
