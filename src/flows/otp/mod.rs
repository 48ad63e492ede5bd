pub(crate) mod errors;
mod handlers;
pub(crate) mod schemas;
pub(crate) mod utils;

pub use errors::OtpError;
pub use handlers::OtpVerifier;
pub use schemas::{CodeIssued, FocusSlot, OtpDigits, VerifyOutcome};
pub use utils::{check_code, is_digit_input};
