use super::errors::OtpError;
use super::schemas::OtpDigits;
use crate::delivery_client::{codes_match, CodeCheck};

/// Input filter for a passcode slot: empty, or exactly one ASCII digit.
pub fn is_digit_input(value: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some(c), None) => c.is_ascii_digit(),
        _ => false,
    }
}

/// Local comparison of the entered slots against an issued code.
pub fn check_code(digits: &OtpDigits, issued_code: &str) -> Result<(), OtpError> {
    if !digits.is_complete() {
        return Err(OtpError::Incomplete);
    }
    if !codes_match(issued_code, &digits.join()) {
        return Err(OtpError::Mismatch);
    }
    Ok(())
}

pub fn code_check_result(check: CodeCheck) -> Result<(), OtpError> {
    match check {
        CodeCheck::Matched => Ok(()),
        CodeCheck::Mismatched => Err(OtpError::Mismatch),
        CodeCheck::Expired => Err(OtpError::Expired),
        CodeCheck::AttemptsExhausted => Err(OtpError::TooManyAttempts),
    }
}
