use super::schemas::{
    PasswordStrength, RegistrationField, RegistrationInput, StrengthChecks, StrengthLabel,
    ValidationErrors,
};
use crate::constants::{
    DIGIT_PATTERN, MIN_PASSWORD_LENGTH, PASSWORD_CHARSET_PATTERN, PASSWORD_SYMBOL_PATTERN,
    STRENGTH_SYMBOL_PATTERN, UPPERCASE_PATTERN,
};
use crate::domain::contact::{is_valid_email, is_valid_phone};
use crate::domain::ContactType;

pub const PASSWORD_RULE_MESSAGE: &str =
    "Password must be at least 8 characters with 1 uppercase, 1 number, and 1 special character";

/// The hard password gate, separate from the advisory strength score.
pub fn is_valid_password(password: &str) -> bool {
    PASSWORD_CHARSET_PATTERN.is_match(password)
        && UPPERCASE_PATTERN.is_match(password)
        && DIGIT_PATTERN.is_match(password)
        && PASSWORD_SYMBOL_PATTERN.is_match(password)
}

/// Confirm field is non-empty and equal to the password, compared verbatim.
pub fn passwords_match(password: &str, confirm_password: &str) -> bool {
    !confirm_password.is_empty() && password == confirm_password
}

/// Advisory score over four checks. Length is counted in Unicode scalar
/// values, so a character outside the Basic Multilingual Plane counts once.
pub fn compute_strength(password: &str) -> PasswordStrength {
    let checks = StrengthChecks {
        min_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_uppercase: UPPERCASE_PATTERN.is_match(password),
        has_digit: DIGIT_PATTERN.is_match(password),
        has_symbol: STRENGTH_SYMBOL_PATTERN.is_match(password),
    };
    let score = checks.satisfied();
    PasswordStrength {
        score,
        label: StrengthLabel::from_score(score),
        checks,
    }
}

fn validate_contact(input: &RegistrationInput) -> Option<&'static str> {
    match input.contact_type {
        ContactType::Email if input.contact.is_empty() => Some("Email is required"),
        ContactType::Email if !is_valid_email(&input.contact) => {
            Some("Please enter a valid email address")
        }
        ContactType::Phone if input.contact.is_empty() => Some("Phone number is required"),
        ContactType::Phone if !is_valid_phone(&input.contact) => {
            Some("Please enter a valid phone number")
        }
        _ => None,
    }
}

fn validate_password(input: &RegistrationInput) -> Option<&'static str> {
    if input.password.is_empty() {
        Some("Password is required")
    } else if !is_valid_password(&input.password) {
        Some(PASSWORD_RULE_MESSAGE)
    } else {
        None
    }
}

fn validate_confirm_password(input: &RegistrationInput) -> Option<&'static str> {
    if input.confirm_password.is_empty() {
        Some("Please confirm your password")
    } else if input.password != input.confirm_password {
        Some("Passwords do not match")
    } else {
        None
    }
}

/// Pure check of every field. Every failing field gets an entry.
pub fn validate(input: &RegistrationInput) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if let Some(message) = validate_contact(input) {
        errors.insert(RegistrationField::Contact, message);
    }
    if let Some(message) = validate_password(input) {
        errors.insert(RegistrationField::Password, message);
    }
    if let Some(message) = validate_confirm_password(input) {
        errors.insert(RegistrationField::ConfirmPassword, message);
    }
    if !input.accepted_terms {
        errors.insert(
            RegistrationField::AcceptedTerms,
            "You must accept the Terms & Conditions",
        );
    }
    if !input.human_verified {
        errors.insert(
            RegistrationField::HumanVerified,
            "Please verify that you are human",
        );
    }
    errors
}
