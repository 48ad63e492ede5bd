use secrecy::SecretString;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::domain::{ContactIdentifier, ContactType};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationField {
    ContactType,
    Contact,
    Password,
    ConfirmPassword,
    #[serde(rename = "acceptTerms")]
    AcceptedTerms,
    HumanVerified,
}

impl RegistrationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationField::ContactType => "contactType",
            RegistrationField::Contact => "contact",
            RegistrationField::Password => "password",
            RegistrationField::ConfirmPassword => "confirmPassword",
            RegistrationField::AcceptedTerms => "acceptTerms",
            RegistrationField::HumanVerified => "humanVerified",
        }
    }
}

impl std::fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw form buffers. Passwords stay plain strings while being edited so the
/// form can compare them; they are wrapped in a secret once submitted.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RegistrationInput {
    pub contact_type: ContactType,
    pub contact: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
    pub human_verified: bool,
}

impl RegistrationInput {
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::ContactType(contact_type) => {
                self.contact_type = contact_type;
                self.contact.clear();
            }
            FieldUpdate::Contact(value) => self.contact = value,
            FieldUpdate::Password(value) => self.password = value,
            FieldUpdate::ConfirmPassword(value) => self.confirm_password = value,
            FieldUpdate::AcceptedTerms(value) => self.accepted_terms = value,
            FieldUpdate::HumanVerified(value) => self.human_verified = value,
        }
    }
}

impl Debug for RegistrationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("contact_type", &self.contact_type)
            .field("contact", &self.contact)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .field("accepted_terms", &self.accepted_terms)
            .field("human_verified", &self.human_verified)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    ContactType(ContactType),
    Contact(String),
    Password(String),
    ConfirmPassword(String),
    AcceptedTerms(bool),
    HumanVerified(bool),
}

impl FieldUpdate {
    pub fn field(&self) -> RegistrationField {
        match self {
            FieldUpdate::ContactType(_) => RegistrationField::ContactType,
            FieldUpdate::Contact(_) => RegistrationField::Contact,
            FieldUpdate::Password(_) => RegistrationField::Password,
            FieldUpdate::ConfirmPassword(_) => RegistrationField::ConfirmPassword,
            FieldUpdate::AcceptedTerms(_) => RegistrationField::AcceptedTerms,
            FieldUpdate::HumanVerified(_) => RegistrationField::HumanVerified,
        }
    }
}

impl Debug for FieldUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldUpdate::ContactType(value) => write!(f, "ContactType({:?})", value),
            FieldUpdate::Contact(value) => write!(f, "Contact({:?})", value),
            FieldUpdate::Password(_) => write!(f, "Password([REDACTED])"),
            FieldUpdate::ConfirmPassword(_) => write!(f, "ConfirmPassword([REDACTED])"),
            FieldUpdate::AcceptedTerms(value) => write!(f, "AcceptedTerms({})", value),
            FieldUpdate::HumanVerified(value) => write!(f, "HumanVerified({})", value),
        }
    }
}

/// Field name to message. A missing key means the field is currently valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(BTreeMap<RegistrationField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: RegistrationField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: RegistrationField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = RegistrationField> + '_ {
        self.0.keys().copied()
    }

    pub(crate) fn insert(&mut self, field: RegistrationField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub(crate) fn remove(&mut self, field: RegistrationField) -> Option<String> {
        self.0.remove(&field)
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field.as_str(), message)?;
        }
        map.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrengthLabel {
    #[default]
    None,
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => StrengthLabel::None,
            1 => StrengthLabel::Weak,
            2 => StrengthLabel::Fair,
            3 => StrengthLabel::Good,
            _ => StrengthLabel::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLabel::None => "",
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Fair => "Fair",
            StrengthLabel::Good => "Good",
            StrengthLabel::Strong => "Strong",
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StrengthChecks {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_digit: bool,
    pub has_symbol: bool,
}

impl StrengthChecks {
    pub fn satisfied(&self) -> u8 {
        [
            self.min_length,
            self.has_uppercase,
            self.has_digit,
            self.has_symbol,
        ]
        .iter()
        .filter(|check| **check)
        .count() as u8
    }
}

/// Advisory strength. Derived on demand, never stored.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: StrengthLabel,
    pub checks: StrengthChecks,
}

/// Payload handed to the account-creation service once the contact owns the code.
#[derive(Debug, Clone)]
pub struct CreateAccountRequest {
    pub contact: ContactIdentifier,
    pub password: SecretString,
}
