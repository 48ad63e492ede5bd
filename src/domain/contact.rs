use serde::{Deserialize, Serialize};

use crate::constants::{EMAIL_PATTERN, PHONE_PATTERN, WHITESPACE_PATTERN};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    #[default]
    Email,
    Phone,
}

impl ContactType {
    pub fn label(&self) -> &'static str {
        match self {
            ContactType::Email => "Email Address",
            ContactType::Phone => "Phone Number",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ContactType::Email => "you@example.com",
            ContactType::Phone => "+1 234 567 8900",
        }
    }

    /// Short noun used in "Verify your ..." prompts.
    pub fn noun(&self) -> &'static str {
        match self {
            ContactType::Email => "Email",
            ContactType::Phone => "Phone",
        }
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactType::Email => write!(f, "email"),
            ContactType::Phone => write!(f, "phone"),
        }
    }
}

impl std::str::FromStr for ContactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(ContactType::Email),
            "phone" => Ok(ContactType::Phone),
            other => Err(format!("{} is not a known contact type.", other)),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn normalize_phone(phone: &str) -> String {
    WHITESPACE_PATTERN.replace_all(phone, "").into_owned()
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(&normalize_phone(phone))
}

/// A contact identifier that has already passed the format rule for its type.
/// Phone numbers are stored with whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactIdentifier {
    contact_type: ContactType,
    value: String,
}

impl ContactIdentifier {
    pub fn parse(contact_type: ContactType, raw: &str) -> Result<ContactIdentifier, String> {
        match contact_type {
            ContactType::Email if is_valid_email(raw) => Ok(Self {
                contact_type,
                value: raw.to_string(),
            }),
            ContactType::Phone if is_valid_phone(raw) => Ok(Self {
                contact_type,
                value: normalize_phone(raw),
            }),
            _ => Err(format!("{} is not a valid {} contact.", raw, contact_type)),
        }
    }

    pub fn contact_type(&self) -> ContactType {
        self.contact_type
    }

    pub fn get(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for ContactIdentifier {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ContactIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}
