use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::account_client::CreatedAccount;
use crate::constants::OTP_LENGTH;
use crate::domain::ContactIdentifier;

/// The six passcode input slots. Each slot is empty or holds one ASCII digit.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OtpDigits([Option<char>; OTP_LENGTH]);

impl OtpDigits {
    /// Builds the slots from a string, one character per slot. Spaces and
    /// underscores are read as empty slots.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() != OTP_LENGTH {
            return Err(format!("Expected {} slots, got {}", OTP_LENGTH, chars.len()));
        }
        let mut digits = Self::default();
        for (index, c) in chars.into_iter().enumerate() {
            match c {
                ' ' | '_' => {}
                c if c.is_ascii_digit() => digits.0[index] = Some(c),
                other => return Err(format!("{} is not a digit", other)),
            }
        }
        Ok(digits)
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.0.get(index).copied().flatten()
    }

    pub fn filled(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled() == OTP_LENGTH
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }

    /// Concatenation of the populated slots.
    pub fn join(&self) -> String {
        self.0.iter().flatten().collect()
    }

    pub(crate) fn set(&mut self, index: usize, value: Option<char>) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [None; OTP_LENGTH];
    }
}

impl std::fmt::Display for OtpDigits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for slot in self.0.iter() {
            write!(f, "{}", slot.unwrap_or('_'))?;
        }
        Ok(())
    }
}

/// Intent for the presentation layer to move input focus to a slot.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSlot(pub usize);

/// Emitted when a fresh code has been sent.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssued {
    pub destination: ContactIdentifier,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Another verification is running or the step is no longer open.
    Ignored,
    Verified(CreatedAccount),
}
