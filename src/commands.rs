use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::account_client::CreatedAccount;
use crate::domain::{ContactIdentifier, ContactType};
use crate::errors::CommandError;
use crate::flows::otp::{CodeIssued, FocusSlot, OtpDigits, VerifyOutcome};
use crate::flows::registration::{
    FieldUpdate, PasswordStrength, RegistrationForm, SubmitOutcome, ValidationErrors,
};
use crate::flows::RegistrationPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Update(FieldUpdate),
    Submit,
    Digit(usize, String),
    Backspace(usize),
    Verify,
    Resend,
    Dismiss,
    Show,
    Quit,
}

fn parse_toggle(name: &'static str, value: &str) -> Result<bool, CommandError> {
    match value.trim() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        "" => Err(CommandError::MissingValue(name)),
        other => Err(CommandError::InvalidValue(name, other.to_string())),
    }
}

fn parse_index(name: &'static str, value: &str) -> Result<usize, CommandError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::MissingValue(name));
    }
    value
        .parse::<usize>()
        .map_err(|_| CommandError::InvalidValue(name, value.to_string()))
}

/// Parses one console line. Text values are taken verbatim after the first
/// space so passwords keep surrounding whitespace.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
    match keyword.trim() {
        "type" => rest
            .parse::<ContactType>()
            .map(|t| Command::Update(FieldUpdate::ContactType(t)))
            .map_err(|e| CommandError::InvalidValue("type", e)),
        "contact" => Ok(Command::Update(FieldUpdate::Contact(rest.to_string()))),
        "password" => Ok(Command::Update(FieldUpdate::Password(rest.to_string()))),
        "confirm" => Ok(Command::Update(FieldUpdate::ConfirmPassword(
            rest.to_string(),
        ))),
        "terms" => Ok(Command::Update(FieldUpdate::AcceptedTerms(parse_toggle(
            "terms", rest,
        )?))),
        "human" => Ok(Command::Update(FieldUpdate::HumanVerified(parse_toggle(
            "human", rest,
        )?))),
        "submit" => Ok(Command::Submit),
        "digit" => {
            let (index, value) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
            Ok(Command::Digit(
                parse_index("digit", index)?,
                value.trim().to_string(),
            ))
        }
        "back" => Ok(Command::Backspace(parse_index("back", rest)?)),
        "verify" => Ok(Command::Verify),
        "resend" => Ok(Command::Resend),
        "dismiss" => Ok(Command::Dismiss),
        "show" => Ok(Command::Show),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OtpSnapshot {
    pub destination: ContactIdentifier,
    pub title: String,
    pub digits: OtpDigits,
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub phase: RegistrationPhase,
    pub contact_type: ContactType,
    pub contact_label: &'static str,
    pub contact_placeholder: &'static str,
    pub contact: String,
    pub accept_terms: bool,
    pub human_verified: bool,
    pub strength: PasswordStrength,
    pub passwords_match: bool,
    pub errors: ValidationErrors,
    pub otp: Option<OtpSnapshot>,
}

impl FormSnapshot {
    pub fn capture(form: &RegistrationForm) -> Self {
        let input = form.input();
        let otp = form.verifier().map(|verifier| OtpSnapshot {
            title: format!(
                "Verify Your {}",
                verifier.destination().contact_type().noun()
            ),
            destination: verifier.destination().clone(),
            digits: verifier.digits(),
            error: verifier.error(),
        });
        Self {
            phase: form.phase(),
            contact_type: input.contact_type,
            contact_label: input.contact_type.label(),
            contact_placeholder: input.contact_type.placeholder(),
            contact: input.contact,
            accept_terms: input.accepted_terms,
            human_verified: input.human_verified,
            strength: form.strength(),
            passwords_match: form.passwords_match(),
            errors: form.errors(),
            otp,
        }
    }
}

/// One line of console output.
#[derive(Serialize, Debug)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ConsoleEvent {
    State(FormSnapshot),
    Focus { slot: usize },
    OtpRequested { destination: ContactIdentifier },
    CodeIssued(CodeIssued),
    Verified { account: CreatedAccount },
    Ignored,
    Error { message: String },
}

fn error_event(e: impl std::fmt::Display) -> ConsoleEvent {
    ConsoleEvent::Error {
        message: e.to_string(),
    }
}

fn focus_event(focus: Option<FocusSlot>) -> Option<ConsoleEvent> {
    focus.map(|FocusSlot(slot)| ConsoleEvent::Focus { slot })
}

const NO_PASSCODE_STEP: &str = "No verification code has been requested";

#[tracing::instrument(name = "Run console command", skip(form))]
pub async fn execute_command(form: &RegistrationForm, command: Command) -> Vec<ConsoleEvent> {
    let mut events = vec![];
    match command {
        Command::Update(update) => form.update_field(update),
        Command::Submit => match form.submit().await {
            Ok(SubmitOutcome::OtpRequested(verifier)) => events.push(ConsoleEvent::OtpRequested {
                destination: verifier.destination().clone(),
            }),
            Ok(SubmitOutcome::Ignored) => events.push(ConsoleEvent::Ignored),
            Err(e) => events.push(error_event(e)),
        },
        Command::Digit(index, value) => match form.verifier() {
            Some(verifier) => events.extend(focus_event(verifier.set_digit(index, &value))),
            None => events.push(error_event(NO_PASSCODE_STEP)),
        },
        Command::Backspace(index) => match form.verifier() {
            Some(verifier) => events.extend(focus_event(verifier.handle_backspace(index))),
            None => events.push(error_event(NO_PASSCODE_STEP)),
        },
        Command::Verify => match form.verifier() {
            Some(verifier) => match verifier.verify().await {
                Ok(VerifyOutcome::Verified(account)) => {
                    events.push(ConsoleEvent::Verified { account })
                }
                Ok(VerifyOutcome::Ignored) => events.push(ConsoleEvent::Ignored),
                Err(e) => events.push(error_event(e)),
            },
            None => events.push(error_event(NO_PASSCODE_STEP)),
        },
        Command::Resend => match form.verifier() {
            Some(verifier) => match verifier.resend().await {
                Ok(Some(issued)) => events.push(ConsoleEvent::CodeIssued(issued)),
                Ok(None) => events.push(ConsoleEvent::Ignored),
                Err(e) => events.push(error_event(e)),
            },
            None => events.push(error_event(NO_PASSCODE_STEP)),
        },
        Command::Dismiss => form.dismiss(),
        Command::Show | Command::Quit => {}
    }
    events.push(ConsoleEvent::State(FormSnapshot::capture(form)));
    events
}

/// Reads commands line by line until `quit` or end of input, writing each
/// resulting event as a JSON line.
pub async fn run_console<R, W>(
    form: &RegistrationForm,
    reader: R,
    mut writer: W,
) -> Result<(), anyhow::Error>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let events = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute_command(form, command).await,
            Err(e) => vec![error_event(e)],
        };
        for event in events {
            let mut encoded = serde_json::to_string(&event)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
        }
        writer.flush().await?;
    }
    Ok(())
}
