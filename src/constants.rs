pub const OTP_LENGTH: usize = 6;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DEMO_OTP: &str = "123456";
pub const CONFIGURATION_FILE: &str = "configuration.yaml";
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email pattern");
    pub static ref PHONE_PATTERN: Regex =
        Regex::new(r"^\+?[1-9][0-9]{9,14}$").expect("Failed to compile phone pattern");
    pub static ref WHITESPACE_PATTERN: Regex =
        Regex::new(r"\s").expect("Failed to compile whitespace pattern");
    // The hard password rule: restricted charset, at least 8 long.
    pub static ref PASSWORD_CHARSET_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9@$!%*?&]{8,}$").expect("Failed to compile password pattern");
    pub static ref UPPERCASE_PATTERN: Regex =
        Regex::new(r"[A-Z]").expect("Failed to compile uppercase pattern");
    pub static ref DIGIT_PATTERN: Regex =
        Regex::new(r"[0-9]").expect("Failed to compile digit pattern");
    pub static ref PASSWORD_SYMBOL_PATTERN: Regex =
        Regex::new(r"[@$!%*?&]").expect("Failed to compile password symbol pattern");
    // Strength counts anything outside ASCII alphanumerics as a symbol.
    pub static ref STRENGTH_SYMBOL_PATTERN: Regex =
        Regex::new(r"[^A-Za-z0-9]").expect("Failed to compile symbol pattern");
}
