pub mod otp;
pub mod registration;
pub mod schemas;

pub use otp::OtpVerifier;
pub use registration::RegistrationForm;
pub use schemas::RegistrationPhase;
