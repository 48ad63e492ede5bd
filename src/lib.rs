pub mod account_client;
pub mod commands;
pub mod configuration;
pub mod constants;
pub mod delivery_client;
pub mod domain;
pub mod email_client;
pub mod errors;
pub mod flows;
pub mod sms_client;
pub mod startup;
pub mod telemetry;
mod tests;
pub mod utils;
