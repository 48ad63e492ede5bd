pub mod contact;
pub use contact::{ContactIdentifier, ContactType};
