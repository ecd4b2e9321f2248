//! Practical email address format validation, plus the interactive prompt
//! that keeps asking until a valid address is entered.

pub mod cli;
pub mod config;
pub mod input;
pub mod transcript;
pub mod validator;

pub use validator::{check_email, is_valid_email, validate, Violation};
