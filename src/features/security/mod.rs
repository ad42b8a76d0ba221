//! # Feature: Input Security
//!
//! Screens user questions before they reach the AI-backed endpoints.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod sanitize;

pub use sanitize::{sanitize_input, validate_question, QuestionError, DEFAULT_MAX_INPUT_LEN};
