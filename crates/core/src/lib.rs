//! Core traits and types for the voice command interpreter
//!
//! This crate provides foundational types used across all other crates:
//! - The frozen intent set and the canonical command shape
//! - Clarification vocabulary and the draft lifecycle
//! - Rate, customer and payment records handled by the data store
//! - Collaborator traits (AI completion, rate/customer/draft stores)
//! - Error types

pub mod clarification;
pub mod command;
pub mod draft;
pub mod error;
pub mod intent;
pub mod language;
pub mod records;
pub mod traits;

pub use clarification::{Clarification, ReasonCode};
pub use command::{
    CanonicalCommand, Category, GodownHint, ParseSource, ParsedCustomer, ParsedFinancials,
    ParsedItem, PaymentMode, Uom,
};
pub use draft::{Draft, DraftStatus};
pub use error::{Error, Result};
pub use intent::Intent;
pub use language::Language;
pub use records::{Customer, PaymentRecord, RateQuery, RateRow};

// Trait re-exports
pub use traits::{CompletionClient, CustomerStore, DraftStore, RateStore, SpeechSource};
