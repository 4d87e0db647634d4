//! Collaborator traits for the command interpreter
//!
//! The core never talks to a network or a database directly. Everything
//! outside the process sits behind one of these traits so that:
//! - backends can be swapped without code changes
//! - tests run against hand-written mocks
//!
//! ```text
//! AI:
//!   - CompletionClient: system prompt + user text -> raw assistant text
//!
//! Data store:
//!   - RateStore: daily rate board rows
//!   - CustomerStore: customer lookup and payments
//!   - DraftStore: drafts and their clarifications
//!
//! Capture:
//!   - SpeechSource: one voice capture producing a transcript
//! ```

mod completion;
mod speech;
mod store;

pub use completion::CompletionClient;
pub use speech::SpeechSource;
pub use store::{CustomerStore, DraftStore, RateStore};
