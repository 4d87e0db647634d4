//! Rule path of the command interpreter
//!
//! This crate turns a raw, code-switched utterance into extracted fields
//! without touching the network:
//! - **Lexicon**: alias tables and ordered regex cascades
//! - **Rule Extractor**: intent, category, brand, size, godown,
//!   quantity+unit, price, payment mode and customer hints
//! - **Confidence Scorer**: confidence in [0,1] plus clarification trip-wires
//! - **Clause splitting** on the "aur"/"and" conjunction
//!
//! # Example
//!
//! ```
//! use voice_command_text_processing::{score, RuleExtractor};
//!
//! let extractor = RuleExtractor::default();
//! let extraction = extractor.extract("ankur 8mm ka rate 65 kar do");
//! let score = score(&extraction);
//!
//! assert_eq!(extraction.brand.as_deref(), Some("Ankur"));
//! assert!(score.confidence >= 0.9);
//! assert!(!score.needs_clarification);
//! ```

pub mod extractor;
pub mod hindi;
pub mod lexicon;
pub mod scoring;
pub mod split;

pub use extractor::{Extraction, RuleExtractor};
pub use lexicon::{AliasEntry, Lexicon, PricePattern, SizeKind, SizePattern, UnitPattern};
pub use scoring::{score, Score};
pub use split::split_clauses;
