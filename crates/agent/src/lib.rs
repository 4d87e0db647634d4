//! Command interpreter agent
//!
//! Features:
//! - Command assembly from rule extraction, with multi-clause split
//! - Fallback gate to the AI parser on low confidence
//! - Validation and localised clarification prompts
//! - Draft persistence and lifecycle
//! - Executor with a shared 0 / 1 / many resolution branch
//! - Single-attempt listen timeout

pub mod assembler;
pub mod error;
pub mod executor;
pub mod fallback;
pub mod listen;
pub mod pipeline;
pub mod validator;

pub use assembler::{assemble, CommandAssembler, ParsedClause, ParsedCommand};
pub use error::{AgentError, AgentResult};
pub use executor::{
    Candidate, EntityKind, ExecutionOutcome, ExecutionResult, Executor, RateLine,
};
pub use fallback::{decode_ai_reply, FallbackGate, ResolvedCommand};
pub use listen::listen_once;
pub use pipeline::{ClauseOutcome, ClauseReport, CommandPipeline, PipelineOptions};
pub use validator::{Conversion, RenderData, Validation, Validator};
