//! Shared constants
//!
//! Default values live here so that settings, the validator and the
//! executor agree on them.

/// Parser confidence thresholds
pub mod thresholds {
    /// Below this the AI fallback is consulted
    pub const AI_FALLBACK: f32 = 0.5;

    /// Fixed confidence assigned to a successful AI parse
    pub const AI_CONFIDENCE: f32 = 0.75;

    /// At or below this no draft is created
    pub const REJECT_FLOOR: f32 = 0.3;
}

/// TMT bar weight conversion
pub mod tmt {
    /// Standard bar length in metres
    pub const STANDARD_LENGTH_M: f64 = 12.0;

    /// Divisor in the kg-per-metre rule of thumb (d² / 162)
    pub const WEIGHT_DIVISOR: f64 = 162.0;

    /// Diameters (mm) the conversion table covers
    pub const STANDARD_DIAMETERS_MM: [u32; 7] = [6, 8, 10, 12, 16, 20, 25];
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// OpenAI-compatible chat completion API
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
}

/// Timeouts (in seconds)
pub mod timeouts {
    /// AI completion request
    pub const LLM_REQUEST_SECS: u64 = 15;

    /// One voice capture
    pub const LISTEN_SECS: u64 = 10;

    /// HTTP request
    pub const HTTP_REQUEST_SECS: u64 = 30;
}
