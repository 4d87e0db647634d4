//! Chat messages and the parse instruction

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use voice_command_core::Intent;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

static PARSE_SYSTEM_PROMPT: Lazy<String> = Lazy::new(|| {
    let intents = Intent::ALL
        .iter()
        .map(Intent::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You convert a shop owner's command for a building-materials business into JSON.
The command may mix Hindi (Devanagari or Latin script) and English.

Reply with exactly one JSON object and nothing else:
{{
  "intent": one of [{intents}],
  "items": [{{
    "category": "tmt" | "cement" | "pipe" | "angle" | "sheet" | "wire" | null,
    "brand": string | null,
    "size": string | null,          // "8mm" for TMT, "40x40" for pipe sections
    "quantity": number | null,
    "uom": "pieces" | "kg" | "bags" | "bundle" | "ton" | null,
    "godown": "main" | "yard" | null
  }}],
  "customer": {{"name": string | null, "phone": string | null}} | null,
  "financials": {{"amount": number | null, "mode": "cash" | "online" | "cheque" | null}} | null,
  "needs_clarification": boolean,
  "reason": string | null
}}

Rules:
- Put a price or payment amount in financials.amount.
- Set quantity and uom together or leave both null.
- Never guess a brand, size or rods-per-bundle that was not said; set
  needs_clarification to true and explain in reason instead."#
    )
});

/// Fixed instruction demanding the canonical command JSON
pub fn parse_system_prompt() -> &'static str {
    PARSE_SYSTEM_PROMPT.as_str()
}

/// Remove a surrounding markdown code fence (```json ... ```), if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        let reply = "```json\n{\"intent\": \"CHECK_RATE\"}\n```";
        assert_eq!(strip_code_fence(reply), "{\"intent\": \"CHECK_RATE\"}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let reply = "  ```\n{\"a\": 1}\n```  ";
        assert_eq!(strip_code_fence(reply), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_passthrough() {
        assert_eq!(strip_code_fence(" {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_prompt_lists_every_intent() {
        let prompt = parse_system_prompt();
        for intent in Intent::ALL {
            assert!(prompt.contains(intent.as_str()));
        }
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::system("x")).unwrap();
        assert!(json.contains("\"system\""));
    }
}
