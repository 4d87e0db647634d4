//! Display language for prompts and summaries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used for clarification prompts and render data.
///
/// Input utterances are always code-switched; this only picks the
/// language the system answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "hi")]
    Hindi,
    #[serde(alias = "en")]
    English,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::English => "en",
        }
    }

    /// Pick between a Hindi and an English variant of the same text
    pub fn pick<'a>(&self, hindi: &'a str, english: &'a str) -> &'a str {
        match self {
            Language::Hindi => hindi,
            Language::English => english,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hi" | "hindi" => Ok(Language::Hindi),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("hi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert!("ta".parse::<Language>().is_err());
    }

    #[test]
    fn test_pick() {
        assert_eq!(Language::Hindi.pick("हाँ", "yes"), "हाँ");
        assert_eq!(Language::English.pick("हाँ", "yes"), "yes");
    }
}
