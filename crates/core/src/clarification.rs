//! Clarification vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a draft cannot be confirmed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    MissingBrand,
    MissingSize,
    UomMismatch,
    ConfirmWeight,
    GodownAmbiguous,
    CustomerAmbiguous,
    LowStock,
    NegativeStockDefault,
    UnknownItem,
    BundleRodsNeeded,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::MissingBrand => "MISSING_BRAND",
            ReasonCode::MissingSize => "MISSING_SIZE",
            ReasonCode::UomMismatch => "UOM_MISMATCH",
            ReasonCode::ConfirmWeight => "CONFIRM_WEIGHT",
            ReasonCode::GodownAmbiguous => "GODOWN_AMBIGUOUS",
            ReasonCode::CustomerAmbiguous => "CUSTOMER_AMBIGUOUS",
            ReasonCode::LowStock => "LOW_STOCK",
            ReasonCode::NegativeStockDefault => "NEGATIVE_STOCK_DEFAULT",
            ReasonCode::UnknownItem => "UNKNOWN_ITEM",
            ReasonCode::BundleRodsNeeded => "BUNDLE_RODS_NEEDED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question the user must answer before a draft can be confirmed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    pub reason: ReasonCode,
    /// Localised prompt
    pub prompt: String,
    /// Selectable answers; free text when empty
    #[serde(default)]
    pub options: Vec<String>,
    /// Item the question is about, if any
    #[serde(default)]
    pub item_index: Option<usize>,
    /// The user's answer, once given
    #[serde(default)]
    pub resolution: Option<String>,
}

impl Clarification {
    pub fn new(reason: ReasonCode, prompt: impl Into<String>) -> Self {
        Self {
            reason,
            prompt: prompt.into(),
            options: Vec::new(),
            item_index: None,
            resolution: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn for_item(mut self, index: usize) -> Self {
        self.item_index = Some(index);
        self
    }

    pub fn is_open(&self) -> bool {
        self.resolution.is_none()
    }
}
