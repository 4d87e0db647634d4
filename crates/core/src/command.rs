//! Canonical command shape
//!
//! Both the rule path and the AI fallback produce a [`CanonicalCommand`];
//! nothing downstream can tell which one did. The AI path crosses the
//! boundary as literal JSON, so field names and enum spellings here are
//! the wire contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::intent::Intent;

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "TMT", alias = "tmt_bars", alias = "saria")]
    Tmt,
    #[serde(alias = "CEMENT")]
    Cement,
    #[serde(alias = "PIPE")]
    Pipe,
    #[serde(alias = "ANGLE")]
    Angle,
    #[serde(alias = "SHEET")]
    Sheet,
    #[serde(alias = "WIRE")]
    Wire,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tmt => "tmt",
            Category::Cement => "cement",
            Category::Pipe => "pipe",
            Category::Angle => "angle",
            Category::Sheet => "sheet",
            Category::Wire => "wire",
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Category::Tmt => "TMT",
            Category::Cement => "Cement",
            Category::Pipe => "Pipe",
            Category::Angle => "Angle",
            Category::Sheet => "Sheet",
            Category::Wire => "Wire",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit of measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uom {
    #[serde(alias = "pcs", alias = "piece", alias = "nos")]
    Pieces,
    #[serde(alias = "kilograms", alias = "kgs")]
    Kg,
    #[serde(alias = "bag")]
    Bags,
    #[serde(alias = "bundles")]
    Bundle,
    #[serde(alias = "tons", alias = "tonne")]
    Ton,
}

impl Uom {
    pub fn as_str(&self) -> &'static str {
        match self {
            Uom::Pieces => "pieces",
            Uom::Kg => "kg",
            Uom::Bags => "bags",
            Uom::Bundle => "bundle",
            Uom::Ton => "ton",
        }
    }
}

impl fmt::Display for Uom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Uom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pieces" | "pcs" | "piece" | "nos" => Ok(Uom::Pieces),
            "kg" | "kgs" | "kilograms" => Ok(Uom::Kg),
            "bags" | "bag" => Ok(Uom::Bags),
            "bundle" | "bundles" => Ok(Uom::Bundle),
            "ton" | "tons" | "tonne" => Ok(Uom::Ton),
            other => Err(format!("unknown unit: {}", other)),
        }
    }
}

/// Storage location hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GodownHint {
    /// Main godown next to the shop
    Main,
    /// Secondary yard
    Yard,
}

impl GodownHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            GodownHint::Main => "main",
            GodownHint::Yard => "yard",
        }
    }
}

impl FromStr for GodownHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(GodownHint::Main),
            "yard" => Ok(GodownHint::Yard),
            other => Err(format!("unknown godown: {}", other)),
        }
    }
}

/// Payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    #[serde(alias = "upi")]
    Online,
    #[serde(alias = "check")]
    Cheque,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Online => "online",
            PaymentMode::Cheque => "cheque",
        }
    }
}

/// Which path produced a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    RuleEngine,
    AiFallback,
    Manual,
}

impl ParseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseSource::RuleEngine => "rule_engine",
            ParseSource::AiFallback => "ai_fallback",
            ParseSource::Manual => "manual",
        }
    }
}

impl fmt::Display for ParseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseSource::RuleEngine => write!(f, "rule engine"),
            ParseSource::AiFallback => write!(f, "AI fallback"),
            ParseSource::Manual => write!(f, "manual"),
        }
    }
}

/// One product line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Normalised size, e.g. "8mm" or "40x40"
    #[serde(default)]
    pub size: Option<String>,
    /// May be present without `uom` (an unattached bare number)
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub uom: Option<Uom>,
    #[serde(default)]
    pub godown: Option<GodownHint>,
    /// Only ever set from an explicit user answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pieces_per_bundle: Option<u32>,
    /// Only ever set from an explicit user answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_weight_kg: Option<f64>,
}

impl ParsedItem {
    /// Quantity and unit were extracted together
    pub fn has_measured_quantity(&self) -> bool {
        self.quantity.is_some() && self.uom.is_some()
    }

    /// Short human description ("Ankur TMT 8mm × 10 pieces")
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(brand) = &self.brand {
            parts.push(brand.clone());
        }
        if let Some(category) = self.category {
            parts.push(category.label().to_string());
        }
        if let Some(size) = &self.size {
            parts.push(size.clone());
        }
        let mut text = parts.join(" ");
        if let Some(qty) = self.quantity {
            let qty = format_number(qty);
            match self.uom {
                Some(uom) => text.push_str(&format!(" × {} {}", qty, uom)),
                None => text.push_str(&format!(" × {}", qty)),
            }
        }
        text.trim().to_string()
    }
}

/// Customer hint; never a lookup key on its own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ParsedCustomer {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }
}

/// Money mentioned in the utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFinancials {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub mode: Option<PaymentMode>,
}

impl ParsedFinancials {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.mode.is_none()
    }
}

/// The single contract produced by either parse path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCommand {
    pub intent: Intent,
    #[serde(default)]
    pub items: Vec<ParsedItem>,
    #[serde(default)]
    pub customer: Option<ParsedCustomer>,
    #[serde(default)]
    pub financials: Option<ParsedFinancials>,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CanonicalCommand {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            items: Vec::new(),
            customer: None,
            financials: None,
            needs_clarification: false,
            reason: None,
        }
    }

    /// Monetary amount, if any
    pub fn amount(&self) -> Option<f64> {
        self.financials.as_ref().and_then(|f| f.amount)
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn customer_phone(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.phone.as_deref())
    }
}

/// Format a number without a trailing ".0"
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ai_shape() {
        let json = r#"{
            "intent": "UPDATE_RATE",
            "items": [{"category": "tmt", "brand": "Ankur", "size": "8mm"}],
            "financials": {"amount": 65}
        }"#;
        let cmd: CanonicalCommand = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.intent, Intent::UpdateRate);
        assert_eq!(cmd.items[0].category, Some(Category::Tmt));
        assert_eq!(cmd.amount(), Some(65.0));
        assert!(!cmd.needs_clarification);
    }

    #[test]
    fn test_unit_aliases() {
        let item: ParsedItem = serde_json::from_str(r#"{"quantity": 5, "uom": "pcs"}"#).unwrap();
        assert_eq!(item.uom, Some(Uom::Pieces));
        assert!(item.has_measured_quantity());
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        let result = serde_json::from_str::<CanonicalCommand>(r#"{"intent": "DANCE"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_describe() {
        let item = ParsedItem {
            category: Some(Category::Tmt),
            brand: Some("Ankur".into()),
            size: Some("8mm".into()),
            quantity: Some(10.0),
            uom: Some(Uom::Pieces),
            ..Default::default()
        };
        assert_eq!(item.describe(), "Ankur TMT 8mm × 10 pieces");
    }

    #[test]
    fn test_parse_source_display() {
        assert_eq!(ParseSource::AiFallback.to_string(), "AI fallback");
        assert_eq!(ParseSource::RuleEngine.as_str(), "rule_engine");
    }
}
