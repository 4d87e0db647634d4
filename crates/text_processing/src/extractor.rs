//! Rule Extractor
//!
//! Pure, deterministic scan of an utterance against the [`Lexicon`].
//! The text is digit-normalised and lower-cased first; every field is then
//! taken from the first hit of its table or pattern cascade.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use voice_command_core::{Category, GodownHint, Intent, PaymentMode, Uom};

use crate::hindi::{normalize_digits, word_to_number};
use crate::lexicon::{AliasEntry, Lexicon};

/// Confidence of a trigger-phrase hit
pub const TRIGGER_CONFIDENCE: f32 = 0.9;
/// No trigger, but a quantity+unit was found
pub const QUANTITY_DEFAULT_CONFIDENCE: f32 = 0.6;
/// No trigger and nothing measurable
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\b").unwrap());

static PHONE_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4,10})\b").unwrap());

// Name followed by a possessive/dative postposition
static NAME_BEFORE_POSTPOSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([\p{L}\p{M}]+)\s+(?:ka|ke|ki|ko|का|के|की|को)\b").unwrap()
});

static NAME_AFTER_PREPOSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:to|for)\s+([\p{L}\p{M}]+)").unwrap());

static NAME_POSSESSIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([\p{L}\p{M}]+)'s\b").unwrap());

/// Everything the rule path could read from one utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub intent: Intent,
    /// 0.9 trigger hit, 0.6 quantity default, 0.3 fallback
    pub intent_confidence: f32,
    pub category: Option<Category>,
    /// Canonical brand name when an alias matched
    pub brand: Option<String>,
    pub size: Option<String>,
    pub godown: Option<GodownHint>,
    pub quantity: Option<f64>,
    /// Set only together with `quantity`
    pub uom: Option<Uom>,
    pub price: Option<f64>,
    pub payment_mode: Option<PaymentMode>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

impl Extraction {
    /// At least one of category, brand or quantity was found
    pub fn has_item(&self) -> bool {
        self.category.is_some() || self.brand.is_some() || self.quantity.is_some()
    }

    pub fn has_measured_quantity(&self) -> bool {
        self.quantity.is_some() && self.uom.is_some()
    }
}

/// Rule-based extractor over an injected lexicon
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    lexicon: Arc<Lexicon>,
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new(Lexicon::shared())
    }
}

impl RuleExtractor {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Extract every field from `text`. Never fails; empty input yields
    /// the fallback intent at the lowest confidence.
    pub fn extract(&self, text: &str) -> Extraction {
        let normalised = normalize_digits(text);
        let lower = normalised.to_lowercase();

        // Spans already claimed by a field; bare-number and phone scans skip them
        let mut claimed: Vec<Range<usize>> = Vec::new();

        let price = self.extract_price(&lower, &mut claimed);
        let size = self.extract_size(&lower, &mut claimed);
        let (quantity, uom) = self.extract_quantity(&lower, &mut claimed);
        let customer_phone = first_unclaimed(&PHONE_HINT, &lower, &claimed);

        let (intent, intent_confidence) = self.detect_intent(&lower, uom.is_some());

        let category = AliasEntry::find(&self.lexicon.categories, &lower).map(|(c, _)| c);
        let brand = AliasEntry::find(&self.lexicon.brands, &lower).map(|(b, _)| b.to_string());
        let godown = AliasEntry::find(&self.lexicon.godowns, &lower).map(|(g, _)| g);
        let payment_mode = AliasEntry::find(&self.lexicon.payment_modes, &lower).map(|(m, _)| m);
        let customer_name = self.extract_name(&normalised);

        let extraction = Extraction {
            intent,
            intent_confidence,
            category,
            brand,
            size,
            godown,
            quantity,
            uom,
            price,
            payment_mode,
            customer_name,
            customer_phone,
        };

        tracing::debug!(
            intent = ?extraction.intent,
            confidence = extraction.intent_confidence,
            category = ?extraction.category,
            brand = ?extraction.brand,
            size = ?extraction.size,
            quantity = ?extraction.quantity,
            uom = ?extraction.uom,
            price = ?extraction.price,
            "Rule extraction"
        );

        extraction
    }

    fn detect_intent(&self, lower: &str, has_unit: bool) -> (Intent, f32) {
        // Padded so space-anchored triggers also hit at the start
        let padded = format!(" {}", lower);
        match AliasEntry::find(&self.lexicon.intent_triggers, &padded) {
            Some((intent, trigger)) => {
                tracing::trace!(%intent, trigger, "Intent trigger hit");
                (intent, TRIGGER_CONFIDENCE)
            }
            None if has_unit => (Intent::CreateEstimate, QUANTITY_DEFAULT_CONFIDENCE),
            None => (Intent::CreateEstimate, FALLBACK_CONFIDENCE),
        }
    }

    fn extract_price(&self, lower: &str, claimed: &mut Vec<Range<usize>>) -> Option<f64> {
        self.lexicon.price_patterns.iter().find_map(|pattern| {
            pattern.apply(lower).map(|(price, span)| {
                tracing::trace!(pattern = pattern.name, price, "Price pattern hit");
                claimed.push(span);
                price
            })
        })
    }

    fn extract_size(&self, lower: &str, claimed: &mut Vec<Range<usize>>) -> Option<String> {
        self.lexicon.size_patterns.iter().find_map(|pattern| {
            pattern.apply(lower).map(|(size, span)| {
                claimed.push(span);
                size
            })
        })
    }

    /// Quantity and unit come together from one pattern, or the quantity
    /// is a bare number with no unit. Number words inside a trigger phrase
    /// ("कर दो") are verbs, not quantities.
    fn extract_quantity(
        &self,
        lower: &str,
        claimed: &mut Vec<Range<usize>>,
    ) -> (Option<f64>, Option<Uom>) {
        let measured = self.lexicon.unit_patterns.iter().find_map(|pattern| {
            pattern
                .apply(lower)
                .map(|(quantity, span)| (quantity, pattern.uom, span))
        });
        if let Some((quantity, uom, span)) = measured {
            claimed.push(span);
            return (Some(quantity), Some(uom));
        }

        let bare = first_unclaimed(&BARE_NUMBER, lower, claimed)
            .and_then(|digits| digits.parse::<f64>().ok())
            .or_else(|| {
                let triggers = self.lexicon.trigger_spans(lower);
                lower
                    .unicode_word_indices()
                    .filter(|(start, word)| !overlaps(&triggers, &(*start..start + word.len())))
                    .find_map(|(_, word)| word_to_number(word))
            });
        (bare, None)
    }

    fn extract_name(&self, text: &str) -> Option<String> {
        [
            &*NAME_BEFORE_POSTPOSITION,
            &*NAME_AFTER_PREPOSITION,
            &*NAME_POSSESSIVE,
        ]
        .iter()
        .find_map(|regex| {
            regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .find(|word| word.chars().count() >= 2 && !self.lexicon.is_reserved_word(word))
                .map(str::to_string)
        })
    }
}

fn overlaps(spans: &[Range<usize>], range: &Range<usize>) -> bool {
    spans
        .iter()
        .any(|span| range.start < span.end && span.start < range.end)
}

/// First capture of `regex` whose span does not overlap a claimed one
fn first_unclaimed(regex: &Regex, text: &str, claimed: &[Range<usize>]) -> Option<String> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find(|m| !overlaps(claimed, &m.range()))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Extraction {
        RuleExtractor::default().extract(text)
    }

    #[test]
    fn test_simple_rate_update() {
        let e = extract("ankur 8mm ka rate 65 kar do");
        assert_eq!(e.intent, Intent::UpdateRate);
        assert_eq!(e.intent_confidence, TRIGGER_CONFIDENCE);
        assert_eq!(e.brand.as_deref(), Some("Ankur"));
        assert_eq!(e.size.as_deref(), Some("8mm"));
        assert_eq!(e.price, Some(65.0));
        // The price is not reused as a bare quantity
        assert_eq!(e.quantity, None);
        assert_eq!(e.customer_name, None);
    }

    #[test]
    fn test_devanagari_rate_update() {
        let e = extract("अंकुर टीएमटी ८mm का रेट ६५ कर दो");
        assert_eq!(e.intent, Intent::UpdateRate);
        assert_eq!(e.category, Some(Category::Tmt));
        assert_eq!(e.brand.as_deref(), Some("Ankur"));
        assert_eq!(e.size.as_deref(), Some("8mm"));
        assert_eq!(e.price, Some(65.0));
        assert_eq!(e.quantity, None);
    }

    #[test]
    fn test_verb_do_is_not_a_quantity() {
        let e = extract("अंकुर टीएमटी 8mm का रेट 65 कर दो");
        assert_eq!(e.intent, Intent::UpdateRate);
        assert_eq!(e.price, Some(65.0));
        assert_eq!(e.quantity, None);
        assert_eq!(e.uom, None);

        // A standalone number word still counts
        let e = extract("सरिया दो");
        assert_eq!(e.quantity, Some(2.0));
    }

    #[test]
    fn test_english_word_order() {
        let e = extract("update rate for Ankur 8mm to 65");
        assert_eq!(e.intent, Intent::UpdateRate);
        assert_eq!(e.price, Some(65.0));
        assert_eq!(e.customer_name, None);
    }

    #[test]
    fn test_quantity_and_unit_together() {
        let e = extract("tmt 10mm 5 pieces");
        assert_eq!(e.quantity, Some(5.0));
        assert_eq!(e.uom, Some(Uom::Pieces));
        assert_eq!(e.size.as_deref(), Some("10mm"));
        assert_eq!(e.intent, Intent::CreateEstimate);
        assert_eq!(e.intent_confidence, QUANTITY_DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_unit_priority() {
        let e = extract("ultratech cement 50 bori");
        assert_eq!(e.uom, Some(Uom::Bags));
        assert_eq!(e.quantity, Some(50.0));
        // "rate" inside the brand name is not a rate trigger
        assert_eq!(e.intent, Intent::CreateEstimate);
        assert_eq!(e.intent_confidence, QUANTITY_DEFAULT_CONFIDENCE);

        let e = extract("sariya 2 bundle");
        assert_eq!(e.uom, Some(Uom::Bundle));
    }

    #[test]
    fn test_bare_number_has_no_unit() {
        let e = extract("ankur 12");
        assert_eq!(e.quantity, Some(12.0));
        assert_eq!(e.uom, None);
        assert!(!e.has_measured_quantity());
    }

    #[test]
    fn test_number_word_quantity() {
        let e = extract("सीमेंट पांच");
        assert_eq!(e.category, Some(Category::Cement));
        assert_eq!(e.quantity, Some(5.0));
        assert_eq!(e.uom, None);
    }

    #[test]
    fn test_empty_input() {
        let e = extract("");
        assert_eq!(e.intent, Intent::CreateEstimate);
        assert_eq!(e.intent_confidence, FALLBACK_CONFIDENCE);
        assert!(!e.has_item());
    }

    #[test]
    fn test_customer_hints() {
        let e = extract("Ramesh ko reminder bhejo");
        assert_eq!(e.intent, Intent::PaymentReminder);
        assert_eq!(e.customer_name.as_deref(), Some("Ramesh"));

        let e = extract("send reminder to Suresh");
        assert_eq!(e.customer_name.as_deref(), Some("Suresh"));

        let e = extract("9876543210 wale ka khata");
        assert_eq!(e.customer_phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_rate_trigger_at_start() {
        let e = extract("rate kitna hai");
        assert_eq!(e.intent, Intent::CheckRate);
        assert_eq!(e.intent_confidence, TRIGGER_CONFIDENCE);

        let e = extract("ultratech ka rate");
        assert_eq!(e.intent, Intent::CheckRate);
        assert_eq!(e.brand.as_deref(), Some("Ultratech"));
    }

    #[test]
    fn test_phone_is_not_a_price() {
        let e = extract("send reminder to 9876543210");
        assert_eq!(e.intent, Intent::PaymentReminder);
        assert_eq!(e.price, None);
        assert_eq!(e.customer_phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_payment() {
        let e = extract("ramesh ka 5000 jama karo cash");
        assert_eq!(e.intent, Intent::AddPayment);
        assert_eq!(e.price, Some(5000.0));
        assert_eq!(e.payment_mode, Some(PaymentMode::Cash));
        assert_eq!(e.customer_phone, None);
        assert_eq!(e.customer_name.as_deref(), Some("ramesh"));
    }

    #[test]
    fn test_godown_and_transfer() {
        let e = extract("10 bundle yard me transfer karo");
        assert_eq!(e.intent, Intent::TransferStock);
        assert_eq!(e.godown, Some(GodownHint::Yard));
    }

    #[test]
    fn test_extraction_is_pure() {
        let extractor = RuleExtractor::default();
        let text = "kamdhenu 12mm 20 nag ka total";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }
}
