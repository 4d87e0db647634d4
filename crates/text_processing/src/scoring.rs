//! Confidence Scorer
//!
//! Confidence starts at the intent-detection value and gains 0.1 per
//! recognised field, capped at 1.0. Rate and stock intents that miss
//! their key field lose 0.2, never dropping below the floor.
//!
//! Clarification is decided by independent trip-wires, not by the number.

use serde::Serialize;

use voice_command_core::{Intent, Uom};

use crate::extractor::Extraction;

const FIELD_BONUS: f32 = 0.1;
const MISSING_FIELD_PENALTY: f32 = 0.2;
const PENALTY_FLOOR: f32 = 0.3;

/// Scorer output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub confidence: f32,
    pub needs_clarification: bool,
    /// Every tripped condition, joined with "; "
    pub reason: Option<String>,
}

/// Score an extraction
pub fn score(extraction: &Extraction) -> Score {
    let mut confidence = extraction.intent_confidence;

    let bonuses = [
        extraction.category.is_some(),
        extraction.brand.is_some(),
        extraction.size.is_some(),
        extraction.has_measured_quantity(),
    ];
    for hit in bonuses {
        if hit {
            confidence = (confidence + FIELD_BONUS).min(1.0);
        }
    }

    let intent = extraction.intent;
    if intent.is_rate_intent() && extraction.price.is_none() && extraction.brand.is_none() {
        confidence = (confidence - MISSING_FIELD_PENALTY).max(PENALTY_FLOOR);
    }
    if intent.is_stock_intent() && extraction.quantity.is_none() {
        confidence = (confidence - MISSING_FIELD_PENALTY).max(PENALTY_FLOOR);
    }

    let reasons = clarification_reasons(extraction);
    Score {
        confidence: round2(confidence),
        needs_clarification: !reasons.is_empty(),
        reason: (!reasons.is_empty()).then(|| reasons.join("; ")),
    }
}

fn clarification_reasons(extraction: &Extraction) -> Vec<&'static str> {
    let mut reasons = Vec::new();

    match extraction.intent {
        Intent::UpdateRate => {
            if extraction.brand.is_none() {
                reasons.push("brand missing for rate update");
            }
            if extraction.price.is_none() {
                reasons.push("price missing for rate update");
            }
        }
        Intent::AddStockManual => {
            if extraction.category.is_none() {
                reasons.push("category missing for stock entry");
            }
            if extraction.quantity.is_none() {
                reasons.push("quantity missing for stock entry");
            }
        }
        Intent::CreateEstimate if !extraction.has_item() => {
            reasons.push("no item recognised for estimate");
        }
        _ => {}
    }

    if extraction.uom == Some(Uom::Bundle) {
        reasons.push("rods per bundle not known");
    }

    reasons
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::RuleExtractor;

    fn score_text(text: &str) -> Score {
        score(&RuleExtractor::default().extract(text))
    }

    #[test]
    fn test_full_rate_update() {
        let s = score_text("ankur 8mm ka rate 65 kar do");
        assert!(s.confidence >= 0.9);
        assert!(s.confidence <= 1.0);
        assert!(!s.needs_clarification);
        assert_eq!(s.reason, None);
    }

    #[test]
    fn test_rate_check_penalty() {
        let s = score_text("rate kitna hai");
        assert_eq!(s.confidence, 0.7);
        assert!(!s.needs_clarification);
    }

    #[test]
    fn test_update_without_price() {
        let s = score_text("ankur ka naya rate");
        assert!(s.needs_clarification);
        assert_eq!(s.reason.as_deref(), Some("price missing for rate update"));
    }

    #[test]
    fn test_stock_penalty_respects_floor() {
        let s = score_text("stock");
        assert_eq!(s.confidence, 0.7);
        let e = RuleExtractor::default().extract("");
        assert_eq!(score(&e).confidence, 0.3);
    }

    #[test]
    fn test_empty_estimate_needs_clarification() {
        let s = score_text("hello");
        assert_eq!(s.confidence, 0.3);
        assert!(s.needs_clarification);
    }

    #[test]
    fn test_bundle_always_trips() {
        for text in ["tmt 12mm 3 bundle", "ankur 2 bundal ka rate 60 kar do", "5 gaddi"] {
            let s = score_text(text);
            assert!(s.needs_clarification, "{}", text);
            assert!(s.reason.unwrap().contains("rods per bundle"));
        }
    }

    #[test]
    fn test_brand_never_lowers_confidence() {
        let pairs = [
            ("8mm ka rate", "ankur 8mm ka rate"),
            ("stock dekho", "jindal stock dekho"),
            ("10 pieces", "kamdhenu 10 pieces"),
        ];
        for (without, with) in pairs {
            assert!(score_text(with).confidence >= score_text(without).confidence);
        }
    }
}
