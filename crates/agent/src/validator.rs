//! Validator / Clarification Generator
//!
//! Walks every item of a command and raises the questions that must be
//! answered before the draft can be confirmed. Nothing here is guessed:
//! brand, size, rods per bundle and pipe weight always come from the user.

use serde::Serialize;

use voice_command_config::constants::tmt::{STANDARD_DIAMETERS_MM, WEIGHT_DIVISOR};
use voice_command_config::ConversionConfig;
use voice_command_core::command::format_number;
use voice_command_core::{
    CanonicalCommand, Category, Clarification, DraftStatus, Intent, Language, ParseSource,
    ParsedItem, ReasonCode, Uom,
};

/// Brands offered when none was heard
pub const BRAND_OPTIONS: [&str; 4] = ["Ankur", "Kamdhenu", "Tata Tiscon", "Jindal"];

/// Common TMT diameters offered when no size was heard
pub const SIZE_OPTIONS: [&str; 5] = ["8mm", "10mm", "12mm", "16mm", "20mm"];

/// Rods-per-bundle choices
pub const BUNDLE_ROD_OPTIONS: [&str; 4] = ["6", "8", "10", "12"];

pub const GODOWN_OPTIONS: [&str; 2] = ["main", "yard"];

/// A computed unit conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub item_index: usize,
    pub weight_kg: f64,
    /// e.g. "(10² / 162) × 12m × 5 pcs = 37.04 kg"
    pub formula: String,
}

/// What the confirmation screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderData {
    pub you_said: String,
    pub summary: String,
    pub parse_source: String,
    pub confidence: f32,
    pub conversions: Vec<Conversion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub status: DraftStatus,
    pub clarifications: Vec<Clarification>,
    pub render_data: RenderData,
}

impl Validation {
    pub fn has_clarifications(&self) -> bool {
        !self.clarifications.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    standard_length_m: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ConversionConfig::default())
    }
}

impl Validator {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            standard_length_m: config.tmt_standard_length_m,
        }
    }

    /// Validate a parsed command. Item-bearing intents with no items are
    /// checked as one blank line at index 0.
    ///
    /// Synchronous: the only lookup is the in-memory conversion table.
    pub fn validate(
        &self,
        parsed: &CanonicalCommand,
        raw_text: &str,
        source: ParseSource,
        confidence: f32,
        language: Language,
    ) -> Validation {
        let blank = [ParsedItem::default()];
        let items: &[ParsedItem] = if parsed.items.is_empty() && parsed.intent.is_item_bearing() {
            &blank
        } else {
            &parsed.items
        };

        let mut clarifications = Vec::new();
        let mut conversions = Vec::new();

        for (index, item) in items.iter().enumerate() {
            clarifications.extend(self.check_item(parsed.intent, index, item, language));
            if let Some(conversion) = self.tmt_conversion(index, item) {
                conversions.push(conversion);
            }
        }

        for clarification in &clarifications {
            metrics::counter!(
                "voice_command_clarifications_total",
                "reason" => clarification.reason.as_str()
            )
            .increment(1);
        }

        let status = if clarifications.is_empty() {
            DraftStatus::Draft
        } else {
            DraftStatus::NeedsClarification
        };

        tracing::debug!(
            intent = %parsed.intent,
            %status,
            clarifications = clarifications.len(),
            conversions = conversions.len(),
            "Command validated"
        );

        Validation {
            status,
            clarifications,
            render_data: RenderData {
                you_said: raw_text.to_string(),
                summary: summarize(parsed, language),
                parse_source: source.to_string(),
                confidence,
                conversions,
            },
        }
    }

    fn check_item(
        &self,
        intent: Intent,
        index: usize,
        item: &ParsedItem,
        language: Language,
    ) -> Vec<Clarification> {
        let mut out = Vec::new();

        let brand_required = matches!(
            intent,
            Intent::UpdateRate | Intent::CheckRate | Intent::AddStockManual
        );
        if brand_required && item.brand.is_none() {
            out.push(
                Clarification::new(
                    ReasonCode::MissingBrand,
                    language.pick("कौन सा ब्रांड?", "Which brand?"),
                )
                .with_options(BRAND_OPTIONS)
                .for_item(index),
            );
        }

        if item.category == Some(Category::Tmt) && item.size.is_none() {
            out.push(
                Clarification::new(
                    ReasonCode::MissingSize,
                    language.pick("कौन सा साइज़?", "Which size?"),
                )
                .with_options(SIZE_OPTIONS)
                .for_item(index),
            );
        }

        if item.uom == Some(Uom::Bundle) {
            out.push(
                Clarification::new(
                    ReasonCode::BundleRodsNeeded,
                    language.pick("एक बंडल में कितने सरिये?", "How many rods per bundle?"),
                )
                .with_options(BUNDLE_ROD_OPTIONS)
                .for_item(index),
            );
        }

        if item.category == Some(Category::Pipe) && item.uom == Some(Uom::Pieces) {
            let prompt = match (language, item.quantity) {
                (Language::Hindi, Some(qty)) => {
                    format!("{} पाइप का कुल वजन (kg) बताइए", format_number(qty))
                }
                (Language::English, Some(qty)) => {
                    format!("Confirm total weight (kg) for {} pipes", format_number(qty))
                }
                _ => language
                    .pick("पाइप का कुल वजन (kg) बताइए", "Confirm total pipe weight (kg)")
                    .to_string(),
            };
            out.push(Clarification::new(ReasonCode::ConfirmWeight, prompt).for_item(index));
        }

        if intent == Intent::TransferStock && item.godown.is_none() {
            out.push(
                Clarification::new(
                    ReasonCode::GodownAmbiguous,
                    language.pick("किस गोदाम से?", "From which godown?"),
                )
                .with_options(GODOWN_OPTIONS)
                .for_item(index),
            );
        }

        out
    }

    /// TMT pieces of a tabled diameter convert to kilograms:
    /// (d² / 162) × length × pieces
    fn tmt_conversion(&self, index: usize, item: &ParsedItem) -> Option<Conversion> {
        if item.category != Some(Category::Tmt) || item.uom != Some(Uom::Pieces) {
            return None;
        }
        let diameter = diameter_mm(item.size.as_deref()?)?;
        let pieces = item.quantity?;

        let kg_per_metre = f64::from(diameter * diameter) / WEIGHT_DIVISOR;
        let weight_kg = round2(kg_per_metre * self.standard_length_m * pieces);
        let formula = format!(
            "({}² / {}) × {}m × {} pcs = {:.2} kg",
            diameter,
            format_number(WEIGHT_DIVISOR),
            format_number(self.standard_length_m),
            format_number(pieces),
            weight_kg
        );

        Some(Conversion {
            item_index: index,
            weight_kg,
            formula,
        })
    }
}

/// Diameter of a size string like "10mm", if it is in the table
fn diameter_mm(size: &str) -> Option<u32> {
    let diameter: u32 = size.trim().trim_end_matches("mm").trim().parse().ok()?;
    STANDARD_DIAMETERS_MM.contains(&diameter).then_some(diameter)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn intent_label(intent: Intent, language: Language) -> &'static str {
    match intent {
        Intent::CheckRate => language.pick("रेट देखें", "Check rate"),
        Intent::UpdateRate => language.pick("रेट अपडेट", "Update rate"),
        Intent::CheckStock => language.pick("स्टॉक देखें", "Check stock"),
        Intent::AddStockManual => language.pick("स्टॉक जोड़ें", "Add stock"),
        Intent::TransferStock => language.pick("स्टॉक ट्रांसफर", "Transfer stock"),
        Intent::CreateEstimate => language.pick("एस्टीमेट बनाएं", "Create estimate"),
        Intent::CreateOrder => language.pick("ऑर्डर बनाएं", "Create order"),
        Intent::CheckOrderStatus => language.pick("ऑर्डर स्थिति", "Order status"),
        Intent::CheckLedger => language.pick("खाता देखें", "Check ledger"),
        Intent::AddPayment => language.pick("भुगतान जमा", "Add payment"),
        Intent::ShareLedger => language.pick("खाता भेजें", "Share ledger"),
        Intent::PaymentReminder => language.pick("भुगतान रिमाइंडर", "Payment reminder"),
        Intent::CalculateWeight => language.pick("वजन निकालें", "Calculate weight"),
        Intent::CalculatePrice => language.pick("कीमत निकालें", "Calculate price"),
        Intent::CancelAction => language.pick("रद्द करें", "Cancel"),
        Intent::ConfirmAction => language.pick("पक्का करें", "Confirm"),
    }
}

/// One-line summary ("Update rate: Ankur 8mm → ₹65")
pub fn summarize(command: &CanonicalCommand, language: Language) -> String {
    let mut parts: Vec<String> = command
        .items
        .iter()
        .map(ParsedItem::describe)
        .filter(|d| !d.is_empty())
        .collect();
    if let Some(name) = command.customer_name() {
        parts.push(name.to_string());
    }

    let mut summary = intent_label(command.intent, language).to_string();
    if !parts.is_empty() {
        summary.push_str(": ");
        summary.push_str(&parts.join(", "));
    }
    if let Some(amount) = command.amount() {
        summary.push_str(&format!(" → ₹{}", format_number(amount)));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(command: &CanonicalCommand) -> Validation {
        Validator::default().validate(command, "raw", ParseSource::RuleEngine, 0.9, Language::English)
    }

    fn command(intent: Intent, item: ParsedItem) -> CanonicalCommand {
        let mut command = CanonicalCommand::new(intent);
        command.items.push(item);
        command
    }

    fn reasons(validation: &Validation) -> Vec<ReasonCode> {
        validation.clarifications.iter().map(|c| c.reason).collect()
    }

    #[test]
    fn test_rate_check_without_items_asks_brand() {
        let validation = validate(&CanonicalCommand::new(Intent::CheckRate));
        assert_eq!(validation.status, DraftStatus::NeedsClarification);
        assert_eq!(reasons(&validation), vec![ReasonCode::MissingBrand]);
        assert_eq!(validation.clarifications[0].options.len(), 4);
        assert_eq!(validation.clarifications[0].item_index, Some(0));
    }

    #[test]
    fn test_complete_rate_update_is_clean() {
        let mut cmd = command(
            Intent::UpdateRate,
            ParsedItem {
                brand: Some("Ankur".into()),
                size: Some("8mm".into()),
                ..Default::default()
            },
        );
        cmd.financials = Some(voice_command_core::ParsedFinancials {
            amount: Some(65.0),
            mode: None,
        });
        let validation = validate(&cmd);
        assert_eq!(validation.status, DraftStatus::Draft);
        assert_eq!(validation.render_data.summary, "Update rate: Ankur 8mm → ₹65");
        assert_eq!(validation.render_data.you_said, "raw");
    }

    #[test]
    fn test_tmt_without_size() {
        let validation = validate(&command(
            Intent::CreateEstimate,
            ParsedItem {
                category: Some(Category::Tmt),
                brand: Some("Kamdhenu".into()),
                ..Default::default()
            },
        ));
        assert_eq!(reasons(&validation), vec![ReasonCode::MissingSize]);
    }

    #[test]
    fn test_bundle_always_asks_rods() {
        let validation = validate(&command(
            Intent::CreateEstimate,
            ParsedItem {
                category: Some(Category::Tmt),
                size: Some("12mm".into()),
                quantity: Some(3.0),
                uom: Some(Uom::Bundle),
                ..Default::default()
            },
        ));
        assert_eq!(reasons(&validation), vec![ReasonCode::BundleRodsNeeded]);
        assert_eq!(
            validation.clarifications[0].options,
            vec!["6", "8", "10", "12"]
        );
    }

    #[test]
    fn test_pipe_pieces_confirm_weight() {
        let validation = validate(&command(
            Intent::CreateOrder,
            ParsedItem {
                category: Some(Category::Pipe),
                size: Some("40x40".into()),
                quantity: Some(10.0),
                uom: Some(Uom::Pieces),
                ..Default::default()
            },
        ));
        assert_eq!(reasons(&validation), vec![ReasonCode::ConfirmWeight]);
        assert!(validation.render_data.conversions.is_empty());
    }

    #[test]
    fn test_tmt_weight_conversion() {
        let validation = validate(&command(
            Intent::CalculateWeight,
            ParsedItem {
                category: Some(Category::Tmt),
                size: Some("10mm".into()),
                quantity: Some(5.0),
                uom: Some(Uom::Pieces),
                ..Default::default()
            },
        ));
        assert_eq!(validation.status, DraftStatus::Draft);
        let conversion = &validation.render_data.conversions[0];
        assert!((conversion.weight_kg - 37.04).abs() < 0.01);
        assert_eq!(conversion.formula, "(10² / 162) × 12m × 5 pcs = 37.04 kg");
    }

    #[test]
    fn test_conversion_uses_configured_length() {
        let validator = Validator::new(&ConversionConfig {
            tmt_standard_length_m: 6.0,
        });
        let cmd = command(
            Intent::CalculateWeight,
            ParsedItem {
                category: Some(Category::Tmt),
                size: Some("8mm".into()),
                quantity: Some(1.0),
                uom: Some(Uom::Pieces),
                ..Default::default()
            },
        );
        let validation = validator.validate(&cmd, "x", ParseSource::Manual, 1.0, Language::English);
        assert!(validation.render_data.conversions[0].formula.contains("× 6m ×"));
    }

    #[test]
    fn test_untabled_diameter_is_not_converted() {
        let validation = validate(&command(
            Intent::CalculateWeight,
            ParsedItem {
                category: Some(Category::Tmt),
                size: Some("32mm".into()),
                quantity: Some(2.0),
                uom: Some(Uom::Pieces),
                ..Default::default()
            },
        ));
        assert!(validation.render_data.conversions.is_empty());
    }

    #[test]
    fn test_transfer_without_godown() {
        let validation = validate(&command(
            Intent::TransferStock,
            ParsedItem {
                category: Some(Category::Cement),
                quantity: Some(20.0),
                uom: Some(Uom::Bags),
                ..Default::default()
            },
        ));
        assert_eq!(reasons(&validation), vec![ReasonCode::GodownAmbiguous]);
    }

    #[test]
    fn test_hindi_prompts() {
        let validation = Validator::default().validate(
            &CanonicalCommand::new(Intent::CheckRate),
            "rate kitna hai",
            ParseSource::RuleEngine,
            0.7,
            Language::Hindi,
        );
        assert_eq!(validation.clarifications[0].prompt, "कौन सा ब्रांड?");
        assert_eq!(validation.render_data.summary, "रेट देखें");
    }

    #[test]
    fn test_customer_intents_have_no_item_questions() {
        let validation = validate(&CanonicalCommand::new(Intent::PaymentReminder));
        assert!(!validation.has_clarifications());
    }
}
