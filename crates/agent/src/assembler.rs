//! Command Assembler
//!
//! Packages one extraction into a [`CanonicalCommand`]. An utterance with
//! no category, brand or quantity produces zero items rather than an
//! empty placeholder line.

use serde::Serialize;

use voice_command_core::{
    CanonicalCommand, ParsedCustomer, ParsedFinancials, ParsedItem,
};
use voice_command_text_processing::{score, split_clauses, Extraction, RuleExtractor, Score};

/// Rule-path result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommand {
    pub command: CanonicalCommand,
    pub confidence: f32,
}

/// One clause of a split utterance with its rule-path parse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedClause {
    pub text: String,
    pub parsed: ParsedCommand,
}

#[derive(Debug, Clone, Default)]
pub struct CommandAssembler {
    extractor: RuleExtractor,
}

impl CommandAssembler {
    pub fn new(extractor: RuleExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &RuleExtractor {
        &self.extractor
    }

    /// Rule-only parse of a single command
    pub fn parse_command(&self, text: &str) -> ParsedCommand {
        let extraction = self.extractor.extract(text);
        let score = score(&extraction);
        let command = assemble(&extraction, &score);

        tracing::debug!(
            intent = %command.intent,
            confidence = score.confidence,
            items = command.items.len(),
            needs_clarification = command.needs_clarification,
            "Command assembled"
        );

        ParsedCommand {
            command,
            confidence: score.confidence,
        }
    }

    /// Split on the conjunction marker and parse every clause, in order
    pub fn parse_commands(&self, text: &str) -> Vec<ParsedClause> {
        split_clauses(text)
            .into_iter()
            .map(|clause| {
                let parsed = self.parse_command(&clause);
                ParsedClause {
                    text: clause,
                    parsed,
                }
            })
            .collect()
    }
}

/// Build the canonical command from an extraction and its score
pub fn assemble(extraction: &Extraction, score: &Score) -> CanonicalCommand {
    let mut command = CanonicalCommand::new(extraction.intent);

    if extraction.has_item() {
        command.items.push(ParsedItem {
            category: extraction.category,
            brand: extraction.brand.clone(),
            size: extraction.size.clone(),
            quantity: extraction.quantity,
            uom: extraction.uom,
            godown: extraction.godown,
            ..Default::default()
        });
    }

    let customer = ParsedCustomer {
        name: extraction.customer_name.clone(),
        phone: extraction.customer_phone.clone(),
    };
    if !customer.is_empty() {
        command.customer = Some(customer);
    }

    let financials = ParsedFinancials {
        amount: extraction.price,
        mode: extraction.payment_mode,
    };
    if !financials.is_empty() {
        command.financials = Some(financials);
    }

    command.needs_clarification = score.needs_clarification;
    command.reason = score.reason.clone();
    command
}
