//! Draft lifecycle
//!
//! ```text
//! DRAFT <-> NEEDS_CLARIFICATION
//!   |               |
//!   +--> CONFIRMED --> POSTED
//!   +--> REJECTED <---+
//! ```
//!
//! CONFIRMED, POSTED and REJECTED are terminal. The only edge out of a
//! terminal state is CONFIRMED -> POSTED, taken by the executor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::clarification::{Clarification, ReasonCode};
use crate::command::{CanonicalCommand, GodownHint, ParseSource, ParsedCustomer, ParsedItem, Uom};
use crate::error::{Error, Result};

/// Draft status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Draft,
    NeedsClarification,
    Confirmed,
    Posted,
    Rejected,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "DRAFT",
            DraftStatus::NeedsClarification => "NEEDS_CLARIFICATION",
            DraftStatus::Confirmed => "CONFIRMED",
            DraftStatus::Posted => "POSTED",
            DraftStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DraftStatus::Confirmed | DraftStatus::Posted | DraftStatus::Rejected
        )
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted wrapper around a command awaiting confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    /// Utterance exactly as received
    pub raw_input: String,
    pub command: CanonicalCommand,
    pub parse_source: ParseSource,
    pub confidence: f32,
    pub status: DraftStatus,
    pub clarifications: Vec<Clarification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    /// Create a draft from a parse that cleared the reject floor.
    ///
    /// Status is NEEDS_CLARIFICATION when any clarification was emitted.
    pub fn new(
        raw_input: impl Into<String>,
        command: CanonicalCommand,
        parse_source: ParseSource,
        confidence: f32,
        clarifications: Vec<Clarification>,
        reject_floor: f32,
    ) -> Result<Self> {
        if confidence <= reject_floor {
            return Err(Error::BelowRejectFloor {
                confidence,
                floor: reject_floor,
            });
        }

        let now = Utc::now();
        let status = if clarifications.iter().any(Clarification::is_open) {
            DraftStatus::NeedsClarification
        } else {
            DraftStatus::Draft
        };

        Ok(Self {
            id: Uuid::new_v4(),
            raw_input: raw_input.into(),
            command,
            parse_source,
            confidence,
            status,
            clarifications,
            created_at: now,
            updated_at: now,
        })
    }

    /// Clarifications still waiting for an answer
    pub fn open_clarifications(&self) -> impl Iterator<Item = &Clarification> {
        self.clarifications.iter().filter(|c| c.is_open())
    }

    pub fn open_count(&self) -> usize {
        self.open_clarifications().count()
    }

    /// Merge an explicit user answer into the command.
    pub fn resolve_clarification(
        &mut self,
        reason: ReasonCode,
        item_index: Option<usize>,
        value: &str,
    ) -> Result<()> {
        self.ensure_mutable("resolve")?;

        let value = value.trim();
        let position = self
            .clarifications
            .iter()
            .position(|c| c.is_open() && c.reason == reason && c.item_index == item_index)
            .ok_or(Error::ClarificationNotFound { reason, item_index })?;

        apply_answer(&mut self.command, reason, item_index, value)?;

        self.clarifications[position].resolution = Some(value.to_string());
        if self.open_count() == 0 {
            self.status = DraftStatus::Draft;
            self.command.needs_clarification = false;
            self.command.reason = None;
        }
        self.touch();

        tracing::info!(
            draft_id = %self.id,
            reason = %reason,
            remaining = self.open_count(),
            "Clarification resolved"
        );
        Ok(())
    }

    /// Explicit user confirmation. Refused while any question is open.
    pub fn confirm(&mut self) -> Result<()> {
        self.ensure_mutable("confirm")?;
        let open = self.open_count();
        if open > 0 {
            return Err(Error::ClarificationsPending(open));
        }
        self.status = DraftStatus::Confirmed;
        self.touch();
        tracing::info!(draft_id = %self.id, intent = %self.command.intent, "Draft confirmed");
        Ok(())
    }

    /// Explicit user dismissal
    pub fn reject(&mut self) -> Result<()> {
        self.ensure_mutable("reject")?;
        self.status = DraftStatus::Rejected;
        self.touch();
        tracing::info!(draft_id = %self.id, "Draft rejected");
        Ok(())
    }

    /// Record that the executor applied a confirmed draft
    pub fn mark_posted(&mut self) -> Result<()> {
        if self.status != DraftStatus::Confirmed {
            return Err(Error::InvalidTransition {
                from: self.status,
                action: "post",
            });
        }
        self.status = DraftStatus::Posted;
        self.touch();
        Ok(())
    }

    fn ensure_mutable(&self, action: &'static str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidTransition {
                from: self.status,
                action,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn apply_answer(
    command: &mut CanonicalCommand,
    reason: ReasonCode,
    item_index: Option<usize>,
    value: &str,
) -> Result<()> {
    let invalid = || Error::InvalidResolution {
        reason,
        value: value.to_string(),
    };
    if value.is_empty() {
        return Err(invalid());
    }

    match reason {
        ReasonCode::MissingBrand => item_mut(command, item_index).brand = Some(value.to_string()),
        ReasonCode::MissingSize => item_mut(command, item_index).size = Some(value.to_string()),
        ReasonCode::BundleRodsNeeded => {
            let rods: u32 = value.parse().map_err(|_| invalid())?;
            if rods == 0 {
                return Err(invalid());
            }
            item_mut(command, item_index).pieces_per_bundle = Some(rods);
        }
        ReasonCode::ConfirmWeight => {
            let kg: f64 = value
                .trim_end_matches("kg")
                .trim()
                .parse()
                .map_err(|_| invalid())?;
            if kg <= 0.0 {
                return Err(invalid());
            }
            item_mut(command, item_index).confirmed_weight_kg = Some(kg);
        }
        ReasonCode::GodownAmbiguous => {
            let godown: GodownHint = value.parse().map_err(|_| invalid())?;
            item_mut(command, item_index).godown = Some(godown);
        }
        ReasonCode::UomMismatch => {
            let uom: Uom = value.parse().map_err(|_| invalid())?;
            item_mut(command, item_index).uom = Some(uom);
        }
        ReasonCode::CustomerAmbiguous => {
            command
                .customer
                .get_or_insert_with(ParsedCustomer::default)
                .name = Some(value.to_string());
        }
        // Acknowledgements only; nothing to merge
        ReasonCode::LowStock | ReasonCode::NegativeStockDefault | ReasonCode::UnknownItem => {}
    }
    Ok(())
}

/// Item addressed by a clarification. A blank line is materialised when
/// the question was raised for an item-bearing command with no items.
fn item_mut(command: &mut CanonicalCommand, item_index: Option<usize>) -> &mut ParsedItem {
    let index = item_index.unwrap_or(0);
    while command.items.len() <= index {
        command.items.push(ParsedItem::default());
    }
    &mut command.items[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;

    fn rate_check_draft() -> Draft {
        let command = CanonicalCommand::new(Intent::CheckRate);
        let clarifications = vec![Clarification::new(ReasonCode::MissingBrand, "Which brand?")
            .with_options(["Ankur", "Kamdhenu"])
            .for_item(0)];
        Draft::new("rate kitna hai", command, ParseSource::RuleEngine, 0.7, clarifications, 0.3)
            .unwrap()
    }

    #[test]
    fn test_new_draft_status() {
        let draft = rate_check_draft();
        assert_eq!(draft.status, DraftStatus::NeedsClarification);

        let clean = Draft::new(
            "ankur 8mm ka rate 65 kar do",
            CanonicalCommand::new(Intent::UpdateRate),
            ParseSource::RuleEngine,
            1.0,
            vec![],
            0.3,
        )
        .unwrap();
        assert_eq!(clean.status, DraftStatus::Draft);
    }

    #[test]
    fn test_reject_floor() {
        let result = Draft::new(
            "hello",
            CanonicalCommand::new(Intent::CreateEstimate),
            ParseSource::RuleEngine,
            0.3,
            vec![],
            0.3,
        );
        assert!(matches!(result, Err(Error::BelowRejectFloor { .. })));
    }

    #[test]
    fn test_confirm_refused_while_open() {
        let mut draft = rate_check_draft();
        assert!(matches!(draft.confirm(), Err(Error::ClarificationsPending(1))));
        assert_eq!(draft.status, DraftStatus::NeedsClarification);
    }

    #[test]
    fn test_resolution_merges_and_unblocks() {
        let mut draft = rate_check_draft();
        draft
            .resolve_clarification(ReasonCode::MissingBrand, Some(0), "Ankur")
            .unwrap();
        assert_eq!(draft.status, DraftStatus::Draft);
        assert_eq!(draft.command.items[0].brand.as_deref(), Some("Ankur"));
        draft.confirm().unwrap();
        assert_eq!(draft.status, DraftStatus::Confirmed);
    }

    #[test]
    fn test_terminal_states_refuse_mutation() {
        let mut draft = rate_check_draft();
        draft.reject().unwrap();
        assert!(draft.confirm().is_err());
        assert!(draft
            .resolve_clarification(ReasonCode::MissingBrand, Some(0), "Ankur")
            .is_err());
        assert!(draft.mark_posted().is_err());
    }

    #[test]
    fn test_bundle_answer_must_be_a_count() {
        let mut command = CanonicalCommand::new(Intent::CreateEstimate);
        command.items.push(ParsedItem {
            quantity: Some(2.0),
            uom: Some(Uom::Bundle),
            ..Default::default()
        });
        let clarifications =
            vec![Clarification::new(ReasonCode::BundleRodsNeeded, "Rods per bundle?").for_item(0)];
        let mut draft =
            Draft::new("2 bundle", command, ParseSource::RuleEngine, 0.8, clarifications, 0.3)
                .unwrap();

        assert!(draft
            .resolve_clarification(ReasonCode::BundleRodsNeeded, Some(0), "many")
            .is_err());
        draft
            .resolve_clarification(ReasonCode::BundleRodsNeeded, Some(0), "10")
            .unwrap();
        assert_eq!(draft.command.items[0].pieces_per_bundle, Some(10));
    }

    #[test]
    fn test_posted_only_after_confirmed() {
        let mut draft = Draft::new(
            "x",
            CanonicalCommand::new(Intent::UpdateRate),
            ParseSource::Manual,
            0.9,
            vec![],
            0.3,
        )
        .unwrap();
        assert!(draft.mark_posted().is_err());
        draft.confirm().unwrap();
        draft.mark_posted().unwrap();
        assert_eq!(draft.status, DraftStatus::Posted);
    }
}
