//! Multi-clause command pipeline
//!
//! One utterance may carry several instructions joined by "aur" / "and".
//! Each clause runs the whole path on its own, in spoken order:
//!
//! ```text
//! resolve -> reject floor -> validate -> save draft -> [confirm -> execute]
//! ```
//!
//! A clause that fails or stops for a question never prevents the next
//! one from running.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use voice_command_config::Settings;
use voice_command_core::{
    CompletionClient, CustomerStore, Draft, DraftStatus, DraftStore, Language, RateStore,
    ReasonCode, SpeechSource,
};
use voice_command_text_processing::split_clauses;

use crate::assembler::{CommandAssembler, ParsedCommand};
use crate::error::{AgentError, AgentResult};
use crate::executor::{Candidate, EntityKind, ExecutionOutcome, ExecutionResult, Executor};
use crate::fallback::{FallbackGate, ResolvedCommand};
use crate::listen::listen_once;
use crate::validator::{RenderData, Validation, Validator};

/// Per-clause result
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClauseOutcome {
    Executed {
        draft: Draft,
        result: ExecutionResult,
        render_data: RenderData,
    },
    NeedsClarification {
        draft: Draft,
        render_data: RenderData,
    },
    NeedsSelection {
        draft: Draft,
        entity: EntityKind,
        candidates: Vec<Candidate>,
    },
    /// Clean draft waiting for an explicit confirm
    AwaitingConfirmation {
        draft: Draft,
        render_data: RenderData,
    },
    Refused {
        draft: Draft,
        missing: Vec<String>,
    },
    /// Confidence at or below the reject floor; no draft was created
    Unrecognized { confidence: f32 },
    Failed {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        draft: Option<Draft>,
    },
}

impl ClauseOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ClauseOutcome::Executed { .. } => "executed",
            ClauseOutcome::NeedsClarification { .. } => "needs_clarification",
            ClauseOutcome::NeedsSelection { .. } => "needs_selection",
            ClauseOutcome::AwaitingConfirmation { .. } => "awaiting_confirmation",
            ClauseOutcome::Refused { .. } => "refused",
            ClauseOutcome::Unrecognized { .. } => "unrecognized",
            ClauseOutcome::Failed { .. } => "failed",
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            ClauseOutcome::Executed { draft, .. }
            | ClauseOutcome::NeedsClarification { draft, .. }
            | ClauseOutcome::NeedsSelection { draft, .. }
            | ClauseOutcome::AwaitingConfirmation { draft, .. }
            | ClauseOutcome::Refused { draft, .. } => Some(draft),
            ClauseOutcome::Failed { draft, .. } => draft.as_ref(),
            ClauseOutcome::Unrecognized { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClauseReport {
    pub clause: String,
    #[serde(flatten)]
    pub outcome: ClauseOutcome,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub reject_floor: f32,
    /// Confirm and execute drafts that raised no question
    pub execute_clean_drafts: bool,
    /// Ceiling on one voice capture
    pub listen_timeout: Duration,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            reject_floor: settings.parser.reject_floor,
            execute_clean_drafts: settings.pipeline.execute_clean_drafts,
            listen_timeout: Duration::from_secs(settings.voice.listen_timeout_secs),
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct CommandPipeline {
    gate: FallbackGate,
    validator: Validator,
    executor: Executor,
    drafts: Arc<dyn DraftStore>,
    options: PipelineOptions,
}

impl CommandPipeline {
    pub fn new(
        gate: FallbackGate,
        validator: Validator,
        executor: Executor,
        drafts: Arc<dyn DraftStore>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            gate,
            validator,
            executor,
            drafts,
            options,
        }
    }

    /// Wire the pipeline from settings and collaborators
    pub fn from_settings(
        settings: &Settings,
        client: Option<Arc<dyn CompletionClient>>,
        rates: Arc<dyn RateStore>,
        customers: Arc<dyn CustomerStore>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self::new(
            FallbackGate::new(CommandAssembler::default(), client, &settings.parser),
            Validator::new(&settings.conversion),
            Executor::new(rates, customers),
            drafts,
            PipelineOptions::from_settings(settings),
        )
    }

    /// The AI fallback is wired and enabled
    pub fn has_ai(&self) -> bool {
        self.gate.has_ai()
    }

    /// Rule-only parse of one command
    pub fn parse(&self, text: &str) -> ParsedCommand {
        self.gate.assembler().parse_command(text)
    }

    /// Rule parse with AI fallback
    pub async fn resolve(&self, text: &str) -> ResolvedCommand {
        self.gate.resolve(text).await
    }

    pub fn validate(&self, resolved: &ResolvedCommand, language: Language) -> Validation {
        self.validator.validate(
            &resolved.command,
            &resolved.raw_text,
            resolved.source,
            resolved.confidence,
            language,
        )
    }

    /// Run every clause of an utterance in order
    pub async fn run(&self, text: &str, language: Language) -> Vec<ClauseReport> {
        let mut clauses = split_clauses(text);
        if clauses.is_empty() {
            clauses.push(text.trim().to_string());
        }

        let mut reports = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let outcome = match self.run_clause(&clause, language).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(clause = %clause, error = %e, "Clause failed");
                    ClauseOutcome::Failed {
                        reason: e.to_string(),
                        draft: None,
                    }
                }
            };
            tracing::info!(clause = %clause, outcome = outcome.label(), "Clause processed");
            reports.push(ClauseReport { clause, outcome });
        }
        reports
    }

    /// Capture one utterance under the listen timeout, then run it.
    ///
    /// A timeout or capture error is returned as-is; nothing is parsed and
    /// the capture is not retried.
    pub async fn listen_and_run(
        &self,
        source: &dyn SpeechSource,
        language: Language,
    ) -> AgentResult<Vec<ClauseReport>> {
        let transcript = listen_once(source, self.options.listen_timeout).await?;
        Ok(self.run(&transcript, language).await)
    }

    async fn run_clause(&self, clause: &str, language: Language) -> AgentResult<ClauseOutcome> {
        let resolved = self.gate.resolve(clause).await;
        if resolved.confidence <= self.options.reject_floor {
            return Ok(ClauseOutcome::Unrecognized {
                confidence: resolved.confidence,
            });
        }

        let validation = self.validate(&resolved, language);
        let mut command = resolved.command;
        if validation.has_clarifications() {
            command.needs_clarification = true;
        }

        let mut draft = Draft::new(
            resolved.raw_text,
            command,
            resolved.source,
            resolved.confidence,
            validation.clarifications,
            self.options.reject_floor,
        )?;
        self.drafts.save_draft(&draft).await?;
        let render_data = validation.render_data;

        if draft.status == DraftStatus::NeedsClarification {
            return Ok(ClauseOutcome::NeedsClarification { draft, render_data });
        }

        let intent = draft.command.intent;
        if !self.options.execute_clean_drafts || !Executor::handles(intent) {
            return Ok(ClauseOutcome::AwaitingConfirmation { draft, render_data });
        }

        let missing = Executor::missing_fields(&draft.command);
        if !missing.is_empty() {
            return Ok(ClauseOutcome::Refused { draft, missing });
        }

        draft.confirm()?;
        let outcome = self.execute_and_save(&mut draft, None, language).await?;
        Ok(into_clause_outcome(draft, outcome, render_data))
    }

    async fn execute_and_save(
        &self,
        draft: &mut Draft,
        selection: Option<Uuid>,
        language: Language,
    ) -> AgentResult<ExecutionOutcome> {
        let outcome = self
            .executor
            .execute_with_selection(draft, selection, language)
            .await;
        // Persist the confirmed (or posted) state even when execution failed
        self.drafts.save_draft(draft).await?;
        outcome
    }

    pub async fn load_draft(&self, id: Uuid) -> AgentResult<Draft> {
        self.drafts
            .load_draft(id)
            .await?
            .ok_or(AgentError::DraftNotFound(id))
    }

    /// Merge a user answer into a draft
    pub async fn answer_clarification(
        &self,
        id: Uuid,
        reason: ReasonCode,
        item_index: Option<usize>,
        value: &str,
    ) -> AgentResult<Draft> {
        let mut draft = self.load_draft(id).await?;
        draft.resolve_clarification(reason, item_index, value)?;
        self.drafts.save_draft(&draft).await?;
        Ok(draft)
    }

    pub async fn confirm_draft(&self, id: Uuid) -> AgentResult<Draft> {
        let mut draft = self.load_draft(id).await?;
        draft.confirm()?;
        self.drafts.save_draft(&draft).await?;
        Ok(draft)
    }

    pub async fn reject_draft(&self, id: Uuid) -> AgentResult<Draft> {
        let mut draft = self.load_draft(id).await?;
        draft.reject()?;
        self.drafts.save_draft(&draft).await?;
        Ok(draft)
    }

    /// Execute a confirmed draft, optionally with a chosen candidate
    pub async fn execute_draft(
        &self,
        id: Uuid,
        selection: Option<Uuid>,
        language: Language,
    ) -> AgentResult<(Draft, ExecutionOutcome)> {
        let mut draft = self.load_draft(id).await?;
        let outcome = self.execute_and_save(&mut draft, selection, language).await?;
        Ok((draft, outcome))
    }
}

fn into_clause_outcome(
    draft: Draft,
    outcome: ExecutionOutcome,
    render_data: RenderData,
) -> ClauseOutcome {
    match outcome {
        ExecutionOutcome::Done { result } => ClauseOutcome::Executed {
            draft,
            result,
            render_data,
        },
        ExecutionOutcome::NeedsSelection { entity, candidates } => ClauseOutcome::NeedsSelection {
            draft,
            entity,
            candidates,
        },
        ExecutionOutcome::Refused { missing } => ClauseOutcome::Refused { draft, missing },
        ExecutionOutcome::NotFound { entity, query } => ClauseOutcome::Failed {
            reason: match entity {
                EntityKind::Customer => format!("no customer matching '{}'", query),
                EntityKind::RateRow => format!("no rate row matching '{}'", query),
            },
            draft: Some(draft),
        },
        ExecutionOutcome::SelectionMismatch { selected } => ClauseOutcome::Failed {
            reason: format!("selected candidate {} no longer matches", selected),
            draft: Some(draft),
        },
        ExecutionOutcome::Handoff { .. } => ClauseOutcome::AwaitingConfirmation { draft, render_data },
    }
}
