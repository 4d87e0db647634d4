//! Executor
//!
//! Applies confirmed drafts to the data store. Every intent that looks an
//! entity up by name goes through the same 0 / 1 / many branch: none is a
//! reported outcome, one proceeds, many returns the candidates and mutates
//! nothing.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use voice_command_core::command::format_number;
use voice_command_core::{
    CanonicalCommand, Customer, CustomerStore, Draft, DraftStatus, Intent, Language,
    PaymentRecord, RateQuery, RateRow, RateStore,
};

use crate::error::{AgentError, AgentResult};

/// Kind of entity a selection is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    RateRow,
    Customer,
}

/// One selectable candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub label: String,
}

/// Brand / size / price triple shown for a rate query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLine {
    pub brand: String,
    pub size: Option<String>,
    pub price: f64,
}

impl From<&RateRow> for RateLine {
    fn from(row: &RateRow) -> Self {
        Self {
            brand: row.brand.clone(),
            size: row.size.clone(),
            price: row.price,
        }
    }
}

/// What a successful execution did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExecutionResult {
    RateInserted { row: RateRow },
    RateUpdated { row: RateRow, previous_price: f64 },
    Rates { lines: Vec<RateLine> },
    ReminderPrepared { customer: Customer, message: String },
    Ledger { customer: Customer },
    LedgerShared { customer: Customer, message: String },
    PaymentRecorded { customer: Customer, payment: PaymentRecord },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Done { result: ExecutionResult },
    /// More than one match; re-run with one of the candidate ids
    NeedsSelection {
        entity: EntityKind,
        candidates: Vec<Candidate>,
    },
    /// Nothing matched the name hint
    NotFound { entity: EntityKind, query: String },
    /// A required field is missing; nothing was attempted
    Refused { missing: Vec<String> },
    /// The selected id is not among the current matches
    SelectionMismatch { selected: Uuid },
    /// Owned by another screen
    Handoff { intent: Intent },
}

impl ExecutionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionOutcome::Done { .. } => "done",
            ExecutionOutcome::NeedsSelection { .. } => "needs_selection",
            ExecutionOutcome::NotFound { .. } => "not_found",
            ExecutionOutcome::Refused { .. } => "refused",
            ExecutionOutcome::SelectionMismatch { .. } => "selection_mismatch",
            ExecutionOutcome::Handoff { .. } => "handoff",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ExecutionOutcome::Done { .. })
    }
}

/// Result of the shared lookup branch
enum Resolution<T> {
    None,
    One(T),
    Many(Vec<T>),
    Mismatch(Uuid),
}

/// Apply the 0 / 1 / many rule, narrowed by an explicit selection
fn resolve<T>(found: Vec<T>, selection: Option<Uuid>, id: impl Fn(&T) -> Uuid) -> Resolution<T> {
    if let Some(selected) = selection {
        return match found.into_iter().find(|candidate| id(candidate) == selected) {
            Some(candidate) => Resolution::One(candidate),
            None => Resolution::Mismatch(selected),
        };
    }

    let mut found = found;
    match found.len() {
        0 => Resolution::None,
        1 => Resolution::One(found.remove(0)),
        _ => Resolution::Many(found),
    }
}

pub struct Executor {
    rates: Arc<dyn RateStore>,
    customers: Arc<dyn CustomerStore>,
}

impl Executor {
    pub fn new(rates: Arc<dyn RateStore>, customers: Arc<dyn CustomerStore>) -> Self {
        Self { rates, customers }
    }

    /// Intents this executor applies itself
    pub fn handles(intent: Intent) -> bool {
        match intent {
            Intent::UpdateRate
            | Intent::CheckRate
            | Intent::PaymentReminder
            | Intent::CheckLedger
            | Intent::ShareLedger
            | Intent::AddPayment => true,
            Intent::CheckStock
            | Intent::AddStockManual
            | Intent::TransferStock
            | Intent::CreateEstimate
            | Intent::CreateOrder
            | Intent::CheckOrderStatus
            | Intent::CalculateWeight
            | Intent::CalculatePrice
            | Intent::CancelAction
            | Intent::ConfirmAction => false,
        }
    }

    /// Fields the intent needs that the command does not carry
    pub fn missing_fields(command: &CanonicalCommand) -> Vec<String> {
        let mut missing = Vec::new();
        let first_brand = command.items.first().and_then(|item| item.brand.as_ref());

        match command.intent {
            Intent::UpdateRate => {
                if first_brand.is_none() {
                    missing.push("brand".to_string());
                }
                if command.amount().is_none() {
                    missing.push("price".to_string());
                }
            }
            Intent::PaymentReminder | Intent::CheckLedger | Intent::ShareLedger => {
                if command.customer_name().is_none() && command.customer_phone().is_none() {
                    missing.push("customer".to_string());
                }
            }
            Intent::AddPayment => {
                if command.customer_name().is_none() && command.customer_phone().is_none() {
                    missing.push("customer".to_string());
                }
                if command.amount().is_none() {
                    missing.push("amount".to_string());
                }
            }
            _ => {}
        }
        missing
    }

    /// Execute a confirmed draft; marks it posted on success
    pub async fn execute(&self, draft: &mut Draft, language: Language) -> AgentResult<ExecutionOutcome> {
        self.execute_with_selection(draft, None, language).await
    }

    /// Re-run a draft with the candidate the user picked
    pub async fn execute_with_selection(
        &self,
        draft: &mut Draft,
        selection: Option<Uuid>,
        language: Language,
    ) -> AgentResult<ExecutionOutcome> {
        if draft.status != DraftStatus::Confirmed {
            return Err(AgentError::NotConfirmed(draft.status));
        }

        let outcome = self.execute_command(&draft.command, selection, language).await?;
        metrics::counter!("voice_command_executions_total", "outcome" => outcome.label())
            .increment(1);

        if outcome.is_done() {
            draft.mark_posted()?;
        }
        tracing::info!(
            draft_id = %draft.id,
            intent = %draft.command.intent,
            outcome = outcome.label(),
            "Draft executed"
        );
        Ok(outcome)
    }

    /// Execute a command without any draft bookkeeping
    pub async fn execute_command(
        &self,
        command: &CanonicalCommand,
        selection: Option<Uuid>,
        language: Language,
    ) -> AgentResult<ExecutionOutcome> {
        if !Self::handles(command.intent) {
            return Ok(ExecutionOutcome::Handoff {
                intent: command.intent,
            });
        }

        let missing = Self::missing_fields(command);
        if !missing.is_empty() {
            return Ok(ExecutionOutcome::Refused { missing });
        }

        match command.intent {
            Intent::UpdateRate => self.update_rate(command, selection).await,
            Intent::CheckRate => self.check_rate(command).await,
            Intent::PaymentReminder
            | Intent::CheckLedger
            | Intent::ShareLedger
            | Intent::AddPayment => self.customer_action(command, selection, language).await,
            other => Ok(ExecutionOutcome::Handoff { intent: other }),
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn rate_query(&self, command: &CanonicalCommand) -> RateQuery {
        let item = command.items.first();
        RateQuery {
            category: item.and_then(|i| i.category),
            brand: item.and_then(|i| i.brand.clone()),
            size: item.and_then(|i| i.size.clone()),
            date: Some(self.today()),
        }
    }

    async fn update_rate(
        &self,
        command: &CanonicalCommand,
        selection: Option<Uuid>,
    ) -> AgentResult<ExecutionOutcome> {
        let query = self.rate_query(command);
        let (Some(brand), Some(price)) = (query.brand.clone(), command.amount()) else {
            return Ok(ExecutionOutcome::Refused {
                missing: Self::missing_fields(command),
            });
        };

        // Size is part of the row key here, not a filter: an update that
        // names no size never touches a sized row
        let mut found = self.rates.find_rates(&query).await?;
        found.retain(|row| row.has_size(query.size.as_deref()));
        match resolve(found, selection, |row| row.id) {
            Resolution::None => {
                let unit = command.items.first().and_then(|i| i.uom);
                let row = RateRow::new(query.category, brand, query.size, price, unit, self.today());
                let row = self.rates.insert_rate(row).await?;
                Ok(ExecutionOutcome::Done {
                    result: ExecutionResult::RateInserted { row },
                })
            }
            Resolution::One(existing) => {
                let previous_price = existing.price;
                let row = self.rates.update_price(existing.id, price).await?;
                Ok(ExecutionOutcome::Done {
                    result: ExecutionResult::RateUpdated { row, previous_price },
                })
            }
            Resolution::Many(rows) => Ok(ExecutionOutcome::NeedsSelection {
                entity: EntityKind::RateRow,
                candidates: rows.iter().map(rate_candidate).collect(),
            }),
            Resolution::Mismatch(selected) => Ok(ExecutionOutcome::SelectionMismatch { selected }),
        }
    }

    async fn check_rate(&self, command: &CanonicalCommand) -> AgentResult<ExecutionOutcome> {
        let rows = self.rates.find_rates(&self.rate_query(command)).await?;
        Ok(ExecutionOutcome::Done {
            result: ExecutionResult::Rates {
                lines: rows.iter().map(RateLine::from).collect(),
            },
        })
    }

    async fn customer_action(
        &self,
        command: &CanonicalCommand,
        selection: Option<Uuid>,
        language: Language,
    ) -> AgentResult<ExecutionOutcome> {
        let name = command.customer_name();
        let phone = command.customer_phone();
        let found = self.customers.search_customers(name, phone).await?;

        let customer = match resolve(found, selection, |c| c.id) {
            Resolution::None => {
                return Ok(ExecutionOutcome::NotFound {
                    entity: EntityKind::Customer,
                    query: name.or(phone).unwrap_or_default().to_string(),
                })
            }
            Resolution::Many(customers) => {
                return Ok(ExecutionOutcome::NeedsSelection {
                    entity: EntityKind::Customer,
                    candidates: customers.iter().map(customer_candidate).collect(),
                })
            }
            Resolution::Mismatch(selected) => {
                return Ok(ExecutionOutcome::SelectionMismatch { selected })
            }
            Resolution::One(customer) => customer,
        };

        let result = match command.intent {
            Intent::PaymentReminder => ExecutionResult::ReminderPrepared {
                message: reminder_message(&customer, language),
                customer,
            },
            Intent::ShareLedger => ExecutionResult::LedgerShared {
                message: ledger_message(&customer, language),
                customer,
            },
            Intent::AddPayment => {
                let amount = command.amount().unwrap_or_default();
                let mode = command.financials.as_ref().and_then(|f| f.mode);
                let (customer, payment) =
                    self.customers.record_payment(customer.id, amount, mode).await?;
                ExecutionResult::PaymentRecorded { customer, payment }
            }
            _ => ExecutionResult::Ledger { customer },
        };
        Ok(ExecutionOutcome::Done { result })
    }
}

fn rate_candidate(row: &RateRow) -> Candidate {
    let mut label = row.brand.clone();
    if let Some(category) = row.category {
        label.push_str(&format!(" {}", category));
    }
    if let Some(size) = &row.size {
        label.push_str(&format!(" {}", size));
    }
    label.push_str(&format!(" ₹{}", format_number(row.price)));
    Candidate { id: row.id, label }
}

fn customer_candidate(customer: &Customer) -> Candidate {
    let label = match &customer.phone {
        Some(phone) => format!("{} ({})", customer.name, phone),
        None => customer.name.clone(),
    };
    Candidate {
        id: customer.id,
        label,
    }
}

fn reminder_message(customer: &Customer, language: Language) -> String {
    let due = format_number(customer.balance_due);
    match language {
        Language::Hindi => format!(
            "नमस्ते {} जी, आपका ₹{} बकाया है। कृपया जल्द भुगतान करें।",
            customer.name, due
        ),
        Language::English => format!(
            "Dear {}, your outstanding balance is ₹{}. Kindly clear it at the earliest.",
            customer.name, due
        ),
    }
}

fn ledger_message(customer: &Customer, language: Language) -> String {
    let due = format_number(customer.balance_due);
    match language {
        Language::Hindi => format!("{} जी, आपके खाते में ₹{} बाकी है।", customer.name, due),
        Language::English => format!("{}, balance due on your account: ₹{}", customer.name, due),
    }
}
