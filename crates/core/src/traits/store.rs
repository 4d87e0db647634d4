//! Data-store collaborators

use async_trait::async_trait;
use uuid::Uuid;

use crate::command::PaymentMode;
use crate::draft::Draft;
use crate::records::{Customer, PaymentRecord, RateQuery, RateRow};
use crate::Result;

/// Daily rate board
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Rows matching every set field of the query
    async fn find_rates(&self, query: &RateQuery) -> Result<Vec<RateRow>>;

    /// Insert a new row and return it
    async fn insert_rate(&self, row: RateRow) -> Result<RateRow>;

    /// Set the price of an existing row
    async fn update_price(&self, id: Uuid, price: f64) -> Result<RateRow>;
}

/// Customer list
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Fuzzy search by name and/or phone digits. May return many.
    async fn search_customers(
        &self,
        name_hint: Option<&str>,
        phone_hint: Option<&str>,
    ) -> Result<Vec<Customer>>;

    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>>;

    /// Record a payment and return the updated customer
    async fn record_payment(
        &self,
        customer_id: Uuid,
        amount: f64,
        mode: Option<PaymentMode>,
    ) -> Result<(Customer, PaymentRecord)>;
}

/// Draft persistence. Clarifications travel inside the draft.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Create or replace
    async fn save_draft(&self, draft: &Draft) -> Result<()>;

    async fn load_draft(&self, id: Uuid) -> Result<Option<Draft>>;
}
