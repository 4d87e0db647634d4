//! Persistence layer for the command interpreter
//!
//! Provides in-memory implementations of the core store traits:
//! - Daily rate board rows
//! - Customers and recorded payments
//! - Drafts with their clarifications
//!
//! Stores can be seeded from a YAML file at startup.

pub mod customers;
pub mod drafts;
pub mod error;
pub mod rates;
pub mod seed;

pub use customers::InMemoryCustomerStore;
pub use drafts::InMemoryDraftStore;
pub use error::PersistenceError;
pub use rates::InMemoryRateStore;
pub use seed::{SeedCustomer, SeedData, SeedRate};

use std::path::Path;
use std::sync::Arc;

/// Combined persistence layer with all stores
#[derive(Clone, Default)]
pub struct PersistenceLayer {
    pub rates: Arc<InMemoryRateStore>,
    pub customers: Arc<InMemoryCustomerStore>,
    pub drafts: Arc<InMemoryDraftStore>,
}

impl PersistenceLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the stores, loading `seed_file` when given
    pub fn init(seed_file: Option<&Path>) -> Result<Self, PersistenceError> {
        let layer = Self::new();
        if let Some(path) = seed_file {
            let seed = SeedData::from_file(path)?;
            seed.apply(&layer)?;
        }
        Ok(layer)
    }
}
