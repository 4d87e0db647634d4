//! Daily rate board

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use voice_command_core::{RateQuery, RateRow, RateStore, Result};

use crate::error::PersistenceError;

#[derive(Default)]
pub struct InMemoryRateStore {
    rows: RwLock<HashMap<Uuid, RateRow>>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert without going through the async trait (seeding)
    pub fn insert_row(&self, row: RateRow) {
        self.rows.write().insert(row.id, row);
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Every row, sorted by date then brand
    pub fn all(&self) -> Vec<RateRow> {
        let mut rows: Vec<RateRow> = self.rows.read().values().cloned().collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.brand.cmp(&b.brand)));
        rows
    }
}

#[async_trait]
impl RateStore for InMemoryRateStore {
    async fn find_rates(&self, query: &RateQuery) -> Result<Vec<RateRow>> {
        let mut rows: Vec<RateRow> = self
            .rows
            .read()
            .values()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.brand
                .cmp(&b.brand)
                .then_with(|| a.size.cmp(&b.size))
                .then_with(|| a.date.cmp(&b.date))
        });
        Ok(rows)
    }

    async fn insert_rate(&self, row: RateRow) -> Result<RateRow> {
        self.rows.write().insert(row.id, row.clone());
        tracing::info!(
            id = %row.id,
            brand = %row.brand,
            size = ?row.size,
            price = row.price,
            "Rate row inserted"
        );
        Ok(row)
    }

    async fn update_price(&self, id: Uuid, price: f64) -> Result<RateRow> {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&id)
            .ok_or(PersistenceError::NotFound { kind: "rate row", id })?;
        let previous = row.price;
        row.price = price;
        tracing::info!(%id, previous, price, "Rate row updated");
        Ok(row.clone())
    }
}
