//! YAML seed data for the in-memory stores
//!
//! ```yaml
//! customers:
//!   - name: Ramesh Kumar
//!     phone: "9876543210"
//!     balance_due: 12000
//! rates:
//!   - category: tmt
//!     brand: Ankur
//!     size: 8mm
//!     price: 64
//!     date: 2026-03-01
//! ```

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::path::Path;

use voice_command_core::{Category, Customer, RateRow, Uom};

use crate::error::PersistenceError;
use crate::PersistenceLayer;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub customers: Vec<SeedCustomer>,
    #[serde(default)]
    pub rates: Vec<SeedRate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub balance_due: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRate {
    #[serde(default)]
    pub category: Option<Category>,
    pub brand: String,
    #[serde(default)]
    pub size: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub unit: Option<Uom>,
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self, PersistenceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, PersistenceError> {
        let seed: SeedData = serde_yaml::from_str(text)?;
        seed.check()?;
        Ok(seed)
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if let Some(c) = self.customers.iter().find(|c| c.name.trim().is_empty()) {
            return Err(PersistenceError::InvalidSeed(format!(
                "customer with empty name (phone {:?})",
                c.phone
            )));
        }
        if let Some(r) = self.rates.iter().find(|r| r.price < 0.0) {
            return Err(PersistenceError::InvalidSeed(format!(
                "negative price for {}",
                r.brand
            )));
        }
        Ok(())
    }

    /// Load every record into the layer's stores
    pub fn apply(&self, layer: &PersistenceLayer) -> Result<(), PersistenceError> {
        let today = Utc::now().date_naive();

        for c in &self.customers {
            layer
                .customers
                .insert(Customer::new(c.name.trim(), c.phone.clone(), c.balance_due));
        }
        for r in &self.rates {
            layer.rates.insert_row(RateRow::new(
                r.category,
                r.brand.trim(),
                r.size.clone(),
                r.price,
                r.unit,
                r.date.unwrap_or(today),
            ));
        }

        tracing::info!(
            customers = self.customers.len(),
            rates = self.rates.len(),
            "Seed data loaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use voice_command_core::CustomerStore;

    const SEED: &str = r#"
customers:
  - name: Ramesh Kumar
    phone: "9876543210"
    balance_due: 12000
  - name: Suresh Traders
rates:
  - category: tmt
    brand: Ankur
    size: 8mm
    price: 64
    date: 2026-03-01
  - brand: Ultratech
    price: 410
    unit: bags
"#;

    #[tokio::test]
    async fn test_seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let layer = PersistenceLayer::init(Some(file.path())).unwrap();
        assert_eq!(layer.rates.len(), 2);

        let found = layer
            .customers
            .search_customers(Some("ramesh"), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].balance_due, 12000.0);
    }

    #[test]
    fn test_rejects_empty_customer_name() {
        let result = SeedData::from_yaml("customers:\n  - name: \"  \"\n");
        assert!(matches!(result, Err(PersistenceError::InvalidSeed(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = PersistenceLayer::init(Some(Path::new("/nonexistent/seed.yaml")));
        assert!(matches!(result, Err(PersistenceError::Io(_))));
    }
}
