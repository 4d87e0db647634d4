//! Records exchanged with the data store

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::{Category, PaymentMode, Uom};

/// One row of the daily rate board, keyed by (category, brand, size, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub id: Uuid,
    pub category: Option<Category>,
    pub brand: String,
    pub size: Option<String>,
    pub price: f64,
    /// Unit the price is quoted per
    pub unit: Option<Uom>,
    pub date: NaiveDate,
}

impl RateRow {
    pub fn new(
        category: Option<Category>,
        brand: impl Into<String>,
        size: Option<String>,
        price: f64,
        unit: Option<Uom>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            brand: brand.into(),
            size,
            price,
            unit,
            date,
        }
    }

    /// Exact size key: a missing size only equals a size-less row
    pub fn has_size(&self, size: Option<&str>) -> bool {
        match (self.size.as_deref(), size) {
            (Some(own), Some(size)) => own.eq_ignore_ascii_case(size),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Filter over the rate board. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateQuery {
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub date: Option<NaiveDate>,
}

impl RateQuery {
    /// Case-insensitive match on every field that is set
    pub fn matches(&self, row: &RateRow) -> bool {
        if let Some(category) = self.category {
            if row.category != Some(category) {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if !row.brand.eq_ignore_ascii_case(brand) {
                return false;
            }
        }
        if let Some(size) = &self.size {
            match &row.size {
                Some(row_size) if row_size.eq_ignore_ascii_case(size) => {}
                _ => return false,
            }
        }
        if let Some(date) = self.date {
            if row.date != date {
                return false;
            }
        }
        true
    }
}

/// Customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    /// Outstanding balance in rupees
    pub balance_due: f64,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: Option<String>, balance_due: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone,
            balance_due,
        }
    }
}

/// Payment recorded against a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: f64,
    pub mode: Option<PaymentMode>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_query_matching() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let row = RateRow::new(Some(Category::Tmt), "Ankur", Some("8mm".into()), 65.0, None, date);

        let query = RateQuery {
            brand: Some("ankur".into()),
            size: Some("8MM".into()),
            date: Some(date),
            ..Default::default()
        };
        assert!(query.matches(&row));

        let other_size = RateQuery {
            size: Some("10mm".into()),
            ..query.clone()
        };
        assert!(!other_size.matches(&row));
        assert!(RateQuery::default().matches(&row));
    }

    #[test]
    fn test_size_key_is_exact() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let sized = RateRow::new(None, "Ankur", Some("8mm".into()), 65.0, None, date);
        let bare = RateRow::new(None, "Ultratech", None, 410.0, None, date);

        assert!(sized.has_size(Some("8MM")));
        assert!(!sized.has_size(None));
        assert!(bare.has_size(None));
        assert!(!bare.has_size(Some("8mm")));
    }
}
