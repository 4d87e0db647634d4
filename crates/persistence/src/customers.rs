//! Customer list and payments

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use voice_command_core::{Customer, CustomerStore, PaymentMode, PaymentRecord, Result};

use crate::error::PersistenceError;

#[derive(Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<Uuid, Customer>>,
    payments: RwLock<Vec<PaymentRecord>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) -> Customer {
        self.customers.write().insert(customer.id, customer.clone());
        customer
    }

    /// Payments recorded against a customer, oldest first
    pub fn payments_for(&self, customer_id: Uuid) -> Vec<PaymentRecord> {
        self.payments
            .read()
            .iter()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect()
    }
}

/// Loose name match: either side contains the other, or any word of the
/// stored name starts with the hint
fn name_matches(name: &str, hint: &str) -> bool {
    let name = name.to_lowercase();
    let hint = hint.trim().to_lowercase();
    if hint.is_empty() {
        return false;
    }
    name.contains(&hint)
        || hint.contains(&name)
        || name.split_whitespace().any(|word| word.starts_with(&hint))
}

fn phone_matches(phone: Option<&str>, hint: &str) -> bool {
    let digits: String = hint.chars().filter(char::is_ascii_digit).collect();
    !digits.is_empty() && phone.map_or(false, |p| p.contains(&digits))
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn search_customers(
        &self,
        name_hint: Option<&str>,
        phone_hint: Option<&str>,
    ) -> Result<Vec<Customer>> {
        if name_hint.is_none() && phone_hint.is_none() {
            return Ok(Vec::new());
        }

        let mut found: Vec<Customer> = self
            .customers
            .read()
            .values()
            .filter(|c| {
                let by_name = name_hint.map_or(true, |hint| name_matches(&c.name, hint));
                let by_phone =
                    phone_hint.map_or(true, |hint| phone_matches(c.phone.as_deref(), hint));
                by_name && by_phone
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.customers.read().get(&id).cloned())
    }

    async fn record_payment(
        &self,
        customer_id: Uuid,
        amount: f64,
        mode: Option<PaymentMode>,
    ) -> Result<(Customer, PaymentRecord)> {
        let customer = {
            let mut customers = self.customers.write();
            let customer = customers.get_mut(&customer_id).ok_or(PersistenceError::NotFound {
                kind: "customer",
                id: customer_id,
            })?;
            customer.balance_due -= amount;
            customer.clone()
        };

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            customer_id,
            amount,
            mode,
            recorded_at: Utc::now(),
        };
        self.payments.write().push(record.clone());

        tracing::info!(
            customer = %customer.name,
            amount,
            mode = ?mode,
            balance_due = customer.balance_due,
            "Payment recorded"
        );
        Ok((customer, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryCustomerStore {
        let store = InMemoryCustomerStore::new();
        store.insert(Customer::new("Ramesh Kumar", Some("9876543210".into()), 12000.0));
        store.insert(Customer::new("Ramesh Gupta", Some("9123456780".into()), 500.0));
        store.insert(Customer::new("Suresh Traders", None, 0.0));
        store
    }

    #[tokio::test]
    async fn test_name_search_can_return_many() {
        let store = store();
        let found = store.search_customers(Some("ramesh"), None).await.unwrap();
        assert_eq!(found.len(), 2);

        let found = store.search_customers(Some("Suresh"), None).await.unwrap();
        assert_eq!(found.len(), 1);

        let found = store.search_customers(Some("Mahesh"), None).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_phone_narrows_name() {
        let store = store();
        let found = store
            .search_customers(Some("ramesh"), Some("3210"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ramesh Kumar");
    }

    #[tokio::test]
    async fn test_no_hints_finds_nothing() {
        assert!(store().search_customers(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_payment() {
        let store = store();
        let suresh = store.search_customers(Some("suresh"), None).await.unwrap()[0].clone();
        let (updated, record) = store
            .record_payment(suresh.id, 250.0, Some(PaymentMode::Cash))
            .await
            .unwrap();
        assert_eq!(updated.balance_due, -250.0);
        assert_eq!(record.amount, 250.0);
        assert_eq!(store.payments_for(suresh.id).len(), 1);
    }
}
