//! In-memory customer repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::customer::{Customer, CustomerId, CustomerRepository, NewCustomer};
use crate::domain::error::DomainError;

/// In-memory implementation of CustomerRepository
#[derive(Debug, Clone)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<String, Customer>>>,
}

impl InMemoryCustomerRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            customers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository holding a few customers across two merchants
    pub async fn seeded() -> Result<Self, DomainError> {
        let repo = Self::new();

        let seed = [
            ("5", "Ada Lovelace", "ada@example.com"),
            ("5", "Grace Hopper", "grace@example.com"),
            ("5", "Alan Turing", "alan@example.com"),
            ("7", "Edsger Dijkstra", "edsger@example.com"),
            ("7", "Barbara Liskov", "barbara@example.com"),
        ];

        for (merchant_id, name, email) in seed {
            let customer = Customer::create(NewCustomer {
                merchant_id: merchant_id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
            })?;
            repo.create(customer).await?;
        }

        Ok(repo)
    }
}

impl Default for InMemoryCustomerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn list(&self, merchant_id: Option<&str>) -> Result<Vec<Customer>, DomainError> {
        let customers = self.customers.read().await;
        let mut result: Vec<Customer> = customers
            .values()
            .filter(|c| merchant_id.is_none_or(|m| c.merchant_id == m))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        Ok(result)
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        let customers = self.customers.read().await;
        Ok(customers.get(id.as_str()).cloned())
    }

    async fn create(&self, customer: Customer) -> Result<Customer, DomainError> {
        let mut customers = self.customers.write().await;

        let duplicate = customers
            .values()
            .any(|c| c.merchant_id == customer.merchant_id && c.email == customer.email);

        if duplicate || customers.contains_key(customer.id.as_str()) {
            return Err(DomainError::conflict(format!(
                "Customer '{}' already exists for merchant '{}'",
                customer.email, customer.merchant_id
            )));
        }

        customers.insert(customer.id.as_str().to_string(), customer.clone());
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(merchant_id: &str, email: &str) -> Customer {
        Customer::create(NewCustomer {
            merchant_id: merchant_id.to_string(),
            name: "Test Customer".to_string(),
            email: email.to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryCustomerRepository::new();
        let customer = repo.create(new_customer("5", "a@example.com")).await.unwrap();

        let found = repo.get(&customer.id).await.unwrap();
        assert_eq!(found, Some(customer));

        let missing = repo.get(&CustomerId::new("cus_missing")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_merchant() {
        let repo = InMemoryCustomerRepository::seeded().await.unwrap();

        assert_eq!(repo.list(Some("5")).await.unwrap().len(), 3);
        assert_eq!(repo.list(Some("7")).await.unwrap().len(), 2);
        assert!(repo.list(Some("9")).await.unwrap().is_empty());
        assert_eq!(repo.list(None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_email_within_merchant_conflicts() {
        let repo = InMemoryCustomerRepository::new();
        repo.create(new_customer("5", "a@example.com")).await.unwrap();

        let result = repo.create(new_customer("5", "A@example.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));

        assert!(repo.create(new_customer("7", "a@example.com")).await.is_ok());
    }
}
