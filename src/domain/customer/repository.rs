//! Customer repository trait

use async_trait::async_trait;

use super::entity::{Customer, CustomerId};
use crate::domain::DomainError;

/// Repository for customers
#[async_trait]
pub trait CustomerRepository: Send + Sync + std::fmt::Debug {
    /// List customers, optionally restricted to one merchant, oldest first
    async fn list(&self, merchant_id: Option<&str>) -> Result<Vec<Customer>, DomainError>;

    /// Get a customer by ID
    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError>;

    /// Store a new customer; an email already used within the merchant is a conflict
    async fn create(&self, customer: Customer) -> Result<Customer, DomainError>;
}
