//! Customer entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Customer identifier, `cus_` followed by a simple UUID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("cus_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input for creating a customer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub merchant_id: String,
    pub name: String,
    pub email: String,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.merchant_id.trim().is_empty() {
            return Err(DomainError::validation("merchantId must not be empty"));
        }

        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(DomainError::validation(format!(
                "'{}' is not a valid email address",
                self.email
            ))),
        }
    }
}

/// A merchant's customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub merchant_id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Validates the input and assigns a fresh id
    pub fn create(new: NewCustomer) -> Result<Self, DomainError> {
        new.validate()?;

        Ok(Self {
            id: CustomerId::generate(),
            merchant_id: new.merchant_id.trim().to_string(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            merchant_id: "5".to_string(),
            name: " Ada Lovelace ".to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_create_normalizes_fields() {
        let customer = Customer::create(new_customer("Ada@Example.com")).unwrap();

        assert!(customer.id.as_str().starts_with("cus_"));
        assert_eq!(customer.name, "Ada Lovelace");
        assert_eq!(customer.email, "ada@example.com");
    }

    #[test]
    fn test_invalid_email_rejected() {
        for email in ["", "ada", "@example.com", "ada@localhost"] {
            let result = Customer::create(new_customer(email));
            assert!(matches!(result, Err(DomainError::Validation { .. })), "{}", email);
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let customer = Customer::create(new_customer("ada@example.com")).unwrap();
        let json = serde_json::to_value(&customer).unwrap();

        assert_eq!(json["merchantId"], "5");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_new_customer_deserializes_camel_case() {
        let new: NewCustomer = serde_json::from_str(
            r#"{"merchantId": "7", "name": "Grace", "email": "grace@example.com"}"#,
        )
        .unwrap();

        assert_eq!(new.merchant_id, "7");
        assert!(new.validate().is_ok());
    }
}
