//! Customer endpoint handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{self, ApiError};
use crate::domain::customer::{Customer, CustomerId, NewCustomer};
use crate::domain::notification::Notification;

/// Query string for listing customers
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCustomersQuery {
    pub merchant_id: Option<String>,
}

/// List response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerList {
    pub data: Vec<Customer>,
    pub count: usize,
}

/// GET /v1/customers?merchantId=
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<CustomerList>, ApiError> {
    let merchant_id = query
        .merchant_id
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("merchantId is required").with_param("merchantId"))?;

    debug!(merchant_id = %merchant_id, "Listing customers");

    let data = state.customers.list(Some(&merchant_id)).await?;

    Ok(Json(CustomerList {
        count: data.len(),
        data,
    }))
}

/// GET /v1/customers/{customer_id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    debug!(customer_id = %customer_id, "Getting customer");

    let customer = state
        .customers
        .get(&CustomerId::new(customer_id.as_str()))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Customer '{}' not found", customer_id)))?;

    Ok(Json(customer))
}

/// POST /v1/customers
pub async fn create_customer(
    State(state): State<AppState>,
    types::Json(request): types::Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = state.customers.create(Customer::create(request)?).await?;

    info!(
        customer_id = %customer.id,
        merchant_id = %customer.merchant_id,
        "Customer created"
    );

    state
        .notifications
        .push(Notification::info(format!(
            "Customer {} joined merchant {}",
            customer.name, customer.merchant_id
        )))
        .await;

    Ok((StatusCode::CREATED, Json(customer)))
}
