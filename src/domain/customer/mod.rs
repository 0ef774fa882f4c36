//! Customer domain module
//!
//! Customers belong to a merchant; listings are always scoped by merchant.

mod entity;
mod repository;

pub use entity::{Customer, CustomerId, NewCustomer};
pub use repository::CustomerRepository;
