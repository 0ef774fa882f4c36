//! Infrastructure layer - External service implementations

pub mod cache;
pub mod customer;
pub mod logging;
pub mod notification;
pub mod observability;
pub mod services;
