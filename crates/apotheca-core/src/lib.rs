//! Pharmacy platform services: ownership guard, inventory, availability
//! notifications, chat aggregation, catalog/directory and object storage.
//!
//! Every service is built over an injected `Arc<dyn Store>` and exposes
//! synchronous methods, except where object storage or the notification
//! fan-out needs to await.

pub mod accounts;
pub mod catalog;
pub mod chat;
pub mod error;
pub mod inventory;
pub mod notifications;
pub mod object_store;
pub mod ownership;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{ServiceError, ServiceResult};
