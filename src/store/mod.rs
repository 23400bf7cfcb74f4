//! Access to the hosted relational store.
//!
//! Every page goes through [`Store`]; reads and writes are independent
//! round trips with no transaction spanning them, so a write made
//! elsewhere only shows up on the next read.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MaintenanceRequest, NewTransaction, Transaction, TransactionFilter, Unit};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row came back in a shape the domain cannot hold.
    #[error("cannot decode row: {0}")]
    Decode(String),

    /// The store refused a write.
    #[error("rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Ledger rows in insertion order, each joined to its unit when it has one.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError>;

    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, StoreError>;

    async fn list_units(&self) -> Result<Vec<Unit>, StoreError>;

    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>, StoreError>;
}
