use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    FundType, MaintenanceRequest, NewTransaction, Transaction, TransactionFilter, TransactionType,
    Unit,
};

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    units: Vec<Unit>,
    requests: Vec<MaintenanceRequest>,
    transactions: RwLock<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new(
        units: Vec<Unit>,
        transactions: Vec<Transaction>,
        requests: Vec<MaintenanceRequest>,
    ) -> Self {
        Self {
            units,
            requests,
            transactions: RwLock::new(transactions),
        }
    }

    /// A small building: the three demo units, a few levies and
    /// expenses across both funds, and some maintenance requests.
    pub fn seeded() -> Self {
        let unit = |n: u128, number: &str, owner: &str, status: &str, email: &str, phone: &str| {
            Unit {
                id: Uuid::from_u128(n),
                unit_number: number.to_string(),
                owner_name: owner.to_string(),
                status: status.to_string(),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
            }
        };
        let units = vec![
            unit(101, "101", "Emma Thompson", "Occupied", "emma.t@example.com", "0412 345 678"),
            unit(203, "203", "James Wilson", "Vacant", "j.wilson@example.com", "0423 456 789"),
            unit(305, "305", "Sarah Rodriguez", "Occupied", "sarah.r@example.com", "0434 567 890"),
        ];

        let day = |m: u32, d: u32| -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, m, d, 0, 0, 0)
                .single()
                .unwrap_or_default()
        };
        let tx = |n: u128,
                  amount: f64,
                  kind: TransactionType,
                  fund: FundType,
                  description: &str,
                  date: DateTime<Utc>,
                  unit: Option<&Unit>| Transaction {
            id: Uuid::from_u128(1000 + n),
            amount,
            kind,
            fund_type: fund,
            description: description.to_string(),
            transaction_date: date,
            unit_id: unit.map(|u| u.id),
            unit: unit.map(Unit::unit_ref),
        };
        use FundType::{Admin, Capital};
        use TransactionType::{Expense, Income};
        let transactions = vec![
            tx(1, 1250.0, Income, Admin, "Q2 Admin Fee Payment", day(4, 1), Some(&units[0])),
            tx(2, 980.0, Income, Admin, "Q2 Admin Fee Payment", day(4, 1), Some(&units[2])),
            tx(3, 750.0, Income, Capital, "Q2 Capital Works Levy", day(4, 1), Some(&units[0])),
            tx(4, 420.0, Expense, Admin, "Common area cleaning", day(4, 10), None),
            tx(5, 3200.0, Expense, Capital, "Roof membrane repair", day(5, 2), None),
            tx(6, 185.5, Expense, Admin, "Building insurance excess", day(5, 20), None),
        ];

        let req = |n: u128, unit: Option<&Unit>, title: &str, description: &str, status: &str, priority: &str, date: DateTime<Utc>| {
            MaintenanceRequest {
                id: Uuid::from_u128(2000 + n),
                unit: unit.map(Unit::unit_ref),
                title: title.to_string(),
                description: description.to_string(),
                status: status.to_string(),
                priority: priority.to_string(),
                created_at: date,
            }
        };
        let requests = vec![
            req(1, Some(&units[0]), "Leaking tap", "Kitchen mixer drips constantly", "Open", "Medium", day(4, 3)),
            req(2, Some(&units[2]), "Intercom fault", "Buzzer does not ring in the unit", "In Progress", "High", day(4, 8)),
            req(3, None, "Lobby light out", "Downlight by the letterboxes", "Completed", "Low", day(3, 28)),
        ];

        Self::new(units, transactions, requests)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let transactions = self
            .transactions
            .read()
            .map_err(|err| StoreError::Rejected(err.to_string()))?;
        Ok(transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, StoreError> {
        let t = Transaction {
            id: Uuid::new_v4(),
            amount: new.amount,
            kind: new.kind,
            fund_type: new.fund_type.clone(),
            description: new.description.clone(),
            transaction_date: new.transaction_date.unwrap_or_else(Utc::now),
            unit_id: None,
            unit: None,
        };
        self.transactions
            .write()
            .map_err(|err| StoreError::Rejected(err.to_string()))?
            .push(t.clone());
        Ok(t)
    }

    async fn list_units(&self) -> Result<Vec<Unit>, StoreError> {
        Ok(self.units.clone())
    }

    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>, StoreError> {
        Ok(self.requests.clone())
    }
}
