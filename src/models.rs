use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Which of the two building funds a transaction is booked against.
///
/// The ledger column is free text, so values other than `admin` and
/// `capital` survive a round trip as `Other` and are ignored by the
/// balance totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundType {
    Admin,
    Capital,
    Other(String),
}

impl FundType {
    pub fn as_str(&self) -> &str {
        match self {
            FundType::Admin => "admin",
            FundType::Capital => "capital",
            FundType::Other(s) => s,
        }
    }
}

impl From<&str> for FundType {
    fn from(s: &str) -> Self {
        match s {
            "admin" => FundType::Admin,
            "capital" => FundType::Capital,
            other => FundType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FundType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionType::Income),
            "Expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The joined `units` columns a transaction or request carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitRef {
    pub unit_number: String,
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub id: Uuid,
    pub unit_number: String,
    pub owner_name: String,
    pub status: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Unit {
    pub fn unit_ref(&self) -> UnitRef {
        UnitRef {
            unit_number: self.unit_number.clone(),
            owner_name: self.owner_name.clone(),
        }
    }
}

/// A ledger row. `amount` is a magnitude; the sign comes from `kind`.
/// It may be NaN when the stored value was not numeric.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub kind: TransactionType,
    pub fund_type: FundType,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub unit_id: Option<Uuid>,
    pub unit: Option<UnitRef>,
}

/// Candidate row for the ledger. Nothing is checked here; the store
/// decides what it accepts.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub kind: TransactionType,
    pub description: String,
    pub fund_type: FundType,
    /// `None` means "now", resolved by the store at insert time.
    pub transaction_date: Option<DateTime<Utc>>,
}

/// Exact-match filters for `list_transactions`; `None` means unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub fund_type: Option<FundType>,
    pub kind: Option<TransactionType>,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        self.fund_type.as_ref().map_or(true, |f| *f == t.fund_type)
            && self.kind.map_or(true, |k| k == t.kind)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub unit: Option<UnitRef>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}
