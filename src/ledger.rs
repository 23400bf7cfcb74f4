//! Fund balances and derived views over the transaction ledger.
//!
//! Nothing here is cached: every page load pulls the whole ledger from the
//! store and recomputes [`LedgerSnapshot`] from scratch. After a write the
//! caller asks for a new snapshot instead of patching the old one.
//!
//! Amounts are plain `f64`. A non-numeric stored amount becomes NaN and
//! turns its fund total into NaN without any error being raised.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{FundType, NewTransaction, Transaction, TransactionFilter, TransactionType},
    store::{Store, StoreError},
};

/// Description fragment that marks an income row as a levy.
pub const LEVY_MARKER: &str = "Fee Payment";

/// Every levy is reported with this status; no due date is checked.
pub const LEVY_STATUS: &str = "overdue";

const UNKNOWN: &str = "Unknown";

/// Lenient number parse: the longest numeric prefix after leading
/// whitespace, or NaN when there is none.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.trim_start();
    let b = s.as_bytes();
    let mut end = 0;

    if matches!(b.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if b.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits = |from: usize| b[from..].iter().take_while(|c| c.is_ascii_digit()).count();

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FundBalances {
    pub admin_fund: f64,
    pub capital_works_fund: f64,
}

/// Signed sum per fund. Rows with a fund other than admin/capital count
/// towards neither total.
pub fn fund_balances(transactions: &[Transaction]) -> FundBalances {
    transactions
        .iter()
        .fold(FundBalances::default(), |mut acc, t| {
            let total = match t.fund_type {
                FundType::Admin => &mut acc.admin_fund,
                FundType::Capital => &mut acc.capital_works_fund,
                FundType::Other(_) => return acc,
            };
            match t.kind {
                TransactionType::Income => *total += t.amount,
                TransactionType::Expense => *total -= t.amount,
            }
            acc
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Levy {
    pub id: Uuid,
    pub unit: String,
    pub owner: String,
    pub amount: f64,
    /// The transaction date itself, not a computed due date.
    pub due_date: NaiveDate,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingExpense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub fund: FundType,
}

/// A missing join and an empty joined value both read as [`UNKNOWN`].
fn or_unknown(v: Option<&str>) -> String {
    v.filter(|v| !v.is_empty()).unwrap_or(UNKNOWN).to_string()
}

pub fn is_levy(t: &Transaction) -> bool {
    t.kind == TransactionType::Income && t.unit_id.is_some() && t.description.contains(LEVY_MARKER)
}

/// Income rows tied to a unit whose description contains [`LEVY_MARKER`],
/// in ledger order.
pub fn outstanding_levies(transactions: &[Transaction]) -> Vec<Levy> {
    transactions
        .iter()
        .filter(|t| is_levy(t))
        .map(|t| Levy {
            id: t.id,
            unit: or_unknown(t.unit.as_ref().map(|u| u.unit_number.as_str())),
            owner: or_unknown(t.unit.as_ref().map(|u| u.owner_name.as_str())),
            amount: t.amount,
            due_date: t.transaction_date.date_naive(),
            status: LEVY_STATUS,
        })
        .collect()
}

/// Every expense row, in ledger order.
pub fn upcoming_expenses(transactions: &[Transaction]) -> Vec<UpcomingExpense> {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
        .map(|t| UpcomingExpense {
            id: t.id,
            description: t.description.clone(),
            amount: t.amount,
            due_date: t.transaction_date.date_naive(),
            fund: t.fund_type.clone(),
        })
        .collect()
}

/// Display name of a fund. Anything that is not `admin` reads as the
/// capital works fund.
pub fn fund_label(fund: &FundType) -> &'static str {
    match fund {
        FundType::Admin => "Admin Fund",
        _ => "Capital Works Fund",
    }
}

/// Everything the financial page derives from one full read of the ledger.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSnapshot {
    pub funds: FundBalances,
    pub levies: Vec<Levy>,
    pub expenses: Vec<UpcomingExpense>,
}

impl LedgerSnapshot {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            funds: fund_balances(transactions),
            levies: outstanding_levies(transactions),
            expenses: upcoming_expenses(transactions),
        }
    }
}

/// Reads the full ledger and derives a fresh snapshot.
pub async fn load_snapshot(store: &dyn Store) -> Result<LedgerSnapshot, StoreError> {
    let transactions = store
        .list_transactions(&TransactionFilter::default())
        .await?;
    log::debug!("loaded {} ledger rows", transactions.len());
    Ok(LedgerSnapshot::from_transactions(&transactions))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRow {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub fund: &'static str,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Completed,
    Error,
}

/// Result of an ad-hoc search. `rows` is always empty on error.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub rows: Vec<SearchRow>,
}

/// Asks the store for the matching rows and reshapes them for display.
/// A store failure is folded into the outcome rather than returned.
pub async fn search(store: &dyn Store, filter: &TransactionFilter) -> SearchOutcome {
    match store.list_transactions(filter).await {
        Ok(transactions) => SearchOutcome {
            status: SearchStatus::Completed,
            rows: transactions
                .iter()
                .map(|t| SearchRow {
                    id: t.id,
                    description: t.description.clone(),
                    amount: t.amount,
                    date: t.transaction_date.date_naive(),
                    fund: fund_label(&t.fund_type),
                    kind: t.kind,
                })
                .collect(),
        },
        Err(err) => {
            log::error!("error searching transactions: {}", err);
            SearchOutcome {
                status: SearchStatus::Error,
                rows: Vec::new(),
            }
        }
    }
}

/// Appends one row to the ledger. Any snapshot taken before this call is
/// stale afterwards; call [`load_snapshot`] again.
pub async fn record_transaction(
    store: &dyn Store,
    new: &NewTransaction,
) -> Result<Transaction, StoreError> {
    let t = store.insert_transaction(new).await?;
    log::info!(
        "recorded {} of {} against {} fund ({})",
        t.kind,
        t.amount,
        t.fund_type,
        t.id
    );
    Ok(t)
}
