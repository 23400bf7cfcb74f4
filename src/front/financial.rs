use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Form, Router,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    format,
    message::{AppMessage, StatusLine},
    AppState,
};
use crate::{
    ledger::{self, LedgerSnapshot, SearchOutcome, SearchStatus},
    models::{FundType, NewTransaction, TransactionFilter, TransactionType},
};

const NAV: &str = "financial";

pub const LOAD_FAILED: &str = "Failed to load financial data. Please try again later.";
pub const SEARCH_OK: &str = "Search completed! Status code: 200 OK";
pub const SEARCH_FAILED: &str =
    "Error searching transactions. Status code: 500 Internal Server Error";
pub const POST_OK: &str = "Transaction created successfully! Status code: 201 Created";
pub const POST_FAILED: &str = "Error creating transaction. Status code: 500 Internal Server Error";

pub fn new_router() -> Router<AppState> {
    Router::new()
        .route("/financial", get(get_page))
        .route("/financial/transactions", post(post_transaction))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SearchQuery {
    search: Option<String>,
    fund: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TransactionForm {
    description: String,
    amount: String,
    date: String,
    fund: String,
    #[serde(rename = "type")]
    kind: String,
}

impl TryFrom<TransactionForm> for NewTransaction {
    type Error = String;

    fn try_from(f: TransactionForm) -> Result<Self, Self::Error> {
        let transaction_date = match f.date.trim() {
            "" => None,
            d => Some(
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|err| format!("bad date '{}': {}", d, err))?
                    .and_time(NaiveTime::default())
                    .and_utc(),
            ),
        };
        Ok(NewTransaction {
            amount: ledger::parse_amount(&f.amount),
            kind: f.kind.parse()?,
            description: f.description,
            fund_type: FundType::from(f.fund.as_str()),
            transaction_date,
        })
    }
}

#[derive(Serialize)]
struct LevyView {
    unit: String,
    owner: String,
    amount: String,
    due_date: String,
    status: &'static str,
}

#[derive(Serialize)]
struct ExpenseView {
    description: String,
    amount: String,
    due_date: String,
    fund: &'static str,
    is_admin: bool,
}

#[derive(Serialize)]
struct ResultView {
    description: String,
    amount: String,
    date: String,
    fund: &'static str,
    #[serde(rename = "type")]
    kind: TransactionType,
}

#[derive(Serialize)]
struct Ctx {
    nav: &'static str,
    today: String,
    admin_fund: String,
    capital_works_fund: String,
    levies: Vec<LevyView>,
    expenses: Vec<ExpenseView>,
    post_status: Option<StatusLine>,
    search_status: Option<StatusLine>,
    results: Vec<ResultView>,
    search_fund: String,
    search_type: String,
    load_error: Option<&'static str>,
}

impl Ctx {
    fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            nav: NAV,
            today: format::date(Utc::now().date_naive()),
            admin_fund: format::money(snapshot.funds.admin_fund),
            capital_works_fund: format::money(snapshot.funds.capital_works_fund),
            levies: snapshot
                .levies
                .into_iter()
                .map(|l| LevyView {
                    unit: l.unit,
                    owner: l.owner,
                    amount: format::money(l.amount),
                    due_date: format::date(l.due_date),
                    status: l.status,
                })
                .collect(),
            expenses: snapshot
                .expenses
                .into_iter()
                .map(|e| ExpenseView {
                    description: e.description,
                    amount: format::money(e.amount),
                    due_date: format::date(e.due_date),
                    fund: ledger::fund_label(&e.fund),
                    is_admin: e.fund == FundType::Admin,
                })
                .collect(),
            post_status: None,
            search_status: None,
            results: Vec::new(),
            search_fund: String::new(),
            search_type: String::new(),
            load_error: None,
        }
    }

    /// Forms only. No balances, levies or expenses are shown when the
    /// ledger could not be read.
    fn unloaded() -> Self {
        Self {
            load_error: Some(LOAD_FAILED),
            ..Self::new(LedgerSnapshot::default())
        }
    }

    fn with_search(mut self, outcome: SearchOutcome) -> Self {
        self.search_status = Some(match outcome.status {
            SearchStatus::Completed => StatusLine::ok(SEARCH_OK),
            SearchStatus::Error => StatusLine::failed(SEARCH_FAILED),
        });
        self.results = outcome
            .rows
            .into_iter()
            .map(|r| ResultView {
                description: r.description,
                amount: format::money(r.amount),
                date: format::date(r.date),
                fund: r.fund,
                kind: r.kind,
            })
            .collect();
        self
    }
}

async fn load(s: &AppState) -> Result<LedgerSnapshot, AppMessage> {
    ledger::load_snapshot(s.store.as_ref()).await.map_err(|err| {
        log::error!("error fetching financial data: {}", err);
        AppMessage::page_error(LOAD_FAILED, NAV, s)
    })
}

/// Used after a search or insert, whose own status line must survive a
/// failed reload.
async fn load_or_unloaded(s: &AppState) -> Ctx {
    match ledger::load_snapshot(s.store.as_ref()).await {
        Ok(snapshot) => Ctx::new(snapshot),
        Err(err) => {
            log::error!("error fetching financial data: {}", err);
            Ctx::unloaded()
        }
    }
}

/// An empty form value leaves that filter unset. A type the ledger
/// cannot hold matches nothing, so the store is not asked at all.
async fn run_search(s: &AppState, fund: &str, kind: &str) -> SearchOutcome {
    let kind = match kind {
        "" => None,
        k => match k.parse::<TransactionType>() {
            Ok(k) => Some(k),
            Err(_) => {
                return SearchOutcome {
                    status: SearchStatus::Completed,
                    rows: Vec::new(),
                }
            }
        },
    };
    let filter = TransactionFilter {
        fund_type: (!fund.is_empty()).then(|| FundType::from(fund)),
        kind,
    };
    ledger::search(s.store.as_ref(), &filter).await
}

#[axum::debug_handler]
async fn get_page(
    State(s): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Response, AppMessage> {
    if q.search.is_none() {
        return Ok(s.t.render("financial", &Ctx::new(load(&s).await?)));
    }

    let outcome = run_search(&s, &q.fund, &q.kind).await;
    let mut ctx = load_or_unloaded(&s).await.with_search(outcome);
    ctx.search_fund = q.fund;
    ctx.search_type = q.kind;

    let status = match ctx.load_error {
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
        None => StatusCode::OK,
    };
    Ok(s.t.render_status(status, "financial", &ctx))
}

/// Appends the submitted row, then rebuilds the page from a fresh read.
/// Search results from before the write are not carried over.
#[axum_macros::debug_handler]
async fn post_transaction(
    State(s): State<AppState>,
    Form(form): Form<TransactionForm>,
) -> Result<Response, AppMessage> {
    let recorded = match NewTransaction::try_from(form) {
        Ok(new) => ledger::record_transaction(s.store.as_ref(), &new)
            .await
            .map_err(|err| err.to_string()),
        Err(err) => Err(err),
    };

    let (status, line) = match recorded {
        Ok(_) => (StatusCode::CREATED, StatusLine::ok(POST_OK)),
        Err(err) => {
            log::error!("error creating transaction: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusLine::failed(POST_FAILED),
            )
        }
    };

    let mut ctx = load_or_unloaded(&s).await;
    ctx.post_status = Some(line);
    Ok(s.t.render_status(status, "financial", &ctx))
}
