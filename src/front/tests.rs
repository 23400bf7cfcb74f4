//! Router tests against the seeded in-memory store.

use super::*;
use crate::{
    models::{MaintenanceRequest, NewTransaction, Transaction, TransactionFilter, Unit},
    store::{MemoryStore, StoreError},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn setup_app(store: Arc<dyn Store>) -> Router {
    let t = template::Template::new("templates", false).unwrap();
    new_router(AppState { store, t }, "public")
}

fn seeded_app() -> Router {
    setup_app(Arc::new(MemoryStore::seeded()))
}

async fn get_body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_text(response).await)
}

async fn post_form(app: Router, uri: &str, form: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_text(response).await)
}

/// Everything after the search results table opens.
fn results_section(body: &str) -> &str {
    body.split_once(r#"id="results""#).map_or("", |(_, rest)| rest)
}

fn offline() -> StoreError {
    StoreError::Rejected("store offline".to_string())
}

/// Fails every call.
struct DownStore;

#[async_trait]
impl Store for DownStore {
    async fn list_transactions(&self, _: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        Err(offline())
    }
    async fn insert_transaction(&self, _: &NewTransaction) -> Result<Transaction, StoreError> {
        Err(offline())
    }
    async fn list_units(&self) -> Result<Vec<Unit>, StoreError> {
        Err(offline())
    }
    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>, StoreError> {
        Err(offline())
    }
}

/// Serves full reads from the seeded store but fails filtered reads and writes.
struct FlakyStore(MemoryStore);

#[async_trait]
impl Store for FlakyStore {
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        if *filter != TransactionFilter::default() {
            return Err(offline());
        }
        self.0.list_transactions(filter).await
    }
    async fn insert_transaction(&self, _: &NewTransaction) -> Result<Transaction, StoreError> {
        Err(offline())
    }
    async fn list_units(&self) -> Result<Vec<Unit>, StoreError> {
        self.0.list_units().await
    }
    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>, StoreError> {
        self.0.list_maintenance_requests().await
    }
}

fn flaky_app() -> Router {
    setup_app(Arc::new(FlakyStore(MemoryStore::seeded())))
}

// ========== Financial page ==========

#[tokio::test]
async fn test_root_redirects_to_financial() {
    let response = seeded_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/financial");
}

#[tokio::test]
async fn test_financial_page_shows_fund_balances() {
    let (status, body) = get(seeded_app(), "/financial").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<p class="balance" id="admin-fund">$1,624.50</p>"#));
    assert!(body.contains(r#"<p class="balance" id="capital-works-fund">-$2,450.00</p>"#));
}

#[tokio::test]
async fn test_financial_page_lists_levies_and_expenses() {
    let (_, body) = get(seeded_app(), "/financial").await;

    assert!(body.contains("Unit 101"));
    assert!(body.contains("Emma Thompson"));
    assert!(body.contains("Unit 305"));
    assert_eq!(body.matches("Overdue").count(), 2);
    assert!(!body.contains("Unit 203"));

    assert!(body.contains("Common area cleaning"));
    assert!(body.contains("Roof membrane repair"));
    assert!(body.contains("Building insurance excess"));
    assert!(!body.contains(r#"id="results""#));
    assert!(!body.contains(r#"id="search-status""#));
}

#[tokio::test]
async fn test_financial_page_empty_ledger() {
    let app = setup_app(Arc::new(MemoryStore::default()));
    let (status, body) = get(app, "/financial").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No outstanding levies found."));
    assert!(body.contains("No upcoming expenses found."));
    assert!(body.contains(r#"id="admin-fund">$0.00<"#));
}

#[tokio::test]
async fn test_financial_load_failure_replaces_page() {
    let (status, body) = get(setup_app(Arc::new(DownStore)), "/financial").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(financial::LOAD_FAILED));
    assert!(!body.contains("Administration Fund"));
    assert!(!body.contains("Add New Transaction"));
}

// ========== Search ==========

#[tokio::test]
async fn test_search_with_both_filters() {
    let (status, body) = get(seeded_app(), "/financial?search=1&fund=admin&type=Income").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(financial::SEARCH_OK));

    let results = results_section(&body);
    assert_eq!(results.matches("Q2 Admin Fee Payment").count(), 2);
    assert!(!results.contains("Q2 Capital Works Levy"));
    assert!(!results.contains("Common area cleaning"));
    assert!(results.contains("<td>Admin Fund</td>"));
    assert!(results.contains("<td>Income</td>"));
}

#[tokio::test]
async fn test_search_unset_filters_returns_everything_in_order() {
    let (_, body) = get(seeded_app(), "/financial?search=1&fund=&type=").await;
    let results = results_section(&body);

    let order = [
        "Q2 Capital Works Levy",
        "Common area cleaning",
        "Roof membrane repair",
        "Building insurance excess",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|d| results.find(d).expect("row missing from results"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(results.matches("<tr>").count(), 7);
}

#[tokio::test]
async fn test_search_keeps_selected_filters() {
    let (_, body) = get(seeded_app(), "/financial?search=1&fund=capital&type=").await;

    assert!(body.contains(r#"<option value="capital" selected>"#));
    let results = results_section(&body);
    assert!(results.contains("Roof membrane repair"));
    assert!(!results.contains("Common area cleaning"));
}

#[tokio::test]
async fn test_search_unknown_type_matches_nothing() {
    let (_, body) = get(seeded_app(), "/financial?search=1&type=Transfer").await;

    assert!(body.contains(financial::SEARCH_OK));
    assert!(!body.contains(r#"id="results""#));
}

#[tokio::test]
async fn test_search_failure_is_inline() {
    let (status, body) = get(flaky_app(), "/financial?search=1&fund=admin").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(financial::SEARCH_FAILED));
    assert!(!body.contains(r#"id="results""#));
    assert!(body.contains(r#"id="admin-fund">$1,624.50<"#));
}

#[tokio::test]
async fn test_search_failure_survives_unreadable_ledger() {
    let (status, body) = get(
        setup_app(Arc::new(DownStore)),
        "/financial?search=1&fund=admin",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(financial::SEARCH_FAILED));
    assert!(body.contains(financial::LOAD_FAILED));
    assert!(body.contains("Search Transactions"));
    assert!(!body.contains(r#"id="admin-fund""#));
    assert!(!body.contains(r#"id="levies""#));
}

// ========== Add transaction ==========

#[tokio::test]
async fn test_post_transaction_refreshes_page() {
    let store = Arc::new(MemoryStore::seeded());
    let app = setup_app(store.clone());

    let (status, body) = post_form(
        app.clone(),
        "/financial/transactions",
        "description=Gutter+clean&amount=100&date=2025-06-01&fund=admin&type=Expense",
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(financial::POST_OK));
    assert!(body.contains(r#"id="admin-fund">$1,524.50<"#));
    assert_eq!(body.matches("Gutter clean").count(), 1);
    assert!(!body.contains(r#"id="results""#));

    // A later full load sees the row exactly once alongside the old ones.
    let all = store
        .list_transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 7);
    let (_, body) = get(app, "/financial?search=1").await;
    assert_eq!(results_section(&body).matches("Gutter clean").count(), 1);
}

#[tokio::test]
async fn test_post_levy_without_unit_is_not_outstanding() {
    let (status, body) = post_form(
        seeded_app(),
        "/financial/transactions",
        "description=Q3+Admin+Fee+Payment&amount=300&date=&fund=admin&type=Income",
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.matches("Overdue").count(), 2);
    assert!(body.contains(r#"id="admin-fund">$1,924.50<"#));
}

#[tokio::test]
async fn test_post_non_numeric_amount_poisons_fund() {
    let (status, body) = post_form(
        seeded_app(),
        "/financial/transactions",
        "description=Mystery&amount=&date=&fund=capital&type=Income",
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#"id="capital-works-fund">$NaN<"#));
    assert!(body.contains(r#"id="admin-fund">$1,624.50<"#));
}

#[tokio::test]
async fn test_post_failure_is_inline() {
    let (status, body) = post_form(
        flaky_app(),
        "/financial/transactions",
        "description=Gutter+clean&amount=100&date=&fund=admin&type=Expense",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(financial::POST_FAILED));
    assert!(body.contains(r#"id="admin-fund">$1,624.50<"#));
    assert!(!body.contains("Gutter clean"));
}

#[tokio::test]
async fn test_post_failure_with_store_down_keeps_inline_status() {
    let (status, body) = post_form(
        setup_app(Arc::new(DownStore)),
        "/financial/transactions",
        "description=Gutter+clean&amount=100&date=&fund=admin&type=Expense",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(financial::POST_FAILED));
    assert!(body.contains(r#"id="load-status""#));
    assert!(body.contains("Add New Transaction"));
    assert!(!body.contains(r#"id="admin-fund""#));
    assert!(!body.contains(r#"id="capital-works-fund""#));
    assert!(!body.contains(r#"id="expenses""#));
}

#[tokio::test]
async fn test_post_missing_type_is_inline_failure() {
    let (status, body) = post_form(
        seeded_app(),
        "/financial/transactions",
        "description=Gutter+clean&amount=100",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(financial::POST_FAILED));
}

// ========== Maintenance ==========

#[tokio::test]
async fn test_maintenance_counts_and_rows() {
    let (status, body) = get(seeded_app(), "/maintenance").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<strong id="count-all">3</strong>"#));
    assert!(body.contains(r#"<strong id="count-open">1</strong>"#));
    assert!(body.contains(r#"<strong id="count-in-progress">1</strong>"#));
    assert!(body.contains(r#"<strong id="count-completed">1</strong>"#));
    assert!(body.contains("<h3>All Requests</h3>"));
    assert!(body.contains("<td>N/A</td>"));
}

#[tokio::test]
async fn test_maintenance_filter() {
    let (_, body) = get(seeded_app(), "/maintenance?filter=in%20progress").await;

    assert!(body.contains("<h3>In Progress Requests</h3>"));
    assert!(body.contains("Intercom fault"));
    assert!(!body.contains("Leaking tap"));
    assert!(body.contains(r#"<strong id="count-all">3</strong>"#));
}

#[tokio::test]
async fn test_maintenance_filter_without_matches() {
    let app = setup_app(Arc::new(MemoryStore::default()));
    let (_, body) = get(app, "/maintenance?filter=open").await;

    assert!(body.contains("No maintenance requests found."));
}

#[tokio::test]
async fn test_maintenance_load_failure() {
    let (status, body) = get(setup_app(Arc::new(DownStore)), "/maintenance").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(maintenance::LOAD_FAILED));
}

// ========== Community ==========

#[tokio::test]
async fn test_community_directory() {
    let (status, body) = get(seeded_app(), "/community").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Unit 203"));
    assert!(body.contains("James Wilson"));
    assert_eq!(body.matches(">Owner</span>").count(), 2);
    assert_eq!(body.matches(">Vacant</span>").count(), 1);
    assert!(body.contains("mailto:emma.t@example.com"));
    assert!(body.contains("Community BBQ"));
    assert!(body.contains("New Garden Area Rules"));
}

#[tokio::test]
async fn test_community_load_failure() {
    let (status, body) = get(setup_app(Arc::new(DownStore)), "/community").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(community::LOAD_FAILED));
    assert!(!body.contains("Residents Directory"));
}
