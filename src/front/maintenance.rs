use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::{format, message::AppMessage, AppState};
use crate::models::MaintenanceRequest;

const NAV: &str = "maintenance";
const NOT_AVAILABLE: &str = "N/A";

pub const LOAD_FAILED: &str = "Failed to load maintenance requests. Please try again later.";

pub fn new_router() -> Router<AppState> {
    Router::new().route("/maintenance", get(get_page))
}

#[derive(Deserialize)]
struct FilterQuery {
    filter: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
struct RequestView {
    unit_number: String,
    owner: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    date: String,
}

impl From<MaintenanceRequest> for RequestView {
    fn from(r: MaintenanceRequest) -> Self {
        let or_na = |v: String| match v.is_empty() {
            true => NOT_AVAILABLE.to_string(),
            false => v,
        };
        let (unit_number, owner) = match r.unit {
            Some(u) => (or_na(u.unit_number), or_na(u.owner_name)),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };
        Self {
            unit_number,
            owner,
            title: r.title,
            description: r.description,
            status: r.status,
            priority: r.priority,
            date: format::date(r.created_at.date_naive()),
        }
    }
}

#[derive(Serialize, Debug, Default, PartialEq)]
struct StatusCounts {
    open: usize,
    in_progress: usize,
    completed: usize,
    all: usize,
}

fn count_statuses(requests: &[RequestView]) -> StatusCounts {
    let count = |s: &str| requests.iter().filter(|r| r.status == s).count();
    StatusCounts {
        open: count("Open"),
        in_progress: count("In Progress"),
        completed: count("Completed"),
        all: requests.len(),
    }
}

fn heading(filter: &str) -> &'static str {
    match filter {
        "all" => "All Requests",
        "open" => "Open Requests",
        "in progress" => "In Progress Requests",
        _ => "Completed Requests",
    }
}

#[derive(Serialize)]
struct Ctx<'a> {
    nav: &'static str,
    filter: &'a str,
    heading: &'static str,
    counts: StatusCounts,
    requests: Vec<&'a RequestView>,
}

#[axum::debug_handler]
async fn get_page(
    State(s): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response, AppMessage> {
    let requests: Vec<RequestView> = s
        .store
        .list_maintenance_requests()
        .await
        .map_err(|err| {
            log::error!("error fetching maintenance requests: {}", err);
            AppMessage::page_error(LOAD_FAILED, NAV, &s)
        })?
        .into_iter()
        .map(RequestView::from)
        .collect();

    let filter = q.filter.as_deref().unwrap_or("all");
    let ctx = Ctx {
        nav: NAV,
        filter,
        heading: heading(filter),
        counts: count_statuses(&requests),
        requests: requests
            .iter()
            .filter(|r| filter == "all" || r.status.to_lowercase() == filter)
            .collect(),
    };

    Ok(s.t.render("maintenance", &ctx))
}
