use axum::{extract::State, response::Response, routing::get, Router};
use serde::Serialize;

use super::{message::AppMessage, AppState};
use crate::models::Unit;

const NAV: &str = "community";

pub const LOAD_FAILED: &str = "Failed to load residents. Please try again later.";

pub fn new_router() -> Router<AppState> {
    Router::new().route("/community", get(get_page))
}

#[derive(Serialize)]
struct Announcement {
    title: &'static str,
    date: &'static str,
    content: &'static str,
    priority: &'static str,
}

#[derive(Serialize)]
struct Event {
    title: &'static str,
    date: &'static str,
    time: &'static str,
    location: &'static str,
}

static ANNOUNCEMENTS: [Announcement; 3] = [
    Announcement {
        title: "Annual General Meeting",
        date: "2025-05-15",
        content: "The Annual General Meeting will be held on May 15, 2025 at 7:00 PM in the community room. All owners are encouraged to attend.",
        priority: "High",
    },
    Announcement {
        title: "Maintenance Notice - Water Shutdown",
        date: "2025-04-12",
        content: "There will be a scheduled water shutdown on April 12, 2025 from 9:00 AM to 12:00 PM for routine maintenance work.",
        priority: "Medium",
    },
    Announcement {
        title: "New Garden Area Rules",
        date: "2025-04-01",
        content: "Please note that updated garden area usage rules have been established. See the attached document for details.",
        priority: "Low",
    },
];

static EVENTS: [Event; 3] = [
    Event {
        title: "Annual General Meeting",
        date: "2025-05-15",
        time: "19:00",
        location: "Community Room",
    },
    Event {
        title: "Community BBQ",
        date: "2025-04-25",
        time: "17:00",
        location: "Garden Area",
    },
    Event {
        title: "Building Inspection",
        date: "2025-04-20",
        time: "10:00",
        location: "Common Areas",
    },
];

#[derive(Serialize, Debug, PartialEq)]
struct Resident {
    unit: String,
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    email: Option<String>,
    phone: Option<String>,
}

impl From<Unit> for Resident {
    fn from(u: Unit) -> Self {
        Self {
            kind: if u.status == "Occupied" {
                "Owner"
            } else {
                "Vacant"
            },
            unit: u.unit_number,
            name: u.owner_name,
            email: u.email,
            phone: u.phone,
        }
    }
}

#[derive(Serialize)]
struct Ctx {
    nav: &'static str,
    announcements: &'static [Announcement],
    events: &'static [Event],
    residents: Vec<Resident>,
}

#[axum::debug_handler]
async fn get_page(State(s): State<AppState>) -> Result<Response, AppMessage> {
    let residents = s
        .store
        .list_units()
        .await
        .map_err(|err| {
            log::error!("error fetching residents: {}", err);
            AppMessage::page_error(LOAD_FAILED, NAV, &s)
        })?
        .into_iter()
        .map(Resident::from)
        .collect();

    let ctx = Ctx {
        nav: NAV,
        announcements: &ANNOUNCEMENTS,
        events: &EVENTS,
        residents,
    };
    Ok(s.t.render("community", &ctx))
}
