use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;

/// A response that takes the place of the page a handler meant to render.
pub struct AppMessage(Response);

impl AppMessage {
    /// Replaces the whole page with `msg`. Used when the data a page is
    /// built from could not be read at all.
    pub fn page_error(msg: impl AsRef<str>, nav: &'static str, s: &AppState) -> AppMessage {
        #[derive(Serialize)]
        struct Ctx<'a> {
            nav: &'a str,
            error: &'a str,
        }

        Self(s.t.render_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "error",
            &Ctx {
                nav,
                error: msg.as_ref(),
            },
        ))
    }
}

impl IntoResponse for AppMessage {
    fn into_response(self) -> Response {
        self.0
    }
}

/// A one-line result of the last form action, shown above that form.
#[derive(Debug, Clone, Serialize)]
pub struct StatusLine {
    pub text: &'static str,
    pub ok: bool,
}

impl StatusLine {
    pub fn ok(text: &'static str) -> Self {
        Self { text, ok: true }
    }

    pub fn failed(text: &'static str) -> Self {
        Self { text, ok: false }
    }
}
