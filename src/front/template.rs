use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use handlebars::{handlebars_helper, RenderError};
use serde::Serialize;

#[derive(Clone)]
pub struct Template {
    r: Arc<handlebars::Handlebars<'static>>,
}

impl Template {
    /// Registers every `*.hbs` file in `dir` under its file stem, so
    /// `financial.hbs` renders as `financial` and can be pulled in as a
    /// partial with `{{> financial}}`. With `dev_mode` the files are
    /// re-read on every render.
    pub fn new(dir: impl AsRef<Path>, dev_mode: bool) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut handlebars = handlebars::Handlebars::new();
        handlebars.set_dev_mode(dev_mode);

        for entity in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entity?.path();
            if path.extension().map_or(true, |e| e != "hbs") {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .with_context(|| format!("bad template name {}", path.display()))?
                .to_string();
            handlebars
                .register_template_file(&name, &path)
                .with_context(|| format!("registering {}", path.display()))?;
            log::debug!("registered template '{}'", name);
        }

        handlebars_helper!(capitalize: |s: str| {
            let mut c = s.chars();
            c.next()
                .map(|f| f.to_uppercase().chain(c).collect::<String>())
                .unwrap_or_default()
        });
        handlebars.register_helper("capitalize", Box::new(capitalize));

        Ok(Self {
            r: Arc::new(handlebars),
        })
    }

    pub fn render_html<T>(&self, name: &str, data: &T) -> Result<String, RenderError>
    where
        T: Serialize,
    {
        log::debug!("render '{}'", name);
        self.r.render(name, data)
    }

    pub fn render<T>(&self, name: &str, data: &T) -> Response
    where
        T: Serialize,
    {
        self.render_status(StatusCode::OK, name, data)
    }

    pub fn render_status<T>(&self, status: StatusCode, name: &str, data: &T) -> Response
    where
        T: Serialize,
    {
        match self.render_html(name, data) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                log::error!("failed to render '{}': {}", name, err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template. Error: {err}"),
                )
                    .into_response()
            }
        }
    }
}
