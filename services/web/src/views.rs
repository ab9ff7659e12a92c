//! HTML pages. Templates live in `services/web/templates` and escape all
//! interpolated values.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::NaiveDate;

use crate::domain::types::{Farm, Horse};
use crate::error::WebError;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub app_name: &'static str,
}

#[derive(Template, Default)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub name: String,
    pub email: String,
    pub next: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "login_sent.html")]
pub struct LoginSentPage {
    pub email: String,
}

#[derive(Template, Default)]
#[template(path = "new_farm.html")]
pub struct NewFarmPage {
    pub name: String,
    pub error: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

pub struct HorseRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub date_of_birth: String,
    pub age: u32,
    pub label: &'static str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub farm_id: String,
    pub farm_name: String,
    pub horses: Vec<HorseRow>,
}

impl DashboardPage {
    pub fn new(farm: &Farm, horses: &[Horse], today: NaiveDate) -> Self {
        Self {
            farm_id: farm.id.to_string(),
            farm_name: farm.name.clone(),
            horses: horses
                .iter()
                .map(|h| HorseRow {
                    id: h.id.to_string(),
                    name: h.name.clone(),
                    description: h.description.clone(),
                    date_of_birth: h.date_of_birth.format("%Y-%m-%d").to_string(),
                    age: h.age(today),
                    label: h.label(today),
                })
                .collect(),
        }
    }
}

/// Render a page with 200.
pub fn render<T: Template>(page: &T) -> Result<Html<String>, WebError> {
    let html = page
        .render()
        .map_err(|e| WebError::Internal(anyhow::Error::new(e).context("render template")))?;
    Ok(Html(html))
}

/// Render a form page again with the error shown inline and the error's status.
pub fn render_with_error<T: Template>(page: &T, err: &WebError) -> Response {
    err.report();
    match render(page) {
        Ok(html) => (err.status(), html).into_response(),
        Err(render_err) => render_err.into_response(),
    }
}

/// Inline message for a form error. Internal details are never shown.
pub fn error_message(err: &WebError) -> String {
    match err {
        WebError::InvalidForm(reason) => (*reason).to_owned(),
        WebError::LinkNotSent => "We couldn't send your login link. Please try again.".to_owned(),
        WebError::InvalidLink => {
            "That login link is invalid or has expired. Request a new one.".to_owned()
        }
        WebError::MissingToken => "That login link is incomplete. Request a new one.".to_owned(),
        _ => "Something went wrong. Please try again.".to_owned(),
    }
}

/// Plain 200 page helper for handlers that cannot fail otherwise.
pub fn page<T: Template>(page: &T) -> Response {
    match render(page) {
        Ok(html) => (StatusCode::OK, html).into_response(),
        Err(e) => e.into_response(),
    }
}
