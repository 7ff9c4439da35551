//! Request handlers for the web interface.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, warn};

use super::templates::{BlogTemplate, FormTemplate, ProductsTemplate, ResponseTemplate};
use super::AppState;
use crate::lookup::Query;

/// Body returned when the catalog cannot be read or is empty.
pub const NO_ITEMS_MESSAGE: &str = "No recyclable items found.";

/// Fields posted by the lookup form.
#[derive(Debug, Deserialize)]
pub struct RecycleForm {
    pub location: String,
    pub material: String,
    pub item: String,
}

/// Render a template, turning template failures into a 500.
fn render(template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Show the lookup form.
pub async fn index() -> Response {
    render(&FormTemplate {
        title: "Recycle Me",
    })
}

/// Answer a submitted lookup.
pub async fn submit(State(state): State<AppState>, Form(form): Form<RecycleForm>) -> Response {
    let query = Query::new(&form.location, &form.material, &form.item);

    let worker = state.clone();
    let result = match tokio::task::spawn_blocking(move || worker.check(&query)).await {
        Ok(result) => result,
        Err(e) => {
            error!("Lookup task failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Lookup failed").into_response();
        }
    };

    match result {
        Ok(verdict) => render(&ResponseTemplate {
            title: "Result",
            response: &verdict.to_string(),
        }),
        Err(e) if e.is_catalog_unavailable() => {
            warn!("Catalog unavailable: {}", e);
            (StatusCode::BAD_REQUEST, NO_ITEMS_MESSAGE).into_response()
        }
        Err(e) => {
            error!("Lookup failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Lookup failed").into_response()
        }
    }
}

/// Static blog page.
pub async fn blog() -> Response {
    render(&BlogTemplate { title: "Blog" })
}

/// Static products page.
pub async fn products() -> Response {
    render(&ProductsTemplate { title: "Products" })
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
