use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::state::SharedState;

pub async fn about_page(State(state): State<SharedState>, theme: Theme) -> Result<Html<String>, ApiError> {
    let ctx = RequestContext::new(Module::About, theme);
    state.templates.render("about.html", &ctx, json!({}))
}

/// GET /api/about
pub async fn api_about() -> Json<Value> {
    let features: Vec<Value> = Module::TOOLS
        .iter()
        .map(|m| json!({ "name": m.name(), "description": m.description(), "path": m.path() }))
        .collect();
    Json(json!({
        "status": "success",
        "name": "BioStructX",
        "tagline": "Structural Intelligence Platform",
        "version": env!("CARGO_PKG_VERSION"),
        "features": features,
    }))
}
