//! Binding affinity page and API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, Json};
use biostructx_affinity::{AffinityError, AffinityReport, AffinityRequest};
use serde::Serialize;
use serde_json::{json, Value};

use crate::chart::affinity_range_svg;
use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

#[derive(Debug, Serialize)]
struct FeatureRow {
    name: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
pub struct AffinityView {
    summary: String,
    energy: f64,
    label: &'static str,
    message: &'static str,
    colour: &'static str,
    smiles: String,
    sequence_length: usize,
    features: Vec<FeatureRow>,
    chart_svg: String,
}

impl From<&AffinityReport> for AffinityView {
    fn from(report: &AffinityReport) -> Self {
        let estimate = &report.estimate;
        Self {
            summary: estimate.to_string(),
            energy: estimate.energy,
            label: estimate.strength.label(),
            message: estimate.strength.message(),
            colour: estimate.strength.colour(),
            smiles: report.smiles.clone(),
            sequence_length: report.sequence_length,
            features: estimate
                .features
                .named()
                .into_iter()
                .map(|(name, v)| FeatureRow { name, value: format!("{:.4}", v) })
                .collect(),
            chart_svg: affinity_range_svg(estimate.energy),
        }
    }
}

#[derive(Debug, Serialize)]
struct AffinityPage<'a> {
    enabled: bool,
    disabled_reason: Option<&'a str>,
    form: &'a AffinityRequest,
    result: Option<AffinityView>,
    error: Option<String>,
}

impl<'a> AffinityPage<'a> {
    fn new(state: &'a AppState, form: &'a AffinityRequest) -> Self {
        Self {
            enabled: state.affinity.is_ok(),
            disabled_reason: state.affinity.as_ref().err().map(String::as_str),
            form,
            result: None,
            error: None,
        }
    }
}

/// Runs the full pipeline, or fails with `ModelUnavailable` while the page is
/// disabled.
pub async fn run_affinity(state: &AppState, request: &AffinityRequest) -> Result<AffinityReport, ApiError> {
    let pipeline = state
        .affinity
        .as_ref()
        .map_err(|reason| AffinityError::ModelUnavailable(reason.clone()))?;
    Ok(pipeline.run(request).await?)
}

fn page_status(state: &AppState) -> StatusCode {
    if state.affinity.is_ok() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE }
}

pub async fn affinity_page(State(state): State<SharedState>, theme: Theme) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Affinity, theme);
    let form = AffinityRequest::default();
    render_page(&state, "affinity.html", &ctx, page_status(&state), AffinityPage::new(&state, &form))
}

pub async fn affinity_submit(
    State(state): State<SharedState>,
    theme: Theme,
    Form(form): Form<AffinityRequest>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Affinity, theme);
    let mut page = AffinityPage::new(&state, &form);
    let status = match run_affinity(&state, &form).await {
        Ok(report) => {
            page.result = Some(AffinityView::from(&report));
            StatusCode::OK
        }
        Err(e) => {
            page.error = Some(e.message.clone());
            e.status
        }
    };
    render_page(&state, "affinity.html", &ctx, status, page)
}

/// POST /api/affinity
pub async fn api_affinity(
    State(state): State<SharedState>,
    Json(request): Json<AffinityRequest>,
) -> Result<Json<Value>, ApiError> {
    let report = run_affinity(&state, &request).await?;
    let estimate = &report.estimate;
    let features: serde_json::Map<String, Value> = estimate
        .features
        .named()
        .into_iter()
        .map(|(name, v)| (name.to_string(), json!(v)))
        .collect();
    Ok(Json(json!({
        "status": "success",
        "smiles": report.smiles,
        "sequence_length": report.sequence_length,
        "affinity": (estimate.energy * 100.0).round() / 100.0,
        "label": estimate.strength.label(),
        "message": estimate.strength.message(),
        "summary": estimate.to_string(),
        "features": features,
    })))
}
