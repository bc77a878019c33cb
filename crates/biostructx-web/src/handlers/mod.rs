//! HTTP handlers for all web routes.
//!
//! Each tool exposes a `run_*` function shared by its HTML page and its JSON
//! counterpart under `/api`.

pub mod about;
pub mod affinity;
pub mod browse;
pub mod chat;
pub mod clusters;
pub mod drug_gene;
pub mod evolution;
pub mod home;
pub mod protein;
pub mod structure;
pub mod system;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

/// Renders a page with an explicit status, so failed submissions keep the
/// form and show the diagnostic with the matching code.
pub(crate) fn render_page<T: Serialize>(
    state: &AppState,
    template: &str,
    ctx: &RequestContext,
    status: StatusCode,
    page: T,
) -> Result<Response, ApiError> {
    let html = state.templates.render(template, ctx, page)?;
    Ok((status, html).into_response())
}

/// Splits on commas, whitespace and newlines, dropping empty items.
pub(crate) fn split_ids(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ids() {
        assert_eq!(split_ids("P69905, P68871\nP02144"), vec!["P69905", "P68871", "P02144"]);
        assert!(split_ids(" ,\n ").is_empty());
    }
}
