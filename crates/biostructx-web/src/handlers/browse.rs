//! UniProt, PubChem and ChEMBL browsers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    UniProt,
    PubChem,
    Chembl,
}

impl Database {
    fn module(self) -> Module {
        match self {
            Database::UniProt => Module::UniProt,
            Database::PubChem => Module::PubChem,
            Database::Chembl => Module::Chembl,
        }
    }

    /// Query-string parameter holding the identifier.
    fn param(self) -> &'static str {
        match self {
            Database::PubChem => "cid",
            Database::UniProt | Database::Chembl => "id",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Database::UniProt => "UniProt ID",
            Database::PubChem => "PubChem CID",
            Database::Chembl => "ChEMBL ID",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Database::UniProt => "P69905",
            Database::PubChem => "2244",
            Database::Chembl => "CHEMBL25",
        }
    }
}

/// Fetches one record as JSON. Unknown identifiers are `not_found`.
pub async fn lookup(state: &AppState, db: Database, id: &str) -> Result<Value, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::invalid_input(format!("Please enter a {}.", db.label())));
    }
    let entry = match db {
        Database::UniProt => {
            let id = id.to_ascii_uppercase();
            state.sources.uniprot.fetch_entry(&id).await?.map(|e| json!(e))
        }
        Database::PubChem => {
            if !id.chars().all(|c| c.is_ascii_digit()) {
                return Err(ApiError::invalid_input("A PubChem CID is a number."));
            }
            state.sources.pubchem.properties_by_cid(id).await?.map(|p| json!(p))
        }
        Database::Chembl => {
            let id = id.to_ascii_uppercase();
            state.sources.chembl.fetch_molecule(&id).await?.map(|m| json!(m))
        }
    };
    entry.ok_or_else(|| ApiError::not_found(format!("No {} record found for {}.", db.label(), id)))
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    #[serde(default, alias = "cid")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BrowsePage {
    kind: Database,
    param: &'static str,
    label: &'static str,
    placeholder: &'static str,
    query: String,
    entry: Option<Value>,
    error: Option<String>,
}

async fn browse(state: &AppState, db: Database, theme: Theme, query: BrowseQuery) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(db.module(), theme);
    let query = query.id.unwrap_or_default();
    let mut page = BrowsePage {
        kind: db,
        param: db.param(),
        label: db.label(),
        placeholder: db.placeholder(),
        query: query.trim().to_string(),
        entry: None,
        error: None,
    };

    let mut status = StatusCode::OK;
    if !page.query.is_empty() {
        match lookup(state, db, &page.query).await {
            Ok(entry) => page.entry = Some(entry),
            Err(e) => {
                status = e.status;
                page.error = Some(e.message);
            }
        }
    }
    render_page(state, "browse.html", &ctx, status, page)
}

pub async fn uniprot_page(
    State(state): State<SharedState>,
    theme: Theme,
    Query(query): Query<BrowseQuery>,
) -> Result<Response, ApiError> {
    browse(&state, Database::UniProt, theme, query).await
}

pub async fn pubchem_page(
    State(state): State<SharedState>,
    theme: Theme,
    Query(query): Query<BrowseQuery>,
) -> Result<Response, ApiError> {
    browse(&state, Database::PubChem, theme, query).await
}

pub async fn chembl_page(
    State(state): State<SharedState>,
    theme: Theme,
    Query(query): Query<BrowseQuery>,
) -> Result<Response, ApiError> {
    browse(&state, Database::Chembl, theme, query).await
}

/// GET /api/browse/uniprot/{id}
pub async fn api_uniprot(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let entry = lookup(&state, Database::UniProt, &id).await?;
    Ok(Json(json!({ "status": "success", "entry": entry })))
}

/// GET /api/browse/pubchem/{cid}
pub async fn api_pubchem(State(state): State<SharedState>, Path(cid): Path<String>) -> Result<Json<Value>, ApiError> {
    let entry = lookup(&state, Database::PubChem, &cid).await?;
    Ok(Json(json!({ "status": "success", "entry": entry })))
}

/// GET /api/browse/chembl/{id}
pub async fn api_chembl(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let entry = lookup(&state, Database::Chembl, &id).await?;
    Ok(Json(json!({ "status": "success", "entry": entry })))
}
