//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{
    about::{about_page, api_about},
    affinity::{affinity_page, affinity_submit, api_affinity},
    browse::{api_chembl, api_pubchem, api_uniprot, chembl_page, pubchem_page, uniprot_page},
    chat::{api_chat, chat_page, chat_submit},
    clusters::{api_clusters, clusters_csv, clusters_page, clusters_submit},
    drug_gene::{api_drug_gene, drug_gene_page},
    evolution::{api_evolution, evolution_page, evolution_submit},
    home::{api_modules, home_page},
    protein::{api_protein, protein_page, protein_submit},
    structure::{api_structure, structure_page, structure_submit},
    system::healthz,
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",                     get(home_page))
        .route("/about",                get(about_page))
        .route("/affinity",             get(affinity_page).post(affinity_submit))
        .route("/protein",              get(protein_page).post(protein_submit))
        .route("/structure",            get(structure_page).post(structure_submit))
        .route("/browse/uniprot",       get(uniprot_page))
        .route("/browse/pubchem",       get(pubchem_page))
        .route("/browse/chembl",        get(chembl_page))
        .route("/drug-gene",            get(drug_gene_page))
        .route("/ligand-clusters",      get(clusters_page).post(clusters_submit))
        .route("/ligand-clusters/csv",  post(clusters_csv))
        .route("/evolution",            get(evolution_page).post(evolution_submit))
        .route("/chat",                 get(chat_page).post(chat_submit))
        .route("/healthz",              get(healthz))

        // API endpoints
        .route("/api/modules",                get(api_modules))
        .route("/api/about",                  get(api_about))
        .route("/api/affinity",               post(api_affinity))
        .route("/api/protein",                post(api_protein))
        .route("/api/structure",              post(api_structure))
        .route("/api/browse/uniprot/{id}",    get(api_uniprot))
        .route("/api/browse/pubchem/{cid}",   get(api_pubchem))
        .route("/api/browse/chembl/{id}",     get(api_chembl))
        .route("/api/drug-gene",              get(api_drug_gene))
        .route("/api/ligand-clusters",        post(api_clusters))
        .route("/api/evolution",              post(api_evolution))
        .route("/api/chat",                   post(api_chat))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
