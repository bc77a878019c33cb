//! Router-level tests: every request goes through the full axum stack with
//! all upstream services replaced by one local stub server.
//!
//! Run with: cargo test --package biostructx-web --test test_web

use axum::body::{to_bytes, Body};
use axum::extract::Path;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use biostructx_common::AppConfig;
use biostructx_web::router::build_router;
use biostructx_web::state::AppState;

const SHIPPED_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/affinity_forest.json");

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sample_pdb() -> String {
    let mut lines = vec![
        "REMARK 999 DOMAIN: globin 1-4".to_string(),
        "HELIX    1   1 ALA A    1  ALA A    4  1                                   4".to_string(),
    ];
    for i in 1..=8 {
        lines.push(format!(
            "ATOM  {:>5}  CA  ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
            i, i, 0.0, 0.0, 0.0
        ));
    }
    lines.push("END".to_string());
    lines.join("\n")
}

async fn rdkit(Json(body): Json<Value>) -> (StatusCode, String) {
    match body["smiles"].as_str().unwrap_or_default() {
        "CCO" => (
            StatusCode::OK,
            json!({"MolWt": 46.07, "LogP": -0.0014, "TPSA": 20.23, "NumRotatableBonds": 0}).to_string(),
        ),
        _ => (StatusCode::OK, json!({"error": "Invalid SMILES"}).to_string()),
    }
}

async fn uniprot(Path(file): Path<String>) -> (StatusCode, String) {
    match file.as_str() {
        "P69905.fasta" => (StatusCode::OK, ">sp|P69905|HBA_HUMAN\nMVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHF\n".to_string()),
        "P69905.json" => (
            StatusCode::OK,
            json!({
                "primaryAccession": "P69905",
                "proteinDescription": { "recommendedName": { "fullName": { "value": "Hemoglobin subunit alpha" } } },
                "organism": { "scientificName": "Homo sapiens" },
                "genes": [ { "geneName": { "value": "HBA1" } } ],
                "uniProtKBCrossReferences": [
                    { "database": "GO", "id": "GO:0005833" },
                    { "database": "GO", "id": "GO:9999999" },
                    { "database": "PDB", "id": "1A00" }
                ]
            })
            .to_string(),
        ),
        "search" => (
            StatusCode::OK,
            json!({
                "results": [ {
                    "primaryAccession": "P69905",
                    "proteinDescription": { "recommendedName": { "fullName": { "value": "Hemoglobin subunit alpha" } } },
                    "organism": { "scientificName": "Homo sapiens" },
                    "genes": [ { "geneName": { "value": "HBA1" } } ]
                } ]
            })
            .to_string(),
        ),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn quickgo_annotations() -> (StatusCode, String) {
    (
        StatusCode::OK,
        json!({
            "results": [
                { "goId": "GO:0005833", "goAspect": "cellular_component", "goName": "hemoglobin complex" },
                { "goId": "GO:0019825", "goAspect": "molecular_function", "goName": "oxygen binding" }
            ]
        })
        .to_string(),
    )
}

async fn pubchem_down() -> (StatusCode, String) {
    (StatusCode::SERVICE_UNAVAILABLE, String::new())
}

async fn quickgo_term(Path(id): Path<String>) -> (StatusCode, String) {
    match id.as_str() {
        "GO:0005833" => (StatusCode::OK, json!({ "results": [ { "name": "hemoglobin complex" } ] }).to_string()),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn alphafold(Path(file): Path<String>) -> (StatusCode, String) {
    match file.as_str() {
        "AF-P69905-F1-model_v4.pdb" => (StatusCode::OK, sample_pdb()),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn stub_services() -> String {
    spawn_stub(
        Router::new()
            .route("/compute", post(rdkit))
            .route("/uniprotkb/{file}", get(uniprot))
            .route("/quickgo/ontology/go/terms/{id}", get(quickgo_term))
            .route("/quickgo/annotation/search", get(quickgo_annotations))
            .route("/pubchem/{*rest}", get(pubchem_down))
            .route("/alphafold/{file}", get(alphafold)),
    )
    .await
}

fn config(stub: &str, model_path: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.endpoints.uniprot = format!("{}/uniprotkb", stub);
    config.endpoints.chembl = format!("{}/chembl", stub);
    config.endpoints.pubchem = format!("{}/pubchem", stub);
    config.endpoints.rcsb = format!("{}/rcsb", stub);
    config.endpoints.alphafold = format!("{}/alphafold", stub);
    config.endpoints.quickgo = format!("{}/quickgo", stub);
    config.endpoints.clustalo = format!("{}/clustalo", stub);
    config.descriptors.rdkit_url = format!("{}/compute", stub);
    config.model.path = model_path.to_string();
    config.chat.api_key_env = "BIOSTRUCTX_TEST_KEY_THAT_IS_NEVER_SET".to_string();
    config
}

async fn app_with_model(model_path: &str) -> Router {
    let stub = stub_services().await;
    build_router(AppState::from_config(config(&stub, model_path)).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_req(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_req(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

#[tokio::test]
async fn test_healthz_reports_loaded_parts() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, get_req("/healthz")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["chat_enabled"], false);
    assert_eq!(body["descriptor_provider"], "rdkit_service");
}

#[tokio::test]
async fn test_home_page_theme_and_cards() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, get_req("/?theme=dark")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains(r#"data-theme="dark""#));
    assert!(html.contains("BioStructX: Structural Intelligence Platform"));
    assert!(html.contains("/ligand-clusters?theme=dark"));
    assert!(html.contains("?theme=light"));
}

#[tokio::test]
async fn test_affinity_api_resolves_accession() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, json_req("/api/affinity", json!({ "ligand": "CCO", "protein": "P69905" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["smiles"], "CCO");
    assert_eq!(body["sequence_length"], 47);
    let affinity = body["affinity"].as_f64().unwrap();
    assert!((-10.8..=-6.0).contains(&affinity), "affinity {}", affinity);
    assert_eq!(body["features"].as_object().unwrap().len(), 9);
    assert!(body["summary"].as_str().unwrap().starts_with("Predicted Binding Affinity: "));
}

#[tokio::test]
async fn test_affinity_api_invalid_inputs() {
    let app = app_with_model(SHIPPED_MODEL).await;

    let resp = send(&app, json_req("/api/affinity", json!({ "ligand": "CCO", "protein": "" }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "invalid_protein");

    let resp = send(&app, json_req("/api/affinity", json!({ "ligand": "not-a-smiles", "protein": "MKTIIALSYIFCLVFA" }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["kind"], "invalid_ligand");
}

#[tokio::test]
async fn test_affinity_api_missing_fields_use_error_shape() {
    let app = app_with_model(SHIPPED_MODEL).await;

    let resp = send(&app, json_req("/api/affinity", json!({ "ligand": "CCO" }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "invalid_protein");

    let resp = send(&app, json_req("/api/affinity", json!({ "protein": "MKTIIALSYIFCLVFA" }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["kind"], "invalid_ligand");
}

#[tokio::test]
async fn test_affinity_form_renders_label_and_chart() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, form_req("/affinity", "ligand=CCO&protein=MKTIIALSYIFCLVFA&protein_upload=")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("Predicted Binding Affinity:"));
    assert!(html.contains("<svg"));
    assert!(html.contains("kcal/mol"));
}

#[tokio::test]
async fn test_missing_model_disables_only_affinity() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let app = app_with_model(missing.to_str().unwrap()).await;

    let resp = send(&app, get_req("/affinity")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(resp).await.contains("Affinity prediction is disabled"));

    let resp = send(&app, json_req("/api/affinity", json!({ "ligand": "CCO", "protein": "MKTIIALSYIFCLVFA" }))).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["kind"], "model_unavailable");

    let resp = send(&app, get_req("/protein")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(send(&app, get_req("/healthz")).await).await;
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_corrupt_model_file_disables_affinity() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{ not json").unwrap();
    let app = app_with_model(file.path().to_str().unwrap()).await;

    let resp = send(&app, get_req("/affinity")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_protein_api_profile_and_go_terms() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(
        &app,
        json_req("/api/protein", json!({ "sequence": ">sp|P69905|HBA_HUMAN\nMVLSPADKTNVKAAWGKVGA" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let analysis = &body_json(resp).await["analysis"];
    assert_eq!(analysis["accession"], "P69905");
    assert_eq!(analysis["profile"]["length"], 20);
    assert_eq!(analysis["profile"]["composition"].as_array().unwrap().len(), 10);
    let terms = analysis["go_terms"].as_array().unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0]["name"], "hemoglobin complex");
    assert!(terms[1]["name"].is_null());
}

#[tokio::test]
async fn test_protein_non_alphabetic_warning() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, json_req("/api/protein", json!({ "sequence": "MKT123" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let analysis = &body_json(resp).await["analysis"];
    assert!(analysis["profile"].is_null());
    assert_eq!(analysis["warnings"][0], "Sequence must contain only alphabetic characters (amino acids).");
}

#[tokio::test]
async fn test_structure_from_alphafold_and_headerless_fasta() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, json_req("/api/structure", json!({ "kind": "uniprot", "query": "p69905" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["structure"]["secondary"]["helix"], 50.0);
    assert_eq!(body["structure"]["secondary"]["residues"], 8);
    assert_eq!(body["structure"]["annotations"][0], "REMARK 999 DOMAIN: globin 1-4");

    let resp = send(&app, json_req("/api/structure", json!({ "kind": "fasta", "query": ">my protein\nMVLS" }))).await;
    let body = body_json(resp).await;
    assert!(body["structure"].is_null());
    assert!(body["warnings"][0].as_str().unwrap().contains("does not contain a UniProt ID header"));
}

#[tokio::test]
async fn test_browse_unknown_uniprot_entry_is_404() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, get_req("/browse/uniprot?id=Q99999")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("No UniProt ID record found"));

    let resp = send(&app, get_req("/api/browse/uniprot/P69905")).await;
    let body = body_json(resp).await;
    assert_eq!(body["entry"]["protein_name"], "Hemoglobin subunit alpha");
}

#[tokio::test]
async fn test_cluster_csv_download() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, form_req("/ligand-clusters/csv", "ligands=CCO%0ACCO&input_kind=smiles&cluster=")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"));
    assert_eq!(body_text(resp).await, "Index,SMILES,Cluster\n1,CCO,0\n2,CCO,0\n");
}

#[tokio::test]
async fn test_cluster_api_needs_two_valid_ligands() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, json_req("/api/ligand-clusters", json!({ "ligands": "CCO\nnot-a-smiles" }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["message"], "Need at least 2 valid ligands for clustering.");
}

#[tokio::test]
async fn test_evolution_requires_two_ids() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, json_req("/api/evolution", json!({ "ids": "P69905, p69905" }))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["kind"], "invalid_input");
}

#[tokio::test]
async fn test_chat_disabled_without_api_key() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, get_req("/chat")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(resp).await.contains("BIOSTRUCTX_TEST_KEY_THAT_IS_NEVER_SET"));

    let resp = send(&app, json_req("/api/chat", json!({ "question": "What is a kinase?" }))).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["kind"], "chat_unavailable");
}

fn warnings(body: &Value) -> Vec<String> {
    body["report"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_drug_gene_keeps_target_when_pubchem_fails() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, get_req("/api/drug-gene?query=hemoglobin")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let report = &body["report"];
    assert!(report["compound"].is_null());
    assert_eq!(report["target"]["accession"], "P69905");
    assert_eq!(report["target"]["gene"], "HBA1");
    let annotations = report["annotations"].as_array().unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[1]["go_name"], "oxygen binding");

    let warnings = warnings(&body);
    assert!(warnings.iter().any(|w| w.starts_with("Compound properties unavailable")));
    assert!(warnings.iter().any(|w| w.starts_with("Similar compounds unavailable")));

    let resp = send(&app, get_req("/drug-gene?query=hemoglobin")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("P69905"));
    assert!(html.contains("Compound properties unavailable"));
}

#[tokio::test]
async fn test_drug_gene_skips_similarity_for_short_smiles() {
    let app = app_with_model(SHIPPED_MODEL).await;
    let resp = send(&app, get_req("/api/drug-gene?query=CCO")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["report"]["smiles"], "CCO");
    assert!(body["report"]["similar"].as_array().unwrap().is_empty());
    let warnings = warnings(&body);
    assert!(warnings.iter().any(|w| w.starts_with("Compound properties unavailable")));
    assert!(!warnings.iter().any(|w| w.starts_with("Similar compounds")));
}
