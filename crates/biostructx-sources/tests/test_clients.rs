//! Client tests against local stub servers.
//!
//! Run with: cargo test --package biostructx-sources --test test_clients

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use biostructx_common::{BioStructXError, HttpClient};
use biostructx_sources::chembl::ChemblClient;
use biostructx_sources::clustalo::ClustaloClient;
use biostructx_sources::pubchem::PubChemClient;
use biostructx_sources::uniprot::UniProtClient;
use biostructx_sources::SourceError;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn uniprot_file(Path(file): Path<String>) -> (StatusCode, String) {
    match file.as_str() {
        "P69905.json" => (
            StatusCode::OK,
            json!({
                "primaryAccession": "P69905",
                "proteinDescription": { "recommendedName": { "fullName": { "value": "Hemoglobin subunit alpha" } } },
                "organism": { "scientificName": "Homo sapiens" },
                "genes": [ { "geneName": { "value": "HBA1" } } ]
            })
            .to_string(),
        ),
        "P69905.fasta" => (StatusCode::OK, ">sp|P69905|HBA_HUMAN\nMVLSPADKTN\nVKAAWGKVGA\n".to_string()),
        "P99999.json" => (StatusCode::SERVICE_UNAVAILABLE, String::new()),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

#[tokio::test]
async fn test_uniprot_entry_and_fasta() {
    let base = spawn_stub(Router::new().route("/uniprotkb/{file}", get(uniprot_file))).await;
    let client = UniProtClient::new(HttpClient::new().unwrap(), format!("{}/uniprotkb", base));

    let entry = client.fetch_entry("P69905").await.unwrap().unwrap();
    assert_eq!(entry.protein_name.as_deref(), Some("Hemoglobin subunit alpha"));
    assert_eq!(entry.gene_names, vec!["HBA1"]);

    let seq = client.fetch_sequence("P69905").await.unwrap().unwrap();
    assert_eq!(seq, "MVLSPADKTNVKAAWGKVGA");
}

#[tokio::test]
async fn test_uniprot_not_found_and_upstream_failure() {
    let base = spawn_stub(Router::new().route("/uniprotkb/{file}", get(uniprot_file))).await;
    let client = UniProtClient::new(HttpClient::new().unwrap(), format!("{}/uniprotkb", base));

    assert!(client.fetch_entry("Q00000").await.unwrap().is_none());
    assert!(client.fetch_sequence("Q00000").await.unwrap().is_none());

    let err = client.fetch_entry("P99999").await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_chembl_canonical_smiles() {
    let router = Router::new().route(
        "/chembl/molecule/{file}",
        get(|Path(file): Path<String>| async move {
            match file.as_str() {
                "CHEMBL25.json" => Ok(Json(json!({
                    "molecule_chembl_id": "CHEMBL25",
                    "pref_name": "ASPIRIN",
                    "molecule_structures": { "canonical_smiles": "CC(=O)Oc1ccccc1C(=O)O" }
                }))),
                _ => Err(StatusCode::NOT_FOUND),
            }
        }),
    );
    let base = spawn_stub(router).await;
    let client = ChemblClient::new(HttpClient::new().unwrap(), format!("{}/chembl", base));

    let smiles = client.canonical_smiles("CHEMBL25").await.unwrap();
    assert_eq!(smiles.as_deref(), Some("CC(=O)Oc1ccccc1C(=O)O"));
    assert!(client.canonical_smiles("CHEMBL0").await.unwrap().is_none());
}

#[tokio::test]
async fn test_pubchem_similarity_passes_threshold() {
    let router = Router::new().route(
        "/pug/compound/fastsimilarity_2d/smiles/cids/JSON",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            assert_eq!(q.get("Threshold").map(String::as_str), Some("70"));
            assert_eq!(q.get("smiles").map(String::as_str), Some("CC(=O)Oc1ccccc1C(=O)O"));
            Json(json!({ "IdentifierList": { "CID": [2244, 5161, 68484, 71339, 12345, 999] } }))
        }),
    );
    let base = spawn_stub(router).await;
    let client = PubChemClient::new(HttpClient::new().unwrap(), format!("{}/pug", base));

    let cids = client.similar_cids("CC(=O)Oc1ccccc1C(=O)O", 70, 5).await.unwrap();
    assert_eq!(cids, vec![2244, 5161, 68484, 71339, 12345]);
}

#[tokio::test]
async fn test_pubchem_descriptors_by_smiles() {
    let router = Router::new().route(
        "/pug/compound/smiles/property/{props}/JSON",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            if q.get("smiles").map(String::as_str) == Some("CCO") {
                Ok(Json(json!({ "PropertyTable": { "Properties": [ {
                    "MolecularWeight": "46.07", "XLogP": -0.1, "TPSA": 20.2, "RotatableBondCount": 0
                } ] } })))
            } else {
                Err(StatusCode::BAD_REQUEST)
            }
        }),
    );
    let base = spawn_stub(router).await;
    let client = PubChemClient::new(HttpClient::new().unwrap(), format!("{}/pug", base));

    let props = client.descriptors_by_smiles("CCO").await.unwrap().unwrap();
    assert_eq!(props.molecular_weight, Some(46.07));
    assert!(client.descriptors_by_smiles("not-a-smiles").await.unwrap().is_none());
}

#[derive(Clone, Default)]
struct JobState {
    polls: Arc<AtomicUsize>,
}

#[tokio::test]
async fn test_clustalo_job_lifecycle() {
    let state = JobState::default();
    let router = Router::new()
        .route("/clustalo/run", post(|| async { "clustalo-R20261016-001" }))
        .route(
            "/clustalo/status/{job}",
            get(|State(s): State<JobState>| async move {
                if s.polls.fetch_add(1, Ordering::SeqCst) < 2 { "RUNNING" } else { "FINISHED" }
            }),
        )
        .route(
            "/clustalo/result/{job}/{kind}",
            get(|Path((_job, kind)): Path<(String, String)>| async move {
                match kind.as_str() {
                    "aln-fasta" => ">a\nMK-T\n>b\nMKAT\n".to_string(),
                    _ => "(a:0.1,b:0.1);".to_string(),
                }
            }),
        )
        .with_state(state.clone());
    let base = spawn_stub(router).await;

    let client = ClustaloClient::new(HttpClient::new().unwrap(), format!("{}/clustalo", base), "test@example.org")
        .with_polling(Duration::from_millis(5), 10);
    let out = client.align(">a\nMKT\n>b\nMKAT\n").await.unwrap();

    assert_eq!(out.job_id, "clustalo-R20261016-001");
    assert!(out.alignment.contains("MK-T"));
    assert!(!out.tree_is_empty());
    assert_eq!(state.polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_clustalo_gives_up_after_max_polls() {
    let router = Router::new()
        .route("/run", post(|| async { "job-1" }))
        .route("/status/{job}", get(|| async { "RUNNING" }));
    let base = spawn_stub(router).await;

    let client = ClustaloClient::new(HttpClient::new().unwrap(), base, "test@example.org")
        .with_polling(Duration::from_millis(1), 3);
    let err = client.align(">a\nMKT\n").await.unwrap_err();
    assert!(matches!(err, SourceError::Job { .. }));
}

#[tokio::test]
async fn test_clustalo_failed_job() {
    let router = Router::new()
        .route("/run", post(|| async { "job-2" }))
        .route("/status/{job}", get(|| async { "ERROR" }));
    let base = spawn_stub(router).await;

    let client = ClustaloClient::new(HttpClient::new().unwrap(), base, "test@example.org");
    let err = client.align(">a\nMKT\n").await.unwrap_err();
    assert!(err.to_string().contains("failed"));
}

#[tokio::test]
async fn test_blocked_host_never_sends() {
    let client = UniProtClient::new(HttpClient::new().unwrap(), "https://uniprot.mirror.invalid");
    let err = client.fetch_entry("P69905").await.unwrap_err();
    assert!(matches!(err, SourceError::Client(BioStructXError::Security(_))));
}
