// HTTP contract tests for the record store client against a mock server:
// URL shapes, auth, query-parameter conventions, error mapping, caching.

use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dugout::contract::{Contract, DealStage, Pitch, PitchStatus, SignatureSet, Terms};
use dugout::store::{ContractPatch, ContractRow, ContractStore, Query, RecordStoreClient, StoreError};

fn sample_contract(team_id: Uuid, stage: DealStage) -> Contract {
    let at = Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap();
    Contract {
        id: Uuid::new_v4(),
        pitch_id: Uuid::new_v4(),
        team_id,
        agent_id: Some(Uuid::new_v4()),
        value_minor: 7_500_000_00,
        currency: "EUR".to_string(),
        terms: Terms::PlainText("3 years, performance bonuses".to_string()),
        stage,
        signatures: SignatureSet::default(),
        review_note: None,
        expires_at: None,
        created_at: at,
        updated_at: at,
    }
}

fn row_json(contract: &Contract) -> serde_json::Value {
    serde_json::to_value(ContractRow::from_contract(contract)).unwrap()
}

fn client_for(server: &MockServer) -> RecordStoreClient {
    RecordStoreClient::from_parts(&server.uri(), "test-token", "acme").unwrap()
}

#[tokio::test]
async fn test_list_contracts_sends_wire_params_and_parses_envelope() {
    let server = MockServer::start().await;
    let team_id = Uuid::new_v4();
    let contract = sample_contract(team_id, DealStage::Negotiating);

    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces/acme/contracts"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("filter", format!("team_id:{team_id}")))
        .and(query_param("sort", "-updated_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [row_json(&contract)],
            "total": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new().filter("team_id", team_id).sort_desc("updated_at");
    let contracts = client.list_contracts(&query).await.unwrap();

    assert_eq!(contracts.len(), 1);
    assert_eq!(contracts[0].id, contract.id);
    assert_eq!(contracts[0].stage, DealStage::Negotiating);
}

#[tokio::test]
async fn test_fetch_contract_maps_404_to_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/workspaces/acme/contracts/{id}")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "row not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_contract(id).await.unwrap_err();
    match err {
        StoreError::NotFound { table, id: missing } => {
            assert_eq!(table, "contracts");
            assert_eq!(missing, id.to_string());
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_envelope_message_is_surfaced() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/workspaces/acme/teams/{id}")))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"error": "maintenance window"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_team(id).await.unwrap_err();
    match err {
        StoreError::Http { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_patches_only_the_changed_columns() {
    let server = MockServer::start().await;
    let team_id = Uuid::new_v4();
    let contract = sample_contract(team_id, DealStage::Draft);

    let mut updated = contract.clone();
    updated.stage = DealStage::Negotiating;
    Mock::given(method("PATCH"))
        .and(path(format!(
            "/api/v1/workspaces/acme/contracts/{}",
            contract.id
        )))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "deal_stage": "negotiating",
            "status": "active",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(row_json(&updated)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = ContractPatch::stage_change(DealStage::Negotiating, Utc::now());
    let result = client.update_contract(contract.id, &patch).await.unwrap();
    assert_eq!(result.stage, DealStage::Negotiating);

    // The patch body must not carry untouched columns.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3, "unexpected patch keys: {keys:?}");
    assert!(body.get("signatures").is_none());
    assert!(body.get("agent_id").is_none());
}

#[tokio::test]
async fn test_list_cache_serves_repeats_and_writes_invalidate() {
    let server = MockServer::start().await;
    let team_id = Uuid::new_v4();
    let contract = sample_contract(team_id, DealStage::Draft);

    // Two live hits expected: the first read, then the re-read after a write
    // invalidated the cached page. The repeat read in between is served from
    // cache and never reaches the wire.
    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces/acme/contracts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [row_json(&contract)],
            "total": 1,
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workspaces/acme/contracts"))
        .and(body_partial_json(json!({
            "deal_stage": "draft",
            "status": "draft",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(row_json(&contract)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new().filter("team_id", team_id);

    client.list_contracts(&query).await.unwrap();
    client.list_contracts(&query).await.unwrap();

    client.insert_contract(&contract).await.unwrap();
    client.list_contracts(&query).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn test_single_record_reads_are_never_cached() {
    let server = MockServer::start().await;
    let contract = sample_contract(Uuid::new_v4(), DealStage::UnderReview);

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/workspaces/acme/contracts/{}",
            contract.id
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(row_json(&contract)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.fetch_contract(contract.id).await.unwrap();
    client.fetch_contract(contract.id).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_list_pitches_sends_status_filter() {
    let server = MockServer::start().await;
    let team_id = Uuid::new_v4();
    let pitch = Pitch {
        id: Uuid::new_v4(),
        team_id,
        player_name: "J. Okafor".to_string(),
        position: "CM".to_string(),
        asking_price_minor: Some(12_000_000_00),
        currency: "EUR".to_string(),
        summary: None,
        status: PitchStatus::Open,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces/acme/pitches"))
        .and(query_param("filter", format!("team_id:{team_id}")))
        .and(query_param("filter", "status:open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [serde_json::to_value(&pitch).unwrap()],
            "total": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new()
        .filter("team_id", team_id)
        .filter("status", "open");
    let pitches = client.list_pitches(&query).await.unwrap();
    assert_eq!(pitches.len(), 1);
    assert_eq!(pitches[0].id, pitch.id);
    assert_eq!(pitches[0].status, PitchStatus::Open);
}

#[tokio::test]
async fn test_health_probe_is_workspace_unscoped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.health().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_row_with_legacy_stage_spelling_is_read_back_canonical() {
    let server = MockServer::start().await;
    let contract = sample_contract(Uuid::new_v4(), DealStage::Signed);
    let mut row = row_json(&contract);
    row["deal_stage"] = json!("finalizing");

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/workspaces/acme/contracts/{}",
            contract.id
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(row))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetched = client.fetch_contract(contract.id).await.unwrap();
    assert_eq!(fetched.stage, DealStage::Signed);
}
