// tests/api_test.rs - HTTP API over a live listener

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use travos_trust::api::{router, AppState};
use travos_trust::scenario::{Scenario, ScenarioDocument};
use travos_trust::store::{scenario_name, ScenarioStore};
use travos_trust::trust::BatchEvaluator;

async fn spawn_server(store: ScenarioStore) -> SocketAddr {
    let state = Arc::new(AppState::new(store, BatchEvaluator::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

fn seeded_store() -> ScenarioStore {
    let store = ScenarioStore::in_memory().unwrap();

    let good = Scenario::builder()
        .name("scenario_1")
        .users(["A", "B", "C"])
        .history("B", "A", 9, 1)
        .history("C", "A", 6, 1)
        .history("A", "B", 0, 0)
        .history("C", "B", 1, 5)
        .observe("A", "B", "m1")
        .observe("B", "A", "m2")
        .build()
        .unwrap();
    store
        .put_scenario(&scenario_name(1), &ScenarioDocument::from(&good))
        .unwrap();

    let lonely = Scenario::builder()
        .name("scenario_2")
        .users(["A", "B"])
        .history("B", "A", 0, 0)
        .observe("A", "B", "m1")
        .build()
        .unwrap();
    store
        .put_scenario(&scenario_name(2), &ScenarioDocument::from(&lonely))
        .unwrap();

    store
}

#[tokio::test]
async fn test_health_and_index() {
    let addr = spawn_server(ScenarioStore::in_memory().unwrap()).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let index = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert!(index.status().is_success());
    assert!(index.text().await.unwrap().contains("Travos"));

    let api: Value = client
        .get(format!("http://{}/api", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(api["endpoints"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_and_show_scenarios() {
    let addr = spawn_server(seeded_store()).await;
    let client = reqwest::Client::new();

    let names: Vec<String> = client
        .get(format!("http://{}/api/getAllScenarios", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names, vec!["scenario_1", "scenario_2"]);

    let details: Value = client
        .get(format!("http://{}/api/getScenarioDetails/1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details["name"], "scenario_1");
    assert_eq!(details["history"]["B"]["A"], json!([9, 1]));

    let missing = client
        .get(format!("http://{}/api/getScenarioDetails/9", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Scenario 9 not found");
}

#[tokio::test]
async fn test_start_evaluation() {
    let addr = spawn_server(seeded_store()).await;
    let client = reqwest::Client::new();

    for scenario in [json!(1), json!("1")] {
        let response = client
            .post(format!("http://{}/api/startEvaluation", addr))
            .json(&json!({ "scenario": scenario }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Evaluation started for scenario 1");

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["observation(1)"], "m1");
        assert_eq!(results[0]["final_trust_outcome"], "(10, 1)");
        assert_eq!(results[0]["sender"], "A");
        assert_eq!(results[0]["receiver"], "B");
        assert_eq!(results[1]["observation(2)"], "m2");
        assert_eq!(results[1]["previous_history"], "(0, 0)");
        assert_eq!(results[1]["final_trust_outcome"], "(0, 1)");
    }
}

#[tokio::test]
async fn test_start_evaluation_errors() {
    let addr = spawn_server(seeded_store()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/startEvaluation", addr);

    let missing = client
        .post(&url)
        .json(&json!({ "scenario": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let insufficient = client
        .post(&url)
        .json(&json!({ "scenario": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(insufficient.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = insufficient.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Insufficient data"));
}

#[tokio::test]
async fn test_blank_scenario_is_bad_request() {
    let addr = spawn_server(seeded_store()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/startEvaluation", addr))
        .json(&json!({ "scenario": " " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cross_origin_requests_are_allowed() {
    let addr = spawn_server(seeded_store()).await;
    let response = reqwest::Client::new()
        .get(format!("http://{}/api/getAllScenarios", addr))
        .header("Origin", "http://frontend.example")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unreadable_requests_get_json_errors() {
    let addr = spawn_server(seeded_store()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/startEvaluation", addr);

    let missing_key = client
        .post(&url)
        .json(&json!({ "scenarios": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_key.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = missing_key.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("scenario"));

    let invalid_json = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(invalid_json.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = invalid_json.json().await.unwrap();
    assert!(body["error"].is_string());

    let bad_path = client
        .get(format!("http://{}/api/getScenarioDetails/first", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_path.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = bad_path.json().await.unwrap();
    assert!(body["error"].is_string());
}
