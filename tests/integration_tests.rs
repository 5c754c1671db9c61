// Integration tests for Stable Match

use actix_web::{http::StatusCode, test, web, App};
use serde_json::json;
use stable_match::config::MatchingSettings;
use stable_match::models::{
    EnumerateResponse, ErrorResponse, Matching, Pair, PreferenceInstance, SolveResponse, VerifyResponse,
};
use stable_match::routes::{self, matching::AppState};
use stable_match::services::SolutionCache;
use std::sync::Arc;

fn app_state() -> AppState {
    AppState {
        cache: Arc::new(SolutionCache::new(100, 60)),
        matching: MatchingSettings {
            max_instance_size: 50,
            max_enumeration_size: 5,
            default_seed: 42,
        },
    }
}

fn four_by_four() -> serde_json::Value {
    json!({
        "proposers": {
            "1": ["c", "d", "b", "a"],
            "2": ["d", "a", "c", "b"],
            "3": ["d", "c", "b", "a"],
            "4": ["c", "d", "b", "a"]
        },
        "reviewers": {
            "a": [2, 3, 4, 1],
            "b": [3, 4, 1, 2],
            "c": [2, 3, 1, 4],
            "d": [4, 1, 2, 3]
        }
    })
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!(app_state());
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_solve_end_to_end() {
    let app = init_app!(app_state());
    let req = test::TestRequest::post()
        .uri("/api/v1/matching/solve")
        .set_json(four_by_four())
        .to_request();
    let body: SolveResponse = test::call_and_read_body_json(&app, req).await;

    let expected = Matching::new(vec![
        Pair::new("1", "b"),
        Pair::new("2", "a"),
        Pair::new("3", "c"),
        Pair::new("4", "d"),
    ]);
    assert_eq!(body.pairs, expected);
    assert!(body.stable);
    assert!(!body.cached);
    assert!(body.trace.is_none());
}

#[actix_web::test]
async fn test_second_solve_is_cached() {
    let app = init_app!(app_state());

    for expect_cached in [false, true] {
        let req = test::TestRequest::post()
            .uri("/api/v1/matching/solve")
            .set_json(four_by_four())
            .to_request();
        let body: SolveResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.cached, expect_cached);
        assert_eq!(body.pairs.len(), 4);
    }
}

#[actix_web::test]
async fn test_verbose_solve_returns_trace() {
    let app = init_app!(app_state());
    let mut payload = four_by_four();
    payload["verbose"] = json!(true);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/solve")
        .set_json(payload)
        .to_request();
    let body: SolveResponse = test::call_and_read_body_json(&app, req).await;

    let trace = body.trace.expect("trace requested");
    assert_eq!(trace.len(), body.rounds);
    assert_eq!(trace[0].proposals.len(), 4);
}

#[actix_web::test]
async fn test_solve_rejects_malformed_lists() {
    let app = init_app!(app_state());
    let mut payload = four_by_four();
    payload["proposers"]["2"] = json!(["d", "a", "c", "d"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/solve")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Malformed input");
}

#[actix_web::test]
async fn test_solve_rejects_repeated_participant() {
    let app = init_app!(app_state());
    let raw = r#"{"proposers": {"1": ["a", "b"], "2": ["a", "b"], "2": ["b", "a"]},
                  "reviewers": {"a": [1, 2], "b": [1, 2]}}"#;

    for uri in ["/api/v1/matching/solve", "/api/v1/matching/enumerate"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("content-type", "application/json"))
            .set_payload(raw)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_clear_cache() {
    let app = init_app!(app_state());
    let solve = || {
        test::TestRequest::post()
            .uri("/api/v1/matching/solve")
            .set_json(four_by_four())
            .to_request()
    };

    let _: SolveResponse = test::call_and_read_body_json(&app, solve()).await;

    let req = test::TestRequest::delete().uri("/api/v1/matching/cache").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let body: SolveResponse = test::call_and_read_body_json(&app, solve()).await;
    assert!(!body.cached);
}

#[actix_web::test]
async fn test_solve_rejects_unequal_groups() {
    let app = init_app!(app_state());
    let payload = json!({
        "proposers": {"1": ["a"], "2": ["a"]},
        "reviewers": {"a": [1, 2]}
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/solve")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_verify_reports_rogue_pair() {
    let app = init_app!(app_state());
    let mut payload = four_by_four();
    payload["pairs"] = json!([
        {"proposer": "1", "reviewer": "c"},
        {"proposer": "2", "reviewer": "a"},
        {"proposer": "3", "reviewer": "b"},
        {"proposer": "4", "reviewer": "d"}
    ]);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/verify")
        .set_json(payload)
        .to_request();
    let body: VerifyResponse = test::call_and_read_body_json(&app, req).await;

    assert!(!body.stable);
    assert_eq!(body.rogue_pair, Some(Pair::new("3", "c")));
}

#[actix_web::test]
async fn test_verify_rejects_incomplete_matching() {
    let app = init_app!(app_state());
    let mut payload = four_by_four();
    payload["pairs"] = json!([{"proposer": "1", "reviewer": "b"}]);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/verify")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_enumerate_lists_stable_matchings() {
    let app = init_app!(app_state());
    let payload = json!({
        "proposers": {"1": ["a", "b"], "2": ["b", "a"]},
        "reviewers": {"a": [2, 1], "b": [1, 2]}
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/enumerate")
        .set_json(payload)
        .to_request();
    let body: EnumerateResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.count, 2);
    assert!(body
        .matchings
        .contains(&Matching::new(vec![Pair::new("1", "a"), Pair::new("2", "b")])));
    assert!(body
        .matchings
        .contains(&Matching::new(vec![Pair::new("1", "b"), Pair::new("2", "a")])));
}

#[actix_web::test]
async fn test_enumerate_refuses_large_instances() {
    let app = init_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/generate")
        .set_json(json!({"size": 6, "seed": 1}))
        .to_request();
    let instance: PreferenceInstance = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/enumerate")
        .set_json(&instance)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_enumerate_checks_size_before_building() {
    let app = init_app!(app_state());
    let proposers: serde_json::Map<String, serde_json::Value> =
        (1..=6).map(|i| (i.to_string(), json!(["a"]))).collect();

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/enumerate")
        .set_json(json!({"proposers": proposers, "reviewers": {"a": [1]}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_generate_is_reproducible() {
    let app = init_app!(app_state());
    let mut generated = Vec::new();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/matching/generate")
            .set_json(json!({"size": 8, "seed": 99}))
            .to_request();
        let instance: PreferenceInstance = test::call_and_read_body_json(&app, req).await;
        generated.push(instance);
    }

    assert_eq!(generated[0], generated[1]);
    assert_eq!(generated[0].size(), 8);
}

#[actix_web::test]
async fn test_generate_validates_size() {
    let app = init_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/generate")
        .set_json(json!({"size": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/matching/generate")
        .set_json(json!({"size": 51}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
