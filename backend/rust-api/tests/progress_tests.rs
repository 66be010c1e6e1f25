use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

/// Register a fresh user and return their access token
async fn register_and_token(app: &axum::Router, username: &str) -> String {
    let request_body = json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "password123",
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["access_token"].as_str().unwrap().to_string()
}

/// Generate an easy addition problem and return its payload
async fn generate_problem(app: &axum::Router, token: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/problems")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "operation": "addition", "difficulty": "easy" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Recompute the expected answer from a problem payload
fn expected_answer(payload: &serde_json::Value) -> f64 {
    let operand1 = payload["operand1"].as_f64().unwrap();
    let operand2 = payload["operand2"].as_f64().unwrap();
    match payload["operation"].as_str().unwrap() {
        "addition" => operand1 + operand2,
        "subtraction" => operand1 - operand2,
        "multiplication" => operand1 * operand2,
        "division" => operand1 / operand2,
        other => panic!("unexpected operation {other}"),
    }
}

/// Submit an answer and return (status, parsed body)
async fn submit_answer(
    app: &axum::Router,
    token: &str,
    problem_id: i64,
    user_answer: f64,
) -> (StatusCode, serde_json::Value) {
    let request_body = json!({
        "problem_id": problem_id,
        "user_answer": user_answer,
        "time_taken": 3.0,
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/progress")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Generate a problem and submit either the right or a wrong answer
async fn attempt(app: &axum::Router, token: &str, correct: bool) -> serde_json::Value {
    let problem = generate_problem(app, token).await;
    let answer = expected_answer(&problem);
    let submitted = if correct { answer } else { answer + 5.0 };

    let (status, json) =
        submit_answer(app, token, problem["id"].as_i64().unwrap(), submitted).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_correct"], correct);
    json
}

async fn get_with_token(app: &axum::Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_submit_correct_answer() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "submit_correct").await;

    let problem = generate_problem(&app, &token).await;
    let answer = expected_answer(&problem);

    let (status, json) =
        submit_answer(&app, &token, problem["id"].as_i64().unwrap(), answer).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_correct"], true);
    assert!((json["correct_answer"].as_f64().unwrap() - answer).abs() < 1e-9);
    // One correct attempt out of one promotes a beginner
    assert_eq!(json["new_level"], "intermediate");
}

#[tokio::test]
async fn test_submit_wrong_answer() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "submit_wrong").await;

    let problem = generate_problem(&app, &token).await;
    let answer = expected_answer(&problem);

    let (status, json) =
        submit_answer(&app, &token, problem["id"].as_i64().unwrap(), answer + 5.0).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_correct"], false);
    assert!((json["correct_answer"].as_f64().unwrap() - answer).abs() < 1e-9);
    assert_eq!(json["new_level"], "beginner");
}

#[tokio::test]
async fn test_submit_within_tolerance() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "submit_close").await;

    let problem = generate_problem(&app, &token).await;
    let answer = expected_answer(&problem);

    // 0.005 off is still inside the 0.01 grading tolerance
    let (status, json) =
        submit_answer(&app, &token, problem["id"].as_i64().unwrap(), answer + 0.005).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_correct"], true);
}

#[tokio::test]
async fn test_submit_unknown_problem() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "submit_missing").await;

    let (status, _) = submit_answer(&app, &token, 424242, 1.0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_requires_auth() {
    let app = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/progress")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "problem_id": 1, "user_answer": 2.0 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_negative_time_rejected() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "submit_negtime").await;

    let problem = generate_problem(&app, &token).await;
    let request_body = json!({
        "problem_id": problem["id"],
        "user_answer": 1.0,
        "time_taken": -2.0,
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/progress")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_level_progression_and_demotion() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "level_walk").await;

    // 1 of 1 correct: rate 1.0 promotes beginner to intermediate
    let result = attempt(&app, &token, true).await;
    assert_eq!(result["new_level"], "intermediate");

    // 1 of 2 correct: rate 0.5 sits between the thresholds, level holds
    let result = attempt(&app, &token, false).await;
    assert_eq!(result["new_level"], "intermediate");

    // 1 of 3 correct: rate 0.33 demotes back to beginner
    let result = attempt(&app, &token, false).await;
    assert_eq!(result["new_level"], "beginner");

    // 1 of 4 correct: rate 0.25 keeps demoting, but beginner is the floor
    let result = attempt(&app, &token, false).await;
    assert_eq!(result["new_level"], "beginner");
}

#[tokio::test]
async fn test_promotion_saturates_at_advanced() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "level_cap").await;

    let result = attempt(&app, &token, true).await;
    assert_eq!(result["new_level"], "intermediate");

    let result = attempt(&app, &token, true).await;
    assert_eq!(result["new_level"], "advanced");

    // Advanced is the ceiling
    let result = attempt(&app, &token, true).await;
    assert_eq!(result["new_level"], "advanced");

    // An advanced user now defaults to hard problems
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/problems")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["difficulty"], "hard");
}

#[tokio::test]
async fn test_recent_progress_newest_first() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "recent_order").await;

    let mut last_problem_id = 0;
    for correct in [true, false, true] {
        let problem = generate_problem(&app, &token).await;
        last_problem_id = problem["id"].as_i64().unwrap();
        let answer = expected_answer(&problem);
        let submitted = if correct { answer } else { answer + 5.0 };
        let (status, _) = submit_answer(&app, &token, last_problem_id, submitted).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = get_with_token(&app, "/api/v1/progress/recent", &token).await;
    assert_eq!(status, StatusCode::OK);

    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    // Most recent attempt comes first
    assert_eq!(entries[0]["problem_id"].as_i64().unwrap(), last_problem_id);
    assert_eq!(entries[0]["is_correct"], true);
    assert_eq!(entries[1]["is_correct"], false);
    assert_eq!(entries[2]["is_correct"], true);
}

#[tokio::test]
async fn test_recent_progress_caps_at_fifty() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "recent_cap").await;

    let problem = generate_problem(&app, &token).await;
    let problem_id = problem["id"].as_i64().unwrap();
    let answer = expected_answer(&problem);

    for _ in 0..55 {
        let (status, _) = submit_answer(&app, &token, problem_id, answer).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = get_with_token(&app, "/api/v1/progress/recent", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn test_progress_stats_for_new_user() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "stats_fresh").await;

    let (status, json) = get_with_token(&app, "/api/v1/progress/stats", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_attempts"], 0);
    assert_eq!(json["correct_attempts"], 0);
    assert_eq!(json["success_rate"], 0.0);
    assert_eq!(json["current_level"], "beginner");
}

#[tokio::test]
async fn test_progress_stats_after_attempts() {
    let app = common::create_test_app().await;
    let token = register_and_token(&app, "stats_mixed").await;

    attempt(&app, &token, true).await;
    attempt(&app, &token, false).await;

    let (status, json) = get_with_token(&app, "/api/v1/progress/stats", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_attempts"], 2);
    assert_eq!(json["correct_attempts"], 1);
    assert!((json["success_rate"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    // The first correct attempt promoted them, the miss only held the level
    assert_eq!(json["current_level"], "intermediate");
}
