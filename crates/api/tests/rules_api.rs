//! HTTP-level integration tests for the rule CRUD endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_rule, delete, get, post_json, put_json};
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rule_returns_201(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/rules",
        serde_json::json!({
            "boss_name": "Ana",
            "boss_extension": " 200 ",
            "secretary_extension": "201",
            "whitelist": "300,301"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["boss_extension"], "200");
    assert_eq!(json["data"]["whitelist"], "300,301");
    assert_eq!(json["data"]["enabled"], true);
    assert!(json["data"]["id"].is_number());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_boss_is_rejected_with_409(pool: SqlitePool) {
    create_rule(&pool, "200", "201", "300,301").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/rules",
        serde_json::json!({
            "boss_extension": "200",
            "secretary_extension": "202"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(
        json["error"],
        "The selected boss extension is already in use by another rule."
    );

    let app = common::build_test_app(pool);
    let list = body_json(get(app, "/api/v1/rules").await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_extension_returns_400(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/rules",
        serde_json::json!({
            "boss_extension": "",
            "secretary_extension": "201"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_hides_whitelist(pool: SqlitePool) {
    create_rule(&pool, "200", "201", "300").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    let row = &json["data"][0];

    assert_eq!(row["boss_extension"], "200");
    assert_eq!(row["secretary_extension"], "201");
    assert_eq!(row["boss_name"], "Boss 200");
    assert!(row.get("whitelist").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_missing_rule_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/rules/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_keeps_absent_fields(pool: SqlitePool) {
    let id = create_rule(&pool, "200", "201", "300").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/rules/{id}"),
        serde_json::json!({ "enabled": false }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["enabled"], false);
    assert_eq!(json["data"]["whitelist"], "300");
    assert_eq!(json["data"]["secretary_extension"], "201");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_to_taken_boss_returns_409(pool: SqlitePool) {
    create_rule(&pool, "200", "201", "").await;
    let id = create_rule(&pool, "300", "301", "").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/rules/{id}"),
        serde_json::json!({ "boss_extension": "200" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Re-saving a rule with its own boss extension is fine.
    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/rules/{id}"),
        serde_json::json!({ "boss_extension": "300", "whitelist": "9" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_rule_returns_204_then_404(pool: SqlitePool) {
    let id = create_rule(&pool, "200", "201", "").await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/rules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/rules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/rules/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn action_bar_depends_on_view(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/rules/action-bar?view=form&id=4").await).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["delete", "reset", "submit"]);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules/action-bar").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
