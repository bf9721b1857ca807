//! Integration tests for the rule page's form action handler.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_rule, get, post_form};
use sqlx::SqlitePool;

const ACTIONS: &str = "/api/v1/rules/actions";

#[sqlx::test(migrations = "../db/migrations")]
async fn add_returns_success_toast(pool: SqlitePool) {
    let (app, state) = common::build_test_app_with_state(pool.clone(), &std::env::temp_dir());
    let response = post_form(
        app,
        ACTIONS,
        "action=add&id=&boss_name=Ana&boss_extension=200&secretary_extension=201\
         &whitelist=300%0A301&enabled=1",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["toast"]["level"], "success");
    assert_eq!(json["data"]["toast"]["title"], "Success");
    assert_eq!(json["data"]["toast"]["message"], "Rule added successfully!");
    assert_eq!(json["data"]["redirect"], "config.php?display=bosssec");
    assert!(state.reload.is_pending());

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    assert_eq!(json["data"][0]["boss_extension"], "200");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn add_duplicate_boss_returns_duplicate_toast(pool: SqlitePool) {
    create_rule(&pool, "200", "201", "300,301").await;

    let app = common::build_test_app(pool.clone());
    let response = post_form(
        app,
        ACTIONS,
        "action=add&boss_name=Other&boss_extension=200&secretary_extension=202",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["toast"]["level"], "error");
    assert_eq!(json["data"]["toast"]["title"], "Duplicate Boss");
    assert_eq!(
        json["data"]["toast"]["message"],
        "The selected boss extension is already in use by another rule."
    );

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["secretary_extension"], "201");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn edit_updates_and_disables(pool: SqlitePool) {
    let id = create_rule(&pool, "200", "201", "").await;

    let app = common::build_test_app(pool.clone());
    let body = format!(
        "action=edit&id={id}&boss_name=Ana&boss_extension=200&secretary_extension=205\
         &whitelist=&enabled=0"
    );
    let json = body_json(post_form(app, ACTIONS, &body).await).await;
    assert_eq!(json["data"]["toast"]["message"], "Rule successfully updated!");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/rules/{id}")).await).await;
    assert_eq!(json["data"]["secretary_extension"], "205");
    assert_eq!(json["data"]["enabled"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_missing_rule_returns_generic_error_toast(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let json = body_json(post_form(app, ACTIONS, "action=delete&id=77").await).await;

    assert_eq!(json["data"]["toast"]["level"], "error");
    assert_eq!(
        json["data"]["toast"]["message"],
        "An error occurred while processing the request."
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_removes_rule(pool: SqlitePool) {
    let id = create_rule(&pool, "200", "201", "").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(post_form(app, ACTIONS, &format!("action=delete&id={id}")).await).await;
    assert_eq!(json["data"]["toast"]["message"], "Rule successfully deleted!");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_fields_return_invalid_rule_toast(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let json = body_json(
        post_form(
            app,
            ACTIONS,
            "action=add&boss_extension=200&secretary_extension=200",
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["toast"]["title"], "Invalid Rule");
    assert_eq!(json["data"]["toast"]["level"], "error");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_action_returns_no_toast(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let json = body_json(post_form(app, ACTIONS, "boss_extension=200").await).await;

    assert!(json["data"]["toast"].is_null());
    assert_eq!(json["data"]["redirect"], "config.php?display=bosssec");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_action_returns_error_toast(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let json = body_json(post_form(app, ACTIONS, "action=purge").await).await;
    assert_eq!(json["data"]["toast"]["level"], "error");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_numeric_enabled_is_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let json = body_json(
        post_form(
            app,
            ACTIONS,
            "action=add&boss_extension=200&secretary_extension=201&enabled=off",
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["toast"]["title"], "Invalid Rule");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn grid_delete_link_removes_rule(pool: SqlitePool) {
    let id = create_rule(&pool, "200", "201", "").await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("{ACTIONS}?action=delete&id={id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["toast"]["message"], "Rule successfully deleted!");
    assert_eq!(json["data"]["redirect"], "config.php?display=bosssec");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn link_cannot_add_rules(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get(
            app,
            &format!("{ACTIONS}?action=add&boss_extension=200&secretary_extension=201"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["toast"]["level"], "error");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rules").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
