use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{CredentialHasher, Engine, SessionIssuer};
use migration::MigratorTrait;

const PASSWORD: &str = "StrongPass@123";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .sessions(SessionIssuer::new(
            b"server-test-secret",
            Duration::minutes(5),
            Duration::days(1),
        ))
        .hasher(CredentialHasher::new(8, 1, 1).unwrap())
        .build()
        .await
        .unwrap();
    server::router(Arc::new(engine))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Sign up and log in `name`; returns (user id, access, refresh).
async fn register(app: &Router, name: &str) -> (String, String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": format!("{name}@example.com"),
            "username": name,
            "first_name": "Test",
            "last_name": "User",
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"email": format!("{name}@example.com"), "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (
        body["id"].as_str().unwrap().to_string(),
        body["access"].as_str().unwrap().to_string(),
        body["refresh"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn signup_returns_id_email_and_message() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": "john@example.com",
            "username": "john",
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["message"], "User created successfully");
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn signup_errors_are_field_keyed() {
    let app = app().await;
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "weakpass",
            "confirm_password": "other",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!(["A user with this email already exists."]));
    assert_eq!(
        body["username"],
        json!(["A user with this username already exists."])
    );
    assert_eq!(body["confirm_password"], json!(["Passwords do not match"]));
    assert_eq!(body["password"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn login_failures_are_400_detail() {
    let app = app().await;
    register(&app, "alice").await;

    for payload in [
        json!({"email": "alice@example.com", "password": "WrongPass@123"}),
        json!({"email": "ghost@example.com", "password": PASSWORD}),
    ] {
        let (status, body) = send(&app, "POST", "/login", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Invalid email or password"}));
    }
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/income", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"detail": "Authentication credentials were not provided."})
    );

    let (status, _) = send(&app, "GET", "/expenditure", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_cannot_authenticate_requests() {
    let app = app().await;
    let (_, _, refresh) = register(&app, "alice").await;

    let (status, _) = send(&app, "GET", "/income", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_then_reuse_fails() {
    let app = app().await;
    let (_, access, refresh) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/token/refresh",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/logout",
        Some(&access),
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User logged out successfully");

    let (status, body) = send(
        &app,
        "POST",
        "/logout",
        Some(&access),
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Invalid refresh token"}));

    let (status, _) = send(
        &app,
        "POST",
        "/token/refresh",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/logout", Some(&access), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Invalid refresh token"}));
}

#[tokio::test]
async fn logout_without_a_body_is_a_missing_refresh_token() {
    let app = app().await;
    let (_, access, _) = register(&app, "alice").await;

    let (status, body) = send(&app, "POST", "/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Invalid refresh token"}));
}

#[tokio::test]
async fn profile_read_and_update() {
    let app = app().await;
    let (alice_id, alice, _) = register(&app, "alice").await;
    let (_, bob, _) = register(&app, "bob").await;
    let uri = format!("/user/{alice_id}/profile");

    let (status, body) = send(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["first_name"], "Test");
    assert!(body.get("password").is_none());

    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&bob),
        Some(json!({"first_name": "Mallory"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&alice),
        Some(json!({"first_name": "Alicia"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alicia");
    assert_eq!(body["last_name"], "User");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&alice),
        Some(json!({"first_name": "Alicia"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!(["This field is required."]));

    let (status, body) = send(&app, "GET", "/user/not-a-uuid/profile", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Invalid user ID"}));

    let missing = format!("/user/{}/profile", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "GET", &missing, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "User not found"}));
}

#[tokio::test]
async fn income_crud_is_scoped_to_its_owner() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;
    let (_, bob, _) = register(&app, "bob").await;

    let (status, created) = send(
        &app,
        "POST",
        "/income",
        Some(&alice),
        Some(json!({"name_of_revenue": "Salary", "amount": "2500.00", "user": "someone"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name_of_revenue"], "Salary");
    assert_eq!(created["amount"], "2500.00");
    assert!(created.get("user").is_none());
    let uri = format!("/income/{}", created["id"].as_str().unwrap());

    let (status, fetched) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    for method in ["GET", "DELETE"] {
        let (status, _) = send(&app, method, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
    }
    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&bob),
        Some(json!({"amount": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "GET", "/income", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, patched) = send(
        &app,
        "PATCH",
        &uri,
        Some(&alice),
        Some(json!({"amount": 3000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["amount"], "3000.00");
    assert_eq!(patched["name_of_revenue"], "Salary");

    let (status, body) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    let (status, _) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn income_amount_must_be_at_least_one() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/income",
        Some(&alice),
        Some(json!({"name_of_revenue": "Tip", "amount": "0"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"amount": ["Ensure this value is greater than or equal to 1."]})
    );
}

#[tokio::test]
async fn expenditure_endpoints() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/expenditure",
        Some(&alice),
        Some(json!({"category": "LUXURY", "name_of_item": "Yacht", "amount": "100"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"category": ["\"LUXURY\" is not a valid choice."]}));

    let (status, created) = send(
        &app,
        "POST",
        "/expenditure",
        Some(&alice),
        Some(json!({"name_of_item": "Groceries", "estimated_amount": "45.2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "OTHER");
    assert_eq!(created["amount"], "45.20");

    let (status, body) = send(&app, "GET", "/expenditure", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([created]));

    let (status, body) = send(&app, "GET", "/expenditure/categories", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);
    assert_eq!(body[0], json!({"value": "FOOD", "label": "Food & Groceries"}));
}

#[tokio::test]
async fn malformed_json_is_a_400_detail() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn expenditures_of_other_users_are_not_found() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;
    let (_, bob, _) = register(&app, "bob").await;

    let (status, created) = send(
        &app,
        "POST",
        "/expenditure",
        Some(&alice),
        Some(json!({"category": "RENT", "name_of_item": "Flat", "amount": "900"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/expenditure/{}", created["id"].as_str().unwrap());

    let replacement = json!({"category": "OTHER", "name_of_item": "Mine", "amount": "1"});
    for (method, body) in [
        ("GET", None),
        ("PUT", Some(replacement.clone())),
        ("PATCH", Some(json!({"amount": "1"}))),
        ("DELETE", None),
    ] {
        let (status, res) = send(&app, method, &uri, Some(&bob), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(res, json!({"detail": "Not found."}), "{method}");
    }

    let (status, fetched) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn expenditure_amounts_and_categories_are_strict() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;

    for amount in [json!("0"), json!("-5"), json!(0)] {
        let (status, body) = send(
            &app,
            "POST",
            "/expenditure",
            Some(&alice),
            Some(json!({"name_of_item": "Gum", "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"amount": ["Ensure this value is greater than or equal to 1."]})
        );
    }

    let (status, body) = send(
        &app,
        "POST",
        "/expenditure",
        Some(&alice),
        Some(json!({"category": " FOOD ", "name_of_item": "Bread", "amount": "3"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"category": ["\" FOOD \" is not a valid choice."]}));
}

#[tokio::test]
async fn comma_separated_amounts_are_rejected() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;

    for amount in ["12,50", "2,500"] {
        let (status, body) = send(
            &app,
            "POST",
            "/income",
            Some(&alice),
            Some(json!({"name_of_revenue": "Tip", "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{amount}");
        assert_eq!(body, json!({"amount": ["A valid number is required."]}));
    }
}

#[tokio::test]
async fn field_types_are_checked_per_field() {
    let app = app().await;
    let (_, alice, _) = register(&app, "alice").await;

    let (status, created) = send(
        &app,
        "POST",
        "/income",
        Some(&alice),
        Some(json!({"name_of_revenue": 5, "amount": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name_of_revenue"], "5");
    assert_eq!(created["amount"], "12.00");

    let (status, body) = send(
        &app,
        "POST",
        "/income",
        Some(&alice),
        Some(json!({"name_of_revenue": ["Salary"], "amount": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "amount": ["A valid number is required."],
            "name_of_revenue": ["Not a valid string."],
        })
    );
}

#[tokio::test]
async fn localhost_addresses_can_sign_up() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": "ops@localhost",
            "username": "ops",
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": "ops@1.2",
            "username": "ops2",
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!(["Enter a valid email address."]));
}
