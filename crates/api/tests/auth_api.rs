//! HTTP-level tests for registration, login, logout, identity and CSRF.

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use common::{body_json, get, get_as, login, post_json, send, session_cookie, PASSWORD};
use serde_json::json;
use sqlx::PgPool;

fn registration(username: &str, role: &str, student_id: Option<&str>) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{username}@school.test"),
        "password": PASSWORD,
        "confirm_password": PASSWORD,
        "role": role,
        "full_name": "Test Person",
        "student_id": student_id,
    })
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_registration_links_existing_profile(pool: PgPool) {
    common::seed_student(&pool, "S100", "Bold Bat", "CARD123").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        registration("bold.bat", "student", Some("S100")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["student_id"], "S100");
    assert_eq!(json["data"]["requires_activation"], false);
    assert!(json["data"]["user"].get("password_hash").is_none());

    login(&app, "bold.bat").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_registration_without_profile_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        registration("ghost", "student", Some("S999")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Student ID not found. Please contact your teacher.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registration_reports_validation_errors(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut body = registration("x", "admin", None);
    body["confirm_password"] = json!("something-else");
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("Passwords do not match"));
    assert!(message.contains("Invalid role selected"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_is_a_conflict(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);

    let mut body = registration("ms.tsetseg", "teacher", None);
    body["email"] = json!("other@school.test");
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Username already exists");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registered_teacher_cannot_log_in_until_activated(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        registration("new.teacher", "teacher", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["requires_activation"], true);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "identifier": "new.teacher", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_by_username_or_email_sets_hardened_cookie(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);

    for identifier in ["ms.tsetseg", "ms.tsetseg@school.test"] {
        let response = post_json(
            app.clone(),
            "/api/v1/auth/login",
            json!({ "identifier": identifier, "password": PASSWORD }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));

        let json = body_json(response).await;
        assert_eq!(json["data"]["username"], "ms.tsetseg");
        assert_eq!(json["data"]["role"], "teacher");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_user_look_the_same(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);

    let wrong = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "identifier": "ms.tsetseg", "password": "not-the-password" }),
    )
    .await;
    let unknown = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "identifier": "nobody", "password": "not-the-password" }),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await, body_json(unknown).await);

    let blank = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "identifier": " ", "password": "" }),
    )
    .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blank).await["error"], "Please fill in all fields");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_requires_a_session(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let caller = login(&app, "ms.tsetseg").await;
    let response = get_as(app, "/api/v1/auth/me", &caller).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["username"], "ms.tsetseg");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tampered_cookie_is_rejected(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);
    let caller = login(&app, "ms.tsetseg").await;

    let (name_and_user, token) = caller.cookie.rsplit_once('.').unwrap();
    let flipped: String = token
        .chars()
        .rev()
        .collect();
    let tampered = common::Caller {
        cookie: format!("{name_and_user}.{flipped}"),
        csrf: caller.csrf.clone(),
    };

    let response = get_as(app, "/api/v1/auth/me", &tampered).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_login_invalidates_first_session(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);

    let first = login(&app, "ms.tsetseg").await;
    let second = login(&app, "ms.tsetseg").await;

    let response = get_as(app.clone(), "/api/v1/auth/me", &first).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = get_as(app, "/api/v1/auth/me", &second).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_ends_session_and_is_idempotent(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);
    let caller = login(&app, "ms.tsetseg").await;

    for _ in 0..2 {
        let response = send(
            app.clone(),
            Request::post("/api/v1/auth/logout")
                .header(COOKIE, &caller.cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = send(
        app.clone(),
        Request::post("/api/v1/auth/logout").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_as(app, "/api/v1/auth/me", &caller).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn csrf_token_is_stable_within_a_session(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);
    let caller = login(&app, "ms.tsetseg").await;

    assert_eq!(caller.csrf.len(), 64);
    let response = get_as(app, "/api/v1/auth/csrf", &caller).await;
    assert_eq!(body_json(response).await["data"]["csrf_token"], caller.csrf.as_str());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_accepts_username_field_alias(pool: PgPool) {
    common::seed_teacher(&pool, "ms.tsetseg").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "ms.tsetseg", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).starts_with("attendft_session="));
}
