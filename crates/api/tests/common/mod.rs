#![allow(dead_code)]

use std::sync::Arc;

use attendft_api::auth::password::hash_password;
use attendft_api::config::{ServerConfig, SessionConfig};
use attendft_api::router::build_app_router;
use attendft_api::state::AppState;
use attendft_core::roles::Role;
use attendft_db::models::student::{CreateStudent, Student};
use attendft_db::models::user::{CreateUser, User};
use attendft_db::repositories::{StudentRepo, UserRepo};
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_name: "AttendFT".to_string(),
        app_env: "test".to_string(),
        app_debug: false,
        min_password_length: 8,
        session: SessionConfig {
            secret_key: "test-secret-key".to_string(),
            lifetime_hours: 24,
            cookie_secure: false,
            sweep_interval_secs: 900,
        },
    }
}

/// Build the full application router, middleware included, on `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// An authenticated caller: the cookie header value and the CSRF token.
#[derive(Debug, Clone)]
pub struct Caller {
    pub cookie: String,
    pub csrf: String,
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_as(app: Router, uri: &str, caller: &Caller) -> Response {
    let request = Request::get(uri)
        .header(COOKIE, &caller.cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// A JSON request carrying the caller's cookie and, if `with_csrf`, the
/// CSRF header.
pub async fn mutate_as(
    app: Router,
    method: Method,
    uri: &str,
    caller: &Caller,
    body: Option<serde_json::Value>,
    with_csrf: bool,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(COOKIE, &caller.cookie)
        .header(CONTENT_TYPE, "application/json");
    if with_csrf {
        builder = builder.header("x-csrf-token", &caller.csrf);
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    send(app, builder.body(body).unwrap()).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_student(pool: &PgPool, student_id: &str, full_name: &str, card_id: &str) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            student_id: student_id.to_string(),
            full_name: full_name.to_string(),
            card_id: card_id.to_string(),
        },
    )
    .await
    .unwrap()
}

async fn seed_user(pool: &PgPool, username: &str, role: Role, student_id: Option<&str>) -> User {
    let mut conn = pool.acquire().await.unwrap();
    UserRepo::insert(
        &mut *conn,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password_hash: hash_password(PASSWORD).unwrap(),
            role,
            full_name: username.to_string(),
            student_id: student_id.map(str::to_string),
            is_active: true,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_teacher(pool: &PgPool, username: &str) -> User {
    seed_user(pool, username, Role::Teacher, None).await
}

/// A student profile plus its linked, active account.
pub async fn seed_student_account(
    pool: &PgPool,
    username: &str,
    student_id: &str,
    card_id: &str,
) -> User {
    seed_student(pool, student_id, username, card_id).await;
    seed_user(pool, username, Role::Student, Some(student_id)).await
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Extract `name=value` of the session cookie from a login response.
pub fn session_cookie(response: &Response) -> String {
    let header = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("attendft_session="))
        .expect("login must set the session cookie");
    header.split(';').next().unwrap().to_string()
}

/// Log in through the API and fetch the session's CSRF token.
pub async fn login(app: &Router, identifier: &str) -> Caller {
    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": identifier, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let response = send(
        app.clone(),
        Request::get("/api/v1/auth/csrf")
            .header(COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let csrf = json["data"]["csrf_token"].as_str().unwrap().to_string();

    Caller { cookie, csrf }
}
