//! Integration tests for accounts, registration and sessions.

use assert_matches::assert_matches;
use attendft_core::roles::Role;
use attendft_db::models::session::CreateSession;
use attendft_db::models::student::CreateStudent;
use attendft_db::models::user::{CreateUser, RegisterOutcome};
use attendft_db::repositories::{AttendanceRepo, SessionRepo, StudentRepo, UserRepo};
use chrono::{Duration, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_student(student_id: &str, card_id: &str) -> CreateStudent {
    CreateStudent {
        student_id: student_id.to_string(),
        full_name: format!("Student {student_id}"),
        card_id: card_id.to_string(),
    }
}

fn new_user(username: &str, role: Role, student_id: Option<&str>) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@school.edu"),
        password_hash: "$argon2id$placeholder".to_string(),
        role,
        full_name: username.to_string(),
        student_id: student_id.map(str::to_string),
        is_active: true,
    }
}

fn new_session(user_id: i64, token_hash: &str, lifetime: Duration) -> CreateSession {
    CreateSession {
        user_id,
        token_hash: token_hash.to_string(),
        expires_at: Utc::now() + lifetime,
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: None,
    }
}

async fn register(pool: &PgPool, input: &CreateUser) -> attendft_db::models::user::User {
    match UserRepo::register(pool, input).await.unwrap() {
        RegisterOutcome::Created(user) => user,
        RegisterOutcome::StudentNotFound => panic!("student profile should exist"),
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_registration_requires_existing_profile(pool: PgPool) {
    let outcome = UserRepo::register(&pool, &new_user("orphan", Role::Student, Some("S404")))
        .await
        .unwrap();
    assert_matches!(outcome, RegisterOutcome::StudentNotFound);
    assert!(UserRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_registration_links_profile(pool: PgPool) {
    StudentRepo::create(&pool, &new_student("S100", "CARD123")).await.unwrap();

    let user = register(&pool, &new_user("bat", Role::Student, Some("S100"))).await;
    assert_eq!(user.role().unwrap(), Role::Student);

    let student = StudentRepo::find_by_student_id(&pool, "S100").await.unwrap().unwrap();
    assert_eq!(student.user_id, Some(user.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_account_for_one_student_conflicts(pool: PgPool) {
    StudentRepo::create(&pool, &new_student("S100", "CARD123")).await.unwrap();
    register(&pool, &new_user("bat", Role::Student, Some("S100"))).await;

    let err = UserRepo::register(&pool, &new_user("bat2", Role::Student, Some("S100")))
        .await
        .unwrap_err();
    let constraint = err.as_database_error().and_then(|e| e.constraint());
    assert_eq!(constraint, Some("uq_users_student_id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_and_email_conflict(pool: PgPool) {
    register(&pool, &new_user("teach", Role::Teacher, None)).await;

    let err = UserRepo::register(&pool, &new_user("teach", Role::Teacher, None))
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_users_username")
    );

    let mut other = new_user("teach2", Role::Teacher, None);
    other.email = "teach@school.edu".to_string();
    let err = UserRepo::register(&pool, &other).await.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_users_email")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lookups_only_return_active_accounts(pool: PgPool) {
    let mut pending = new_user("pending", Role::Teacher, None);
    pending.is_active = false;
    let user = register(&pool, &pending).await;

    assert!(UserRepo::find_active_by_username(&pool, "pending").await.unwrap().is_none());
    assert!(UserRepo::find_active_by_email(&pool, "pending@school.edu").await.unwrap().is_none());

    UserRepo::set_active(&pool, user.id, true).await.unwrap().unwrap();
    assert!(UserRepo::find_active_by_username(&pool, "pending").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Student management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_with_account_is_all_or_nothing(pool: PgPool) {
    register(&pool, &new_user("taken", Role::Teacher, None)).await;

    let err = StudentRepo::create_with_account(
        &pool,
        &new_student("S100", "CARD123"),
        &new_user("taken", Role::Student, Some("S100")),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_users_username")
    );
    assert!(StudentRepo::find_by_student_id(&pool, "S100").await.unwrap().is_none());

    let (student, user) = StudentRepo::create_with_account(
        &pool,
        &new_student("S100", "CARD123"),
        &new_user("bat", Role::Student, Some("S100")),
    )
    .await
    .unwrap();
    assert_eq!(student.user_id, Some(user.id));
    assert_eq!(user.student_id.as_deref(), Some("S100"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_card_is_rejected(pool: PgPool) {
    StudentRepo::create(&pool, &new_student("S100", "CARD123")).await.unwrap();
    let err = StudentRepo::create(&pool, &new_student("S200", "CARD123"))
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_students_card_id")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_student_removes_history_and_account(pool: PgPool) {
    let (_, user) = StudentRepo::create_with_account(
        &pool,
        &new_student("S100", "CARD123"),
        &new_user("bat", Role::Student, Some("S100")),
    )
    .await
    .unwrap();
    AttendanceRepo::record_scan(&pool, "CARD123", Utc::now()).await.unwrap();

    assert!(StudentRepo::delete(&pool, "S100").await.unwrap());
    assert!(!StudentRepo::delete(&pool, "S100").await.unwrap());

    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
    assert_eq!(AttendanceRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_search_is_case_insensitive_and_sorted(pool: PgPool) {
    StudentRepo::create(
        &pool,
        &CreateStudent {
            student_id: "S2".into(),
            full_name: "Zaya".into(),
            card_id: "C-2".into(),
        },
    )
    .await
    .unwrap();
    StudentRepo::create(
        &pool,
        &CreateStudent {
            student_id: "S1".into(),
            full_name: "Anar".into(),
            card_id: "C-1".into(),
        },
    )
    .await
    .unwrap();

    let all = StudentRepo::list(&pool, None, 100).await.unwrap();
    let names: Vec<_> = all.iter().map(|s| s.full_name.as_str()).collect();
    assert_eq!(names, ["Anar", "Zaya"]);

    let found = StudentRepo::list(&pool, Some("%ZAY%"), 100).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].student_id, "S2");
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_resolves_only_with_matching_user_and_hash(pool: PgPool) {
    let user = register(&pool, &new_user("teach", Role::Teacher, None)).await;
    SessionRepo::create_replacing(&pool, &new_session(user.id, "hash-a", Duration::hours(24)))
        .await
        .unwrap();

    let identity = SessionRepo::find_identity(&pool, user.id, "hash-a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(identity.username, "teach");
    assert_eq!(identity.role, "teacher");

    assert!(SessionRepo::find_identity(&pool, user.id, "hash-b").await.unwrap().is_none());
    assert!(SessionRepo::find_identity(&pool, user.id + 1, "hash-a").await.unwrap().is_none());

    let stamped = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(stamped.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_login_replaces_previous_session(pool: PgPool) {
    let user = register(&pool, &new_user("teach", Role::Teacher, None)).await;
    SessionRepo::create_replacing(&pool, &new_session(user.id, "first", Duration::hours(24)))
        .await
        .unwrap();
    SessionRepo::create_replacing(&pool, &new_session(user.id, "second", Duration::hours(24)))
        .await
        .unwrap();

    assert_eq!(SessionRepo::count_live_for_user(&pool, user.id).await.unwrap(), 1);
    assert!(SessionRepo::find_identity(&pool, user.id, "first").await.unwrap().is_none());
    assert!(SessionRepo::find_identity(&pool, user.id, "second").await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_sessions_do_not_resolve_and_are_swept(pool: PgPool) {
    let user = register(&pool, &new_user("teach", Role::Teacher, None)).await;
    SessionRepo::create_replacing(&pool, &new_session(user.id, "stale", -Duration::minutes(1)))
        .await
        .unwrap();

    assert!(SessionRepo::find_identity(&pool, user.id, "stale").await.unwrap().is_none());
    assert_eq!(SessionRepo::delete_expired(&pool).await.unwrap(), 1);
    assert_eq!(SessionRepo::delete_expired(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_is_idempotent(pool: PgPool) {
    let user = register(&pool, &new_user("teach", Role::Teacher, None)).await;
    SessionRepo::create_replacing(&pool, &new_session(user.id, "tok", Duration::hours(1)))
        .await
        .unwrap();

    assert_eq!(SessionRepo::delete_by_token_hash(&pool, "tok").await.unwrap(), 1);
    assert_eq!(SessionRepo::delete_by_token_hash(&pool, "tok").await.unwrap(), 0);
    assert!(SessionRepo::find_identity(&pool, user.id, "tok").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_ends_sessions(pool: PgPool) {
    let user = register(&pool, &new_user("teach", Role::Teacher, None)).await;
    SessionRepo::create_replacing(&pool, &new_session(user.id, "tok", Duration::hours(1)))
        .await
        .unwrap();

    let updated = UserRepo::set_active(&pool, user.id, false).await.unwrap().unwrap();
    assert!(!updated.is_active);
    assert_eq!(SessionRepo::count_live_for_user(&pool, user.id).await.unwrap(), 0);
    assert!(UserRepo::set_active(&pool, 999_999, true).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn csrf_token_is_set_once(pool: PgPool) {
    let user = register(&pool, &new_user("teach", Role::Teacher, None)).await;
    let session =
        SessionRepo::create_replacing(&pool, &new_session(user.id, "tok", Duration::hours(1)))
            .await
            .unwrap();

    let first = SessionRepo::ensure_csrf_token(&pool, session.id, "aaa").await.unwrap();
    let second = SessionRepo::ensure_csrf_token(&pool, session.id, "bbb").await.unwrap();
    assert_eq!(first.as_deref(), Some("aaa"));
    assert_eq!(second.as_deref(), Some("aaa"));
    assert!(SessionRepo::ensure_csrf_token(&pool, session.id + 1, "ccc")
        .await
        .unwrap()
        .is_none());
}
