//! End-to-end route tests against the assembled router, with an in-memory
//! database and the mailer disabled (degraded mode).

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gfax_api::{AppState, AppStateInner, router};
use gfax_auth::{LoginTokenSigner, SESSION_COOKIE, issue_session};
use gfax_db::Database;
use gfax_db::models::UserRow;
use gfax_mail::Mailer;

const SECRET: &str = "test-secret";

fn test_app() -> (Router, AppState) {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        tokens: LoginTokenSigner::new(SECRET),
        mailer: Mailer::disabled(),
        secret: SECRET.to_string(),
        public_url: "http://localhost:3000".to_string(),
        token_max_age: Duration::from_secs(900),
    });
    (router(state.clone()), state)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, user: &UserRow) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, session_cookie(user))
        .body(Body::empty())
        .unwrap()
}

fn session_cookie(user: &UserRow) -> String {
    let token = issue_session(SECRET, user.id, &user.email, &user.fax_number).unwrap();
    format!("{SESSION_COOKIE}={token}")
}

async fn body_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_is_public() {
    let (app, _) = test_app();
    let resp = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp.into_body()).await, "OK");
}

#[tokio::test]
async fn dashboard_redirects_to_login_without_session() {
    let (app, _) = test_app();
    let resp = app.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn registration_assigns_a_fax_number() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(form_post("/register", "email=alice%40example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp.into_body()).await;
    assert!(html.contains("GFAX-1001"), "missing fax number in: {html}");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, state) = test_app();
    state.db.register_user("alice@example.com").unwrap();

    let resp = app
        .oneshot(form_post("/register", "email=alice%40example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn garbage_email_is_rejected() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(form_post("/register", "email=nonsense"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_token_establishes_a_session() {
    let (app, state) = test_app();
    state.db.register_user("alice@example.com").unwrap();

    let token = state.tokens.issue("alice@example.com");
    let resp = app
        .oneshot(get(&format!("/login/{token}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/dashboard");
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with(SESSION_COOKIE));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn tampered_login_token_is_unauthorized() {
    let (app, state) = test_app();
    state.db.register_user("alice@example.com").unwrap();

    let mut token = state.tokens.issue("alice@example.com");
    token.push('x');
    let resp = app
        .oneshot(get(&format!("/login/{token}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_email_gets_the_same_confirmation_page() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(form_post("/", "email=nobody%40example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn degraded_mode_shows_the_login_link_inline() {
    let (app, state) = test_app();
    state.db.register_user("alice@example.com").unwrap();

    // Mailer is disabled in the test state, so the link must appear on the
    // page and still authenticate.
    let resp = app
        .clone()
        .oneshot(form_post("/", "email=alice%40example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp.into_body()).await;
    let start = html.find("/login/").expect("no fallback link on page");
    let token: String = html[start + "/login/".len()..]
        .chars()
        .take_while(|c| *c != '"' && *c != '<')
        .collect();

    let resp = app
        .oneshot(get(&format!("/login/{token}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn compose_delivers_to_the_recipient_inbox() {
    let (app, state) = test_app();
    let alice = state.db.register_user("alice@example.com").unwrap();
    let bob = state.db.register_user("bob@example.com").unwrap();
    assert_eq!(alice.fax_number, "GFAX-1001");
    assert_eq!(bob.fax_number, "GFAX-1002");

    // Lowercase recipient exercises identifier normalization.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compose")
                .header(header::COOKIE, session_cookie(&alice))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("recipient=gfax-1002&content=Hello"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let inbox = state.db.messages_for_recipient(bob.id).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].sender_info, "GFAX-1001");
    assert_eq!(inbox[0].content, "Hello");
    assert!(!inbox[0].created_at.is_empty());

    let resp = app.oneshot(get_as("/dashboard", &bob)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp.into_body()).await;
    assert!(html.contains("GFAX-1001"));
    assert!(html.contains(&format!("/view/{}", inbox[0].id)));
}

#[tokio::test]
async fn compose_to_unknown_recipient_creates_nothing() {
    let (app, state) = test_app();
    let alice = state.db.register_user("alice@example.com").unwrap();

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compose")
                .header(header::COOKIE, session_cookie(&alice))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("recipient=GFAX-9999&content=Hello"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let count: i64 = state
        .db
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?))
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn view_streams_the_rendered_pdf() {
    let (app, state) = test_app();
    let alice = state.db.register_user("alice@example.com").unwrap();
    let bob = state.db.register_user("bob@example.com").unwrap();
    let msg = state
        .db
        .insert_message(&alice.fax_number, bob.id, "Hello")
        .unwrap();

    let resp = app
        .oneshot(get_as(&format!("/view/{}", msg.id), &bob))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn viewing_someone_elses_fax_is_forbidden() {
    let (app, state) = test_app();
    let alice = state.db.register_user("alice@example.com").unwrap();
    let bob = state.db.register_user("bob@example.com").unwrap();
    let msg = state
        .db
        .insert_message(&bob.fax_number, bob.id, "private")
        .unwrap();

    let resp = app
        .oneshot(get_as(&format!("/view/{}", msg.id), &alice))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn viewing_a_missing_fax_is_not_found() {
    let (app, state) = test_app();
    let alice = state.db.register_user("alice@example.com").unwrap();

    let resp = app.oneshot(get_as("/view/9999", &alice)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let (app, state) = test_app();
    let alice = state.db.register_user("alice@example.com").unwrap();

    let resp = app.oneshot(get_as("/logout", &alice)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0") || set_cookie.contains("Expires"));
}
