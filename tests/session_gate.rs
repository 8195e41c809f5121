//! Router-level tests for the edge session gate.
//!
//! The gate only looks at cookie presence, so these tests run against a
//! small router with stub handlers and no database.

use axum::{
    body::Body,
    http::{header::COOKIE, Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use qportal::api::gate::session_gate;
use tower::ServiceExt;

fn app() -> Router {
    Router::new()
        .route("/", get(|| async { "root" }))
        .route("/login", get(|| async { "login page" }))
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/reports", get(|| async { "reports" }))
        .route("/health", get(|| async { "ok" }))
        .route("/api/profile/me", get(|| async { "profile" }))
        .route("/api/auth/session", get(|| async { "session" }))
        .layer(middleware::from_fn(session_gate))
}

fn request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get("location")
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

#[tokio::test]
async fn page_without_session_redirects_to_login_with_callback() {
    let response = app().oneshot(request("/dashboard", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?callbackUrl=%2Fdashboard");
}

#[tokio::test]
async fn query_string_survives_the_login_redirect() {
    let response = app()
        .oneshot(request("/reports?year=2025", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/login?callbackUrl=%2Freports%3Fyear%3D2025"
    );
}

#[tokio::test]
async fn api_without_session_gets_json_401() {
    let response = app()
        .oneshot(request("/api/profile/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .expect("content type")
            .to_str()
            .unwrap(),
        "application/json"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn login_with_session_redirects_to_completion_check() {
    let response = app()
        .oneshot(request("/login", Some("qportal_session=tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/complete-profile");
}

#[tokio::test]
async fn secure_prefixed_cookie_also_counts_as_a_session() {
    let response = app()
        .oneshot(request("/login", Some("__Secure-qportal_session=tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/complete-profile");
}

#[tokio::test]
async fn page_with_session_passes_through() {
    let response = app()
        .oneshot(request("/dashboard", Some("qportal_session=tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_with_session_passes_through() {
    let response = app()
        .oneshot(request("/api/profile/me", Some("qportal_session=tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_page_is_public() {
    let response = app().oneshot(request("/login", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_bypasses_the_gate() {
    let response = app().oneshot(request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_lookalike_path_is_not_public() {
    let response = app().oneshot(request("/loginphish", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?callbackUrl=%2Floginphish");
}

#[tokio::test]
async fn auth_api_lookalike_path_requires_a_session() {
    let response = app().oneshot(request("/api/authz", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unrelated_cookies_do_not_count_as_a_session() {
    let response = app()
        .oneshot(request("/dashboard", Some("theme=dark; lang=en")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?callbackUrl=%2Fdashboard");
}
