//! Integration tests for API endpoints.
//!
//! The router runs against mocked services, rate limiter and health checks,
//! so no database or Redis connection is needed.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use certificado_guardian::api::{create_router, AppState};
use certificado_guardian::config::{Config, SESSION_COOKIE};
use certificado_guardian::domain::{today, DashboardStats, User, UserRole};
use certificado_guardian::errors::AppError;
use certificado_guardian::infra::{HealthReport, MockHealthCheck, MockRateLimiter};
use certificado_guardian::services::{
    AuthService, Claims, DashboardService, LoginResult, MockAuthService, MockDashboardService,
    MockRevealService, MockServiceContainer, RevealService,
};

const GOOD_TOKEN: &str = "valid-test-token";

// =============================================================================
// Test Helpers
// =============================================================================

fn allow_all() -> MockRateLimiter {
    let mut limiter = MockRateLimiter::new();
    limiter
        .expect_hit()
        .returning(|_, _, _| Ok((1, true)));
    limiter
}

fn app_with(
    services: MockServiceContainer,
    limiter: MockRateLimiter,
    health: MockHealthCheck,
) -> Router {
    app_with_config(services, limiter, health, Config::for_tests())
}

fn app_with_config(
    services: MockServiceContainer,
    limiter: MockRateLimiter,
    health: MockHealthCheck,
    config: Config,
) -> Router {
    create_router(AppState::new(
        Arc::new(services),
        Arc::new(limiter),
        Arc::new(health),
        config,
    ))
}

fn app(services: MockServiceContainer) -> Router {
    app_with(services, allow_all(), MockHealthCheck::new())
}

/// Auth mock that accepts [`GOOD_TOKEN`] as a session of `user`.
fn auth_for(user: User) -> MockAuthService {
    let mut auth = MockAuthService::new();
    auth.expect_authenticate().returning(move |token| {
        if token == GOOD_TOKEN {
            let claims = Claims {
                sub: user.id,
                sid: "session-1".to_string(),
                role: user.role.to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            };
            Ok((user.clone(), claims))
        } else {
            Err(AppError::Unauthorized)
        }
    });
    auth
}

fn container_with_auth(auth: MockAuthService) -> MockServiceContainer {
    let auth: Arc<dyn AuthService> = Arc::new(auth);
    let mut services = MockServiceContainer::new();
    services.expect_auth().returning(move || auth.clone());
    services
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", GOOD_TOKEN));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_healthy() {
    let mut health = MockHealthCheck::new();
    health.expect_check().returning(HealthReport::default);

    let response = app_with(MockServiceContainer::new(), MockRateLimiter::new(), health)
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_health_degraded_when_redis_down() {
    let mut health = MockHealthCheck::new();
    health.expect_check().returning(|| HealthReport {
        database: None,
        redis: Some("connection refused".to_string()),
    });

    let response = app_with(MockServiceContainer::new(), MockRateLimiter::new(), health)
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["redis"]["status"], "unhealthy");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_without_session() {
    let response = app(MockServiceContainer::new())
        .oneshot(get("/api/dashboard/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_with_unknown_token() {
    let services = container_with_auth(auth_for(common::user(UserRole::Admin)));

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Bearer forged")
        .body(Body::empty())
        .unwrap();
    let response = app(services).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let me = common::user(UserRole::Manager);
    let username = me.username.clone();
    let services = container_with_auth(auth_for(me));

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, GOOD_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app(services).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["role"], "manager");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let mut auth = MockAuthService::new();
    auth.expect_login()
        .withf(|username, password, _| username == "admin" && password == "SenhaForte123")
        .returning(|_, _, _| {
            Ok(LoginResult {
                token: "signed-token".to_string(),
                expires_in: 28800,
                user: common::user(UserRole::Admin),
            })
        });
    let services = container_with_auth(auth);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "admin", "password": "SenhaForte123" }).to_string(),
        ))
        .unwrap();
    let response = app(services).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{}=signed-token", SESSION_COOKIE)));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(response).await;
    assert_eq!(body["token"], "signed-token");
    assert_eq!(body["expires_in"], 28800);
}

#[tokio::test]
async fn test_login_validation_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "username": "", "password": "x" }).to_string()))
        .unwrap();
    let response = app(MockServiceContainer::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let me = common::user(UserRole::User);
    let mut auth = auth_for(me);
    auth.expect_logout()
        .withf(|_, session_id| session_id == "session-1")
        .times(1)
        .returning(|_, _| Ok(()));
    let services = container_with_auth(auth);

    let response = app(services)
        .oneshot(authed("POST", "/api/auth/logout", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limited_login() {
    let mut limiter = MockRateLimiter::new();
    limiter
        .expect_hit()
        .returning(|key, max, _| Ok((max + 1, !key.starts_with("auth:"))));

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "admin", "password": "x" }).to_string(),
        ))
        .unwrap();
    let response = app_with(MockServiceContainer::new(), limiter, MockHealthCheck::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

/// Login from socket 203.0.113.7 carrying a forged `X-Forwarded-For`.
fn login_from_socket_with_forwarded_header() -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Forwarded-For", "198.51.100.99")
        .header("X-Real-IP", "198.51.100.98")
        .body(Body::from(
            json!({ "username": "admin", "password": "x" }).to_string(),
        ))
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 7], 41000))));
    request
}

#[tokio::test]
async fn test_forwarded_header_does_not_pick_bucket() {
    let mut limiter = MockRateLimiter::new();
    limiter
        .expect_hit()
        .withf(|key, _, _| key == "auth:203.0.113.7")
        .times(1)
        .returning(|_, max, _| Ok((max + 1, false)));

    let response = app_with(MockServiceContainer::new(), limiter, MockHealthCheck::new())
        .oneshot(login_from_socket_with_forwarded_header())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_proxy_uses_forwarded_for() {
    let mut limiter = MockRateLimiter::new();
    limiter
        .expect_hit()
        .withf(|key, _, _| key == "auth:198.51.100.99")
        .times(1)
        .returning(|_, max, _| Ok((max + 1, false)));

    let mut config = Config::for_tests();
    config.trust_proxy = true;

    let response = app_with_config(
        MockServiceContainer::new(),
        limiter,
        MockHealthCheck::new(),
        config,
    )
    .oneshot(login_from_socket_with_forwarded_header())
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limiter_failure_denies() {
    let mut limiter = MockRateLimiter::new();
    limiter
        .expect_hit()
        .returning(|_, _, _| Err(AppError::internal("redis down")));

    let response = app_with(MockServiceContainer::new(), limiter, MockHealthCheck::new())
        .oneshot(get("/api/dashboard/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_user_listing_is_admin_only() {
    let services = container_with_auth(auth_for(common::user(UserRole::Manager)));

    let response = app(services)
        .oneshot(authed("GET", "/api/users", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_activity_log_is_admin_only() {
    let services = container_with_auth(auth_for(common::user(UserRole::User)));

    let response = app(services)
        .oneshot(authed("GET", "/api/logs", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Dashboard and reveal
// =============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
    let mut dashboard = MockDashboardService::new();
    dashboard
        .expect_stats()
        .returning(|_| Ok(DashboardStats::compute(2, vec![], today())));
    let dashboard: Arc<dyn DashboardService> = Arc::new(dashboard);

    let mut services = container_with_auth(auth_for(common::user(UserRole::User)));
    services
        .expect_dashboard()
        .returning(move || dashboard.clone());

    let response = app(services)
        .oneshot(authed("GET", "/api/dashboard/stats", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-ratelimit-limit"));
    let body = json_body(response).await;
    assert_eq!(body["total_companies"], 2);
    assert_eq!(body["total_certificates"], 0);
}

#[tokio::test]
async fn test_reveal_rejects_malformed_code() {
    let mut reveal = MockRevealService::new();
    reveal.expect_reveal().never();
    let reveal: Arc<dyn RevealService> = Arc::new(reveal);

    let mut services = container_with_auth(auth_for(common::user(UserRole::User)));
    services.expect_reveal().returning(move || reveal.clone());

    let uri = format!("/api/certificates/{}/password/reveal", Uuid::new_v4());
    let response = app(services)
        .oneshot(authed("POST", &uri, Some(json!({ "code": "12" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reveal_returns_password() {
    let mut reveal = MockRevealService::new();
    reveal
        .expect_reveal()
        .withf(|_, _, code| code == "042917")
        .returning(|_, _, _| Ok("senha-do-pfx".to_string()));
    let reveal: Arc<dyn RevealService> = Arc::new(reveal);

    let mut services = container_with_auth(auth_for(common::user(UserRole::User)));
    services.expect_reveal().returning(move || reveal.clone());

    let uri = format!("/api/certificates/{}/password/reveal", Uuid::new_v4());
    let response = app(services)
        .oneshot(authed("POST", &uri, Some(json!({ "code": "042917" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["password"], "senha-do-pfx");
}
