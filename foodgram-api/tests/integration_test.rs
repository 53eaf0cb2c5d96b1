/// Integration tests for the Foodgram API
///
/// These tests drive the assembled router through tower's `Service`
/// trait, covering the behavior that does not need a live database:
/// - guard layers rejecting anonymous and malformed credentials
/// - the short-link contract (no auth, no existence check)
/// - health degradation when the database is unreachable

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use foodgram_shared::auth::jwt::{create_token, Claims, TokenType};
use tower::Service as _;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_degrades_without_database() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_me_requires_auth() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_credentials_are_bad_request() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/users/me")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/users/me")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_rejected_as_access_token() {
    let mut app = common::test_app();

    let claims = Claims::new(Uuid::new_v4(), TokenType::Refresh);
    let token = create_token(&claims, common::TEST_JWT_SECRET).unwrap();

    let response = app
        .call(
            Request::builder()
                .uri("/api/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_favorite_requires_auth() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/recipes/1/favorite")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_download_requires_auth() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_link_needs_no_auth_and_no_recipe() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/recipes/7/get-link")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["short-link"], "http://testserver/s/7");
}

#[tokio::test]
async fn test_short_link_redirects_to_recipe_page() {
    let mut app = common::test_app();

    let response = app
        .call(Request::builder().uri("/s/9").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://testserver/recipes/9"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let mut app = common::test_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
