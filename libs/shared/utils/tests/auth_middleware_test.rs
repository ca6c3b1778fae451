use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Extension, Router,
};
use tower::ServiceExt;

use shared_models::auth::{User, UserRole};
use shared_utils::extractor::auth_middleware;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

async fn whoami(Extension(user): Extension<User>) -> String {
    format!("{}:{}", user.username, user.role)
}

fn create_test_app() -> Router {
    let config = TestConfig::default().to_arc();
    Router::new()
        .route("/me", get(whoami))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}

fn request_with(auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri("/me");
    if let Some(value) = auth {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_valid_token_reaches_handler_with_user() {
    let config = TestConfig::default();
    let user = TestUser::new("jperez", UserRole::Doctor);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    let response = create_test_app()
        .oneshot(request_with(Some(format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"jperez:DOCTOR");
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let response = create_test_app().oneshot(request_with(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Missing authorization header");
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_and_forged_tokens_are_unauthorized() {
    let config = TestConfig::default();
    let user = TestUser::default();

    for token in [
        JwtTestUtils::create_expired_token(&user, &config.jwt_secret),
        JwtTestUtils::create_invalid_signature_token(&user),
        JwtTestUtils::create_malformed_token(),
    ] {
        let response = create_test_app()
            .oneshot(request_with(Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
