mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_is_public() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.send(Method::GET, None, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn root_banner_names_the_service() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.send(Method::GET, None, "/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "NeuroMate API");
    assert!(body["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn api_requires_bearer_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.send(Method::GET, None, "/api/documents", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized", "status": 401 }));
    Ok(())
}

#[tokio::test]
async fn rejects_foreign_and_malformed_tokens() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let forged = neuromate_api::auth::issue_token("some-other-secret", "user_a", chrono::Duration::hours(1))?;
    let expired = neuromate_api::auth::issue_token(common::SECRET, "user_a", chrono::Duration::hours(-2))?;

    for header in [
        format!("Bearer {}", forged),
        format!("Bearer {}", expired),
        "Bearer not-a-jwt".to_string(),
        "Basic dXNlcjpwYXNz".to_string(),
        "Bearer ".to_string(),
    ] {
        let res = client
            .get(server.url("/api/documents"))
            .header("Authorization", &header)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "header: {}", header);
    }
    Ok(())
}

#[tokio::test]
async fn auth_runs_before_validation() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    // Invalid body, no token: the gate answers first
    let (status, _) = server
        .send(Method::POST, None, "/api/quiz-attempts", Some(json!({ "score": 500 })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(server.store.operation_count(), 0);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.send(Method::GET, None, "/nope", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Resource not found", "status": 404 }));
    Ok(())
}

#[tokio::test]
async fn unknown_api_paths_require_auth_first() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for path in ["/api/nope", "/api/secret-thing/42"] {
        let (status, body) = server.send(Method::GET, None, path, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "path: {}", path);
        assert_eq!(body, json!({ "error": "Unauthorized", "status": 401 }));
    }

    // Authenticated callers see the ordinary not-found body
    let (status, body) = server.get("user_a", "/api/nope").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Resource not found", "status": 404 }));
    Ok(())
}

#[tokio::test]
async fn unsupported_methods_get_json_errors() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server
        .send(Method::PUT, Some("user_a"), "/api/documents", Some(json!({ "text": "x" })))
        .await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Method not allowed", "status": 405 }));

    let (status, body) = server.send(Method::POST, Some("user_a"), "/api/profiles", None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], 405);

    let (status, body) = server.send(Method::DELETE, None, "/health", None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], 405);

    // The gate still answers first for anonymous callers
    let (status, _) = server.send(Method::PUT, None, "/api/documents", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(server.store.operation_count(), 0);
    Ok(())
}
