mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use neuromate_api::client::{ApiClient, ClientError, Resource};
use neuromate_api::database::models::{Document, Profile};

#[tokio::test]
async fn client_requires_a_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = ApiClient::new(&server.base_url);

    let health = client.health().await?;
    assert_eq!(health["status"], "ok");

    let err = client.get::<Vec<Document>>("/api/documents").await.unwrap_err();
    assert!(matches!(err, ClientError::MissingToken));
    Ok(())
}

#[tokio::test]
async fn resource_loads_and_reloads_after_mutations() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = ApiClient::new(&server.base_url).with_token(server.token("user_a"));
    let documents: Resource<Vec<Document>> = Resource::new(client, "/api/documents", Vec::new());

    documents.mount().await;
    let state = documents.snapshot().await;
    assert!(state.data.is_empty());
    assert!(!state.loading);
    assert!(state.error.is_none());

    let created: Document = documents.create(&json!({ "text": "Mitochondria" })).await?;
    assert_eq!(created.user_id, "user_a");
    assert_eq!(documents.data().await.len(), 1);

    let updated: Document = documents
        .update(&created.id.to_string(), &json!({ "text": "Powerhouse" }))
        .await?;
    assert_eq!(updated.text, "Powerhouse");
    assert_eq!(documents.data().await[0].text, "Powerhouse");

    documents.delete(&created.id.to_string()).await?;
    assert!(documents.data().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_mutation_keeps_data_and_reports_server_text() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = ApiClient::new(&server.base_url).with_token(server.token("user_a"));
    let documents: Resource<Vec<Document>> = Resource::new(client, "/api/documents", Vec::new());

    let _: Document = documents.create(&json!({ "text": "kept" })).await?;
    let writes = server.store.write_count();

    let err = documents
        .create::<Document, _>(&json!({ "text": "" }))
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(message.contains("text"), "message: {}", message);
        }
        other => panic!("expected status error, got {:?}", other),
    }

    assert_eq!(server.store.write_count(), writes);
    assert_eq!(documents.data().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn reload_failure_lands_in_error() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = ApiClient::new(&server.base_url).with_token("not-a-jwt");
    let documents: Resource<Vec<Document>> = Resource::new(client, "/api/documents", Vec::new());

    documents.focus().await;
    let state = documents.snapshot().await;
    assert!(!state.loading);
    assert!(state.data.is_empty());
    assert!(state.error.unwrap_or_default().contains("Unauthorized"));
    Ok(())
}

#[tokio::test]
async fn singleton_resource_updates_own_row() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = ApiClient::new(&server.base_url).with_token(server.token("user_a"));

    let blank = Profile {
        id: String::new(),
        full_name: None,
        grade: None,
        subjects: None,
        created_at: chrono::Utc::now(),
    };
    let profile = Resource::new(client, "/api/profiles", blank);

    profile.mount().await;
    assert_eq!(profile.data().await.id, "user_a");

    let _: Profile = profile.update_own(&json!({ "fullName": "Grace" })).await?;
    assert_eq!(profile.data().await.full_name.as_deref(), Some("Grace"));

    profile.delete_own().await?;
    assert!(profile.data().await.full_name.is_none());
    Ok(())
}
