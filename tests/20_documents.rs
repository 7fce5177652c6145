mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::id;

#[tokio::test]
async fn document_crud_round() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let doc = server
        .create("user_a", "/api/documents", json!({ "text": "Cells divide.", "sourceUrl": "https://example.org/cells" }))
        .await?;
    assert_eq!(doc["user_id"], "user_a");
    assert_eq!(doc["text"], "Cells divide.");
    assert_eq!(doc["source_url"], "https://example.org/cells");

    let path = format!("/api/documents/{}", id(&doc));

    let (status, fetched) = server.get("user_a", &path).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], doc["id"]);

    let (status, updated) = server.patch("user_a", &path, json!({ "text": "Cells divide by mitosis." })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["text"], "Cells divide by mitosis.");
    assert_eq!(updated["source_url"], "https://example.org/cells");

    let (status, body) = server.delete("user_a", &path).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = server.get("user_a", &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_is_scoped_and_newest_first() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let first = server.create("user_a", "/api/documents", json!({ "text": "one" })).await?;
    let second = server.create("user_a", "/api/documents", json!({ "text": "two" })).await?;
    server.create("user_b", "/api/documents", json!({ "text": "someone else" })).await?;

    let (status, rows) = server.get("user_a", "/api/documents").await?;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().expect("array body");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], second["id"]);
    assert_eq!(rows[1]["id"], first["id"]);

    let (_, empty) = server.get("user_c", "/api/documents").await?;
    assert_eq!(empty, json!([]));
    Ok(())
}

#[tokio::test]
async fn owner_comes_from_token_not_body() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let doc = server
        .create("user_a", "/api/documents", json!({ "text": "mine", "userId": "user_b", "user_id": "user_b" }))
        .await?;
    assert_eq!(doc["user_id"], "user_a");
    Ok(())
}

#[tokio::test]
async fn other_users_documents_are_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let doc = server.create("user_a", "/api/documents", json!({ "text": "private" })).await?;
    let path = format!("/api/documents/{}", id(&doc));

    let (status, body) = server.get("user_b", &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (status, _) = server.patch("user_b", &path, json!({ "text": "hijacked" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.delete("user_b", &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, still_there) = server.get("user_a", &path).await?;
    assert_eq!(still_there["text"], "private");
    Ok(())
}

#[tokio::test]
async fn validation_failures_name_fields() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.post("user_a", "/api/documents", json!({ "sourceUrl": "not a url" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["fields"]["text"], "is required");
    assert_eq!(body["fields"]["sourceUrl"], "must be a valid URL");

    let (status, _) = server.post("user_a", "/api/documents", json!({ "text": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.store.write_count(), 0);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/documents"))
        .bearer_auth(server.token("user_a"))
        .header("Content-Type", "application/json")
        .body("{\"text\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["status"], 400);
    Ok(())
}

#[tokio::test]
async fn invalid_ids_are_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for path in ["/api/documents/not-a-uuid", "/api/lessons/123", "/api/reviews/%20"] {
        let (status, _) = server.get("user_a", path).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "path: {}", path);
    }

    let missing = format!("/api/documents/{}", uuid::Uuid::new_v4());
    let (status, _) = server.delete("user_a", &missing).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_patch_returns_row_without_writing() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let doc = server.create("user_a", "/api/documents", json!({ "text": "unchanged" })).await?;
    let writes = server.store.write_count();

    let (status, row) = server
        .patch("user_a", &format!("/api/documents/{}", id(&doc)), json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row, doc);
    assert_eq!(server.store.write_count(), writes);
    Ok(())
}
