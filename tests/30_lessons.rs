mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::id;

#[tokio::test]
async fn lessons_require_an_owned_document() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let foreign = server.create("user_b", "/api/documents", json!({ "text": "not yours" })).await?;
    let writes = server.store.write_count();

    let (status, _) = server
        .post("user_a", "/api/lessons", json!({ "documentId": foreign["id"], "title": "Stolen" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .post("user_a", "/api/lessons", json!({ "documentId": uuid::Uuid::new_v4(), "title": "Orphan" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(server.store.write_count(), writes);
    Ok(())
}

#[tokio::test]
async fn lesson_list_is_transitive_and_empty_without_documents() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, rows) = server.get("user_a", "/api/lessons").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([]));

    let (_, lesson_a, _) = server.seed_flashcard("user_a").await?;
    server.seed_flashcard("user_b").await?;

    let (_, rows) = server.get("user_a", "/api/lessons").await?;
    let rows = rows.as_array().expect("array body");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], lesson_a["id"]);
    Ok(())
}

#[tokio::test]
async fn patch_distinguishes_null_from_omitted() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let doc = server.create("user_a", "/api/documents", json!({ "text": "source" })).await?;
    let lesson = server
        .create(
            "user_a",
            "/api/lessons",
            json!({ "documentId": doc["id"], "title": "Topic", "summary": "Short", "keyTerms": ["atom"] }),
        )
        .await?;
    let path = format!("/api/lessons/{}", id(&lesson));

    // Omitted summary is kept
    let (status, row) = server.patch("user_a", &path, json!({ "title": "Renamed" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["title"], "Renamed");
    assert_eq!(row["summary"], "Short");
    assert_eq!(row["key_terms"], json!(["atom"]));

    // Explicit null clears it
    let (status, row) = server.patch("user_a", &path, json!({ "summary": null })).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(row["summary"].is_null());
    assert_eq!(row["title"], "Renamed");

    // Required columns cannot be nulled
    let (status, body) = server.patch("user_a", &path, json!({ "title": null })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["title"], "cannot be null");
    Ok(())
}

#[tokio::test]
async fn moving_a_lesson_requires_owning_the_target() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (_, lesson, _) = server.seed_flashcard("user_a").await?;
    let own = server.create("user_a", "/api/documents", json!({ "text": "second" })).await?;
    let foreign = server.create("user_b", "/api/documents", json!({ "text": "theirs" })).await?;
    let path = format!("/api/lessons/{}", id(&lesson));

    let (status, _) = server.patch("user_a", &path, json!({ "documentId": foreign["id"] })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, row) = server.patch("user_a", &path, json!({ "documentId": own["id"] })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["document_id"], own["id"]);
    Ok(())
}

#[tokio::test]
async fn quizzes_follow_their_lesson() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (_, lesson, _) = server.seed_flashcard("user_a").await?;
    let questions = json!([{ "prompt": "2+2?", "choices": ["3", "4"], "answer": 1 }]);
    let quiz = server
        .create("user_a", "/api/quizzes", json!({ "lessonId": lesson["id"], "questions": questions }))
        .await?;
    assert_eq!(quiz["questions"], questions);

    let (_, rows) = server.get("user_a", "/api/quizzes").await?;
    assert_eq!(rows.as_array().map(Vec::len), Some(1));

    let (_, rows) = server.get("user_b", "/api/quizzes").await?;
    assert_eq!(rows, json!([]));

    let (status, _) = server.get("user_b", &format!("/api/quizzes/{}", id(&quiz))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_a_document_orphans_its_lessons() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (doc, lesson, _) = server.seed_flashcard("user_a").await?;

    let (status, _) = server.delete("user_a", &format!("/api/documents/{}", id(&doc))).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The chain is broken, so the lesson is no longer reachable
    let (status, _) = server.get("user_a", &format!("/api/lessons/{}", id(&lesson))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, rows) = server.get("user_a", "/api/lessons").await?;
    assert_eq!(rows, json!([]));
    Ok(())
}
