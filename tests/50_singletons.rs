mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn profile_is_created_on_first_read() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, profile) = server.get("user_a", "/api/profiles").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], "user_a");
    assert!(profile["full_name"].is_null());

    let writes = server.store.write_count();
    let (_, again) = server.get("user_a", "/api/profiles").await?;
    assert_eq!(again, profile);
    assert_eq!(server.store.write_count(), writes);
    Ok(())
}

#[tokio::test]
async fn profile_update_trims_and_clears() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, profile) = server
        .patch(
            "user_a",
            "/api/profiles",
            json!({ "fullName": "  Ada Lovelace ", "grade": "10", "subjects": [" math ", "physics"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["full_name"], "Ada Lovelace");
    assert_eq!(profile["subjects"], json!(["math", "physics"]));

    let (_, profile) = server.patch("user_a", "/api/profiles", json!({ "grade": null })).await?;
    assert!(profile["grade"].is_null());
    assert_eq!(profile["full_name"], "Ada Lovelace");

    let (status, body) = server.patch("user_a", "/api/profiles", json!({ "fullName": "   " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["fullName"].is_string());
    Ok(())
}

#[tokio::test]
async fn profile_delete_is_idempotent() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    server.patch("user_a", "/api/profiles", json!({ "fullName": "Ada" })).await?;

    for _ in 0..2 {
        let (status, _) = server.delete("user_a", "/api/profiles").await?;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, fresh) = server.get("user_a", "/api/profiles").await?;
    assert!(fresh["full_name"].is_null());
    Ok(())
}

#[tokio::test]
async fn progress_starts_zeroed() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, progress) = server.get("user_a", "/api/progress").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["user_id"], "user_a");
    for counter in ["lessons_completed", "quizzes_taken", "flashcards_created", "streak_days"] {
        assert_eq!(progress[counter], 0, "{}", counter);
    }
    assert!(progress["avg_score"].is_null());
    Ok(())
}

#[tokio::test]
async fn progress_counters_are_validated() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, _) = server.patch("user_a", "/api/progress", json!({ "streakDays": -2 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.patch("user_a", "/api/progress", json!({ "avgScore": 100.5 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.store.write_count(), 0);

    let (status, progress) = server
        .patch("user_a", "/api/progress", json!({ "lessonsCompleted": 4, "avgScore": 87.5 }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["lessons_completed"], 4);
    assert_eq!(progress["avg_score"], 87.5);
    assert_eq!(progress["quizzes_taken"], 0);

    let (_, other) = server.get("user_b", "/api/progress").await?;
    assert_eq!(other["lessons_completed"], 0);
    Ok(())
}
