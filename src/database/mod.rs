//! Resource store access.
//!
//! Handlers talk to the store only through the [`Store`] trait, which hands
//! out one [`Table`] per owned resource and one [`Singleton`] per per-user
//! record. The handle is built once at startup and injected through the
//! application state; [`postgres::PgStore`] backs production and
//! [`memory::MemoryStore`] backs tests.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::ownership::{OwnershipLink, ResourceKind};
use models::{Document, Flashcard, Lesson, Profile, Progress, Quiz, QuizAttempt, Review};

/// Errors from the resource store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlx(sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Sqlx(other),
        }
    }
}

/// Partial update for a record; empty changesets never reach the store
pub trait Changeset {
    fn is_empty(&self) -> bool;
}

/// A row in one of the owned resource tables
pub trait Record: Clone + Serialize + Send + Sync + Unpin + 'static {
    const KIND: ResourceKind;

    /// Insert payload with the owning user already stamped
    type New: Send + 'static;
    type Changes: Changeset + Send + 'static;

    fn id(&self) -> Uuid;

    /// Foreign key to the parent row; `None` only for documents
    fn parent_id(&self) -> Option<Uuid>;

    /// Directly stored owner, for tables that carry a `user_id` column
    fn owner(&self) -> Option<&str>;

    fn sort_key(&self) -> DateTime<Utc>;

    fn link(&self) -> OwnershipLink {
        OwnershipLink {
            id: self.id(),
            parent_id: self.parent_id(),
            user_id: self.owner().map(str::to_string),
        }
    }
}

/// One-per-user record, created lazily on first access
pub trait SingletonRecord: Clone + Serialize + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Column holding the user id the row is keyed by
    const KEY_COLUMN: &'static str;

    type Changes: Changeset + Send + 'static;

    fn user_key(&self) -> &str;
}

/// Row filter for list queries
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// Rows whose own `user_id` matches
    Owner(String),
    /// Rows whose parent foreign key is in the set
    Parents(Vec<Uuid>),
}

#[async_trait]
pub trait Table<R: Record>: Send + Sync {
    /// Newest first
    async fn list(&self, scope: Scope) -> Result<Vec<R>, StoreError>;

    async fn list_ids(&self, scope: Scope) -> Result<Vec<Uuid>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<R>, StoreError>;

    async fn insert(&self, new: R::New) -> Result<R, StoreError>;

    /// Write the changeset; `None` when the row vanished underneath us
    async fn update(&self, id: Uuid, changes: R::Changes) -> Result<Option<R>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Singleton<R: SingletonRecord>: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<R>, StoreError>;

    /// Fetch the row, inserting a blank one first if the user has none
    async fn ensure(&self, user_id: &str) -> Result<R, StoreError>;

    async fn update(&self, user_id: &str, changes: R::Changes) -> Result<Option<R>, StoreError>;

    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    fn documents(&self) -> &dyn Table<Document>;
    fn lessons(&self) -> &dyn Table<Lesson>;
    fn quizzes(&self) -> &dyn Table<Quiz>;
    fn quiz_attempts(&self) -> &dyn Table<QuizAttempt>;
    fn flashcards(&self) -> &dyn Table<Flashcard>;
    fn reviews(&self) -> &dyn Table<Review>;
    fn profiles(&self) -> &dyn Singleton<Profile>;
    fn progress(&self) -> &dyn Singleton<Progress>;

    /// Parent pointer and direct owner of a row, for the ownership walk
    async fn link(&self, kind: ResourceKind, id: Uuid) -> Result<Option<OwnershipLink>, StoreError> {
        let link = match kind {
            ResourceKind::Document => self.documents().get(id).await?.map(|r| r.link()),
            ResourceKind::Lesson => self.lessons().get(id).await?.map(|r| r.link()),
            ResourceKind::Quiz => self.quizzes().get(id).await?.map(|r| r.link()),
            ResourceKind::QuizAttempt => self.quiz_attempts().get(id).await?.map(|r| r.link()),
            ResourceKind::Flashcard => self.flashcards().get(id).await?.map(|r| r.link()),
            ResourceKind::Review => self.reviews().get(id).await?.map(|r| r.link()),
        };
        Ok(link)
    }

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Partial update that skips the write entirely when nothing changed
pub async fn apply_changes<R: Record>(
    table: &dyn Table<R>,
    id: Uuid,
    changes: R::Changes,
) -> Result<Option<R>, StoreError> {
    if changes.is_empty() {
        return table.get(id).await;
    }
    table.update(id, changes).await
}

/// Singleton flavour of [`apply_changes`]
pub async fn apply_singleton_changes<R: SingletonRecord>(
    singleton: &dyn Singleton<R>,
    user_id: &str,
    changes: R::Changes,
) -> Result<Option<R>, StoreError> {
    if changes.is_empty() {
        return singleton.get(user_id).await;
    }
    singleton.update(user_id, changes).await
}

/// Lessons reachable from the user's documents
pub async fn list_lessons_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<Lesson>, StoreError> {
    let document_ids = store.documents().list_ids(Scope::Owner(user_id.to_string())).await?;
    if document_ids.is_empty() {
        return Ok(Vec::new());
    }
    store.lessons().list(Scope::Parents(document_ids)).await
}

/// Quizzes reachable from the user's lessons
pub async fn list_quizzes_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<Quiz>, StoreError> {
    let document_ids = store.documents().list_ids(Scope::Owner(user_id.to_string())).await?;
    if document_ids.is_empty() {
        return Ok(Vec::new());
    }
    let lesson_ids = store.lessons().list_ids(Scope::Parents(document_ids)).await?;
    if lesson_ids.is_empty() {
        return Ok(Vec::new());
    }
    store.quizzes().list(Scope::Parents(lesson_ids)).await
}
