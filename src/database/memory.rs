//! In-process store used by tests and local runs without PostgreSQL.
//!
//! Tables are plain vectors behind `RwLock`s. Every call bumps an operation
//! counter and every mutation bumps a write counter, so tests can assert
//! that a request was rejected before it touched storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Document, Flashcard, Lesson, Profile, Progress, Quiz, QuizAttempt, Review};
use super::{Record, Scope, Singleton, SingletonRecord, Store, StoreError, Table};

/// Construction and patching of rows without a database
pub trait MemRecord: Record {
    fn from_new(new: Self::New) -> Self;
    fn apply(&mut self, changes: Self::Changes);
}

pub trait MemSingletonRecord: SingletonRecord {
    /// Row as it looks right after a lazy create
    fn blank(user_id: &str) -> Self;
    fn apply(&mut self, changes: Self::Changes);
}

#[derive(Debug, Default)]
struct Counters {
    operations: AtomicUsize,
    writes: AtomicUsize,
}

impl Counters {
    fn read(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

pub struct MemoryTable<R> {
    rows: RwLock<Vec<R>>,
    counters: Arc<Counters>,
}

impl<R: MemRecord> MemoryTable<R> {
    fn new(counters: Arc<Counters>) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            counters,
        }
    }

    fn matches(row: &R, scope: &Scope) -> bool {
        match scope {
            Scope::Owner(user_id) => row.owner() == Some(user_id.as_str()),
            Scope::Parents(ids) => row.parent_id().map_or(false, |p| ids.contains(&p)),
        }
    }
}

#[async_trait]
impl<R: MemRecord> Table<R> for MemoryTable<R> {
    async fn list(&self, scope: Scope) -> Result<Vec<R>, StoreError> {
        self.counters.read();
        let rows = self.rows.read().map_err(poisoned)?;
        let mut found: Vec<R> = rows
            .iter()
            .filter(|row| Self::matches(row, &scope))
            .cloned()
            .collect();
        // Newest first; later inserts win ties
        found.reverse();
        found.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        Ok(found)
    }

    async fn list_ids(&self, scope: Scope) -> Result<Vec<Uuid>, StoreError> {
        self.counters.read();
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .iter()
            .filter(|row| Self::matches(row, &scope))
            .map(|row| row.id())
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        self.counters.read();
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn insert(&self, new: R::New) -> Result<R, StoreError> {
        self.counters.write();
        let row = R::from_new(new);
        self.rows.write().map_err(poisoned)?.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: R::Changes) -> Result<Option<R>, StoreError> {
        self.counters.write();
        let mut rows = self.rows.write().map_err(poisoned)?;
        Ok(rows.iter_mut().find(|row| row.id() == id).map(|row| {
            row.apply(changes);
            row.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.counters.write();
        self.rows.write().map_err(poisoned)?.retain(|row| row.id() != id);
        Ok(())
    }
}

pub struct MemorySingleton<R> {
    rows: RwLock<Vec<R>>,
    counters: Arc<Counters>,
}

impl<R: MemSingletonRecord> MemorySingleton<R> {
    fn new(counters: Arc<Counters>) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            counters,
        }
    }
}

#[async_trait]
impl<R: MemSingletonRecord> Singleton<R> for MemorySingleton<R> {
    async fn get(&self, user_id: &str) -> Result<Option<R>, StoreError> {
        self.counters.read();
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.iter().find(|row| row.user_key() == user_id).cloned())
    }

    async fn ensure(&self, user_id: &str) -> Result<R, StoreError> {
        self.counters.read();
        let mut rows = self.rows.write().map_err(poisoned)?;
        if let Some(row) = rows.iter().find(|row| row.user_key() == user_id) {
            return Ok(row.clone());
        }
        self.counters.write();
        let row = R::blank(user_id);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, user_id: &str, changes: R::Changes) -> Result<Option<R>, StoreError> {
        self.counters.write();
        let mut rows = self.rows.write().map_err(poisoned)?;
        Ok(rows.iter_mut().find(|row| row.user_key() == user_id).map(|row| {
            row.apply(changes);
            row.clone()
        }))
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.counters.write();
        self.rows.write().map_err(poisoned)?.retain(|row| row.user_key() != user_id);
        Ok(())
    }
}

pub struct MemoryStore {
    counters: Arc<Counters>,
    documents: MemoryTable<Document>,
    lessons: MemoryTable<Lesson>,
    quizzes: MemoryTable<Quiz>,
    quiz_attempts: MemoryTable<QuizAttempt>,
    flashcards: MemoryTable<Flashcard>,
    reviews: MemoryTable<Review>,
    profiles: MemorySingleton<Profile>,
    progress: MemorySingleton<Progress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let counters = Arc::new(Counters::default());
        Self {
            documents: MemoryTable::new(counters.clone()),
            lessons: MemoryTable::new(counters.clone()),
            quizzes: MemoryTable::new(counters.clone()),
            quiz_attempts: MemoryTable::new(counters.clone()),
            flashcards: MemoryTable::new(counters.clone()),
            reviews: MemoryTable::new(counters.clone()),
            profiles: MemorySingleton::new(counters.clone()),
            progress: MemorySingleton::new(counters.clone()),
            counters,
        }
    }

    /// Total store calls, reads included
    pub fn operation_count(&self) -> usize {
        self.counters.operations.load(Ordering::SeqCst)
    }

    /// Inserts, updates, deletes and lazy singleton creates
    pub fn write_count(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn documents(&self) -> &dyn Table<Document> {
        &self.documents
    }

    fn lessons(&self) -> &dyn Table<Lesson> {
        &self.lessons
    }

    fn quizzes(&self) -> &dyn Table<Quiz> {
        &self.quizzes
    }

    fn quiz_attempts(&self) -> &dyn Table<QuizAttempt> {
        &self.quiz_attempts
    }

    fn flashcards(&self) -> &dyn Table<Flashcard> {
        &self.flashcards
    }

    fn reviews(&self) -> &dyn Table<Review> {
        &self.reviews
    }

    fn profiles(&self) -> &dyn Singleton<Profile> {
        &self.profiles
    }

    fn progress(&self) -> &dyn Singleton<Progress> {
        &self.progress
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
