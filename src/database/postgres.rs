use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::models::{Document, Flashcard, Lesson, Profile, Progress, Quiz, QuizAttempt, Review};
use super::{Record, Scope, Singleton, SingletonRecord, Store, StoreError, Table};
use crate::config::DatabaseConfig;
use crate::ownership::{OwnershipLink, ResourceKind};

/// A bindable column value for generated INSERT/UPDATE statements
#[derive(Debug, Clone)]
pub enum SqlValue {
    Uuid(Uuid),
    Text(Option<String>),
    TextList(Option<Vec<String>>),
    Integer(Option<i32>),
    Float(Option<f64>),
    Json(Value),
    Timestamp(Option<DateTime<Utc>>),
    /// Server clock, emitted inline rather than bound
    Now,
}

impl SqlValue {
    fn push_to(self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            SqlValue::Uuid(v) => qb.push_bind(v),
            SqlValue::Text(v) => qb.push_bind(v),
            SqlValue::TextList(v) => qb.push_bind(v),
            SqlValue::Integer(v) => qb.push_bind(v),
            SqlValue::Float(v) => qb.push_bind(v),
            SqlValue::Json(v) => qb.push_bind(v),
            SqlValue::Timestamp(v) => qb.push_bind(v),
            SqlValue::Now => qb.push("now()"),
        };
    }
}

/// Column mapping for an owned resource table
pub trait PgRecord: Record + for<'r> FromRow<'r, PgRow> {
    fn insert_columns(new: Self::New) -> Vec<(&'static str, SqlValue)>;

    /// Only the columns present in the changeset
    fn update_columns(changes: Self::Changes) -> Vec<(&'static str, SqlValue)>;
}

/// Column mapping for a per-user singleton table
pub trait PgSingletonRecord: SingletonRecord + for<'r> FromRow<'r, PgRow> {
    fn update_columns(changes: Self::Changes) -> Vec<(&'static str, SqlValue)>;
}

fn push_assignments(qb: &mut QueryBuilder<'_, Postgres>, columns: Vec<(&'static str, SqlValue)>) {
    for (i, (column, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column).push(" = ");
        value.push_to(qb);
    }
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, kind: ResourceKind, scope: Scope) -> Result<(), StoreError> {
    match scope {
        Scope::Owner(user_id) => {
            let column = kind.owner_column().ok_or_else(|| {
                StoreError::Backend(format!("{} has no owner column", kind.table()))
            })?;
            qb.push(" WHERE ").push(column).push(" = ").push_bind(user_id);
        }
        Scope::Parents(ids) => {
            let column = kind.foreign_key().ok_or_else(|| {
                StoreError::Backend(format!("{} has no parent", kind.table()))
            })?;
            qb.push(" WHERE ").push(column).push(" = ANY(").push_bind(ids).push(")");
        }
    }
    Ok(())
}

fn select_statement(
    kind: ResourceKind,
    projection: &str,
    scope: Scope,
) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", projection, kind.table()));
    push_scope(&mut qb, kind, scope)?;
    Ok(qb)
}

fn list_statement(kind: ResourceKind, scope: Scope) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb = select_statement(kind, "*", scope)?;
    qb.push(format!(" ORDER BY {} DESC", kind.order_column()));
    Ok(qb)
}

fn insert_statement(table: &str, columns: Vec<(&'static str, SqlValue)>) -> QueryBuilder<'static, Postgres> {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();

    let mut qb = QueryBuilder::new(format!("INSERT INTO {} ({}) VALUES (", table, names.join(", ")));
    for (i, (_, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        value.push_to(&mut qb);
    }
    qb.push(") RETURNING *");
    qb
}

fn update_statement(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    key_column: &str,
    key: SqlValue,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", table));
    push_assignments(&mut qb, columns);
    qb.push(format!(" WHERE {} = ", key_column));
    key.push_to(&mut qb);
    qb.push(" RETURNING *");
    qb
}

fn ensure_statement(table: &str, key_column: &str) -> String {
    format!(
        "INSERT INTO {table} ({key}) VALUES ($1) ON CONFLICT ({key}) DO NOTHING",
        table = table,
        key = key_column
    )
}

/// Linkage columns only; kinds without a parent or owner project a typed NULL
fn link_statement(kind: ResourceKind) -> String {
    let parent = kind.foreign_key().unwrap_or("NULL::uuid");
    let owner = kind.owner_column().unwrap_or("NULL::text");
    format!(
        "SELECT id, {} AS parent_id, {} AS user_id FROM {} WHERE id = $1",
        parent,
        owner,
        kind.table()
    )
}

/// One owned resource table over the shared pool
pub struct PgTable<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgTable<R> {
    fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: PgRecord> Table<R> for PgTable<R> {
    async fn list(&self, scope: Scope) -> Result<Vec<R>, StoreError> {
        let mut qb = list_statement(R::KIND, scope)?;
        let rows = qb.build_query_as::<R>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn list_ids(&self, scope: Scope) -> Result<Vec<Uuid>, StoreError> {
        let mut qb = select_statement(R::KIND, "id", scope)?;
        let ids: Vec<(Uuid,)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", R::KIND.table());
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, new: R::New) -> Result<R, StoreError> {
        let mut qb = insert_statement(R::KIND.table(), R::insert_columns(new));
        let row = qb.build_query_as::<R>().fetch_one(&self.pool).await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: R::Changes) -> Result<Option<R>, StoreError> {
        let columns = R::update_columns(changes);
        if columns.is_empty() {
            return self.get(id).await;
        }

        let mut qb = update_statement(R::KIND.table(), columns, "id", SqlValue::Uuid(id));

        let row = qb.build_query_as::<R>().fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::KIND.table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

/// One per-user singleton table over the shared pool
pub struct PgSingleton<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgSingleton<R> {
    fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: PgSingletonRecord> Singleton<R> for PgSingleton<R> {
    async fn get(&self, user_id: &str) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE {} = $1", R::TABLE, R::KEY_COLUMN);
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ensure(&self, user_id: &str) -> Result<R, StoreError> {
        // Concurrent first reads both land here; the conflict clause makes the loser a no-op
        let insert = ensure_statement(R::TABLE, R::KEY_COLUMN);
        sqlx::query(&insert).bind(user_id).execute(&self.pool).await?;

        self.get(user_id)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("{} row for {} vanished after insert", R::TABLE, user_id)))
    }

    async fn update(&self, user_id: &str, changes: R::Changes) -> Result<Option<R>, StoreError> {
        let columns = R::update_columns(changes);
        if columns.is_empty() {
            return self.get(user_id).await;
        }

        let mut qb = update_statement(
            R::TABLE,
            columns,
            R::KEY_COLUMN,
            SqlValue::Text(Some(user_id.to_string())),
        );

        let row = qb.build_query_as::<R>().fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", R::TABLE, R::KEY_COLUMN);
        sqlx::query(&sql).bind(user_id).execute(&self.pool).await?;
        Ok(())
    }
}

/// PostgreSQL-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    tables: std::sync::Arc<PgTables>,
}

struct PgTables {
    documents: PgTable<Document>,
    lessons: PgTable<Lesson>,
    quizzes: PgTable<Quiz>,
    quiz_attempts: PgTable<QuizAttempt>,
    flashcards: PgTable<Flashcard>,
    reviews: PgTable<Review>,
    profiles: PgSingleton<Profile>,
    progress: PgSingleton<Progress>,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let tables = PgTables {
            documents: PgTable::new(pool.clone()),
            lessons: PgTable::new(pool.clone()),
            quizzes: PgTable::new(pool.clone()),
            quiz_attempts: PgTable::new(pool.clone()),
            flashcards: PgTable::new(pool.clone()),
            reviews: PgTable::new(pool.clone()),
            profiles: PgSingleton::new(pool.clone()),
            progress: PgSingleton::new(pool.clone()),
        };
        Self {
            pool,
            tables: std::sync::Arc::new(tables),
        }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn documents(&self) -> &dyn Table<Document> {
        &self.tables.documents
    }

    fn lessons(&self) -> &dyn Table<Lesson> {
        &self.tables.lessons
    }

    fn quizzes(&self) -> &dyn Table<Quiz> {
        &self.tables.quizzes
    }

    fn quiz_attempts(&self) -> &dyn Table<QuizAttempt> {
        &self.tables.quiz_attempts
    }

    fn flashcards(&self) -> &dyn Table<Flashcard> {
        &self.tables.flashcards
    }

    fn reviews(&self) -> &dyn Table<Review> {
        &self.tables.reviews
    }

    fn profiles(&self) -> &dyn Singleton<Profile> {
        &self.tables.profiles
    }

    fn progress(&self) -> &dyn Singleton<Progress> {
        &self.tables.progress
    }

    /// Reads only the linkage columns instead of whole rows
    async fn link(&self, kind: ResourceKind, id: Uuid) -> Result<Option<OwnershipLink>, StoreError> {
        let sql = link_statement(kind);
        let row: Option<(Uuid, Option<Uuid>, Option<String>)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, parent_id, user_id)| OwnershipLink {
            id,
            parent_id,
            user_id,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
