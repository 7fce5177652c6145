use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemRecord;
use crate::database::postgres::{PgRecord, SqlValue};
use crate::database::{Changeset, Record};
use crate::ownership::ResourceKind;
use crate::validation::Patch;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub bullets: Option<Vec<String>>,
    pub key_terms: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub document_id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub bullets: Option<Vec<String>>,
    pub key_terms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonChanges {
    #[serde(default)]
    pub document_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Patch<String>,
    #[serde(default)]
    pub bullets: Patch<Vec<String>>,
    #[serde(default)]
    pub key_terms: Patch<Vec<String>>,
}

impl Changeset for LessonChanges {
    fn is_empty(&self) -> bool {
        self.document_id.is_none()
            && self.title.is_none()
            && self.summary.is_absent()
            && self.bullets.is_absent()
            && self.key_terms.is_absent()
    }
}

impl Record for Lesson {
    const KIND: ResourceKind = ResourceKind::Lesson;
    type New = NewLesson;
    type Changes = LessonChanges;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.document_id)
    }

    fn owner(&self) -> Option<&str> {
        None
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PgRecord for Lesson {
    fn insert_columns(new: NewLesson) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("document_id", SqlValue::Uuid(new.document_id)),
            ("title", SqlValue::Text(Some(new.title))),
            ("summary", SqlValue::Text(new.summary)),
            ("bullets", SqlValue::TextList(new.bullets)),
            ("key_terms", SqlValue::TextList(new.key_terms)),
        ]
    }

    fn update_columns(changes: LessonChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(document_id) = changes.document_id {
            columns.push(("document_id", SqlValue::Uuid(document_id)));
        }
        if let Some(title) = changes.title {
            columns.push(("title", SqlValue::Text(Some(title))));
        }
        if let Some(summary) = changes.summary.into_update() {
            columns.push(("summary", SqlValue::Text(summary)));
        }
        if let Some(bullets) = changes.bullets.into_update() {
            columns.push(("bullets", SqlValue::TextList(bullets)));
        }
        if let Some(key_terms) = changes.key_terms.into_update() {
            columns.push(("key_terms", SqlValue::TextList(key_terms)));
        }
        columns
    }
}

impl MemRecord for Lesson {
    fn from_new(new: NewLesson) -> Self {
        Lesson {
            id: Uuid::new_v4(),
            document_id: new.document_id,
            title: new.title,
            summary: new.summary,
            bullets: new.bullets,
            key_terms: new.key_terms,
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: LessonChanges) {
        if let Some(document_id) = changes.document_id {
            self.document_id = document_id;
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        changes.summary.apply_to(&mut self.summary);
        changes.bullets.apply_to(&mut self.bullets);
        changes.key_terms.apply_to(&mut self.key_terms);
    }
}
