use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemRecord;
use crate::database::postgres::{PgRecord, SqlValue};
use crate::database::{Changeset, Record};
use crate::ownership::ResourceKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub lesson_id: Uuid,
    /// Opaque question set produced by the generator
    pub questions: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub lesson_id: Uuid,
    pub questions: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizChanges {
    #[serde(default)]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub questions: Option<Value>,
}

impl Changeset for QuizChanges {
    fn is_empty(&self) -> bool {
        self.lesson_id.is_none() && self.questions.is_none()
    }
}

impl Record for Quiz {
    const KIND: ResourceKind = ResourceKind::Quiz;
    type New = NewQuiz;
    type Changes = QuizChanges;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.lesson_id)
    }

    fn owner(&self) -> Option<&str> {
        None
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PgRecord for Quiz {
    fn insert_columns(new: NewQuiz) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("lesson_id", SqlValue::Uuid(new.lesson_id)),
            ("questions", SqlValue::Json(new.questions)),
        ]
    }

    fn update_columns(changes: QuizChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(lesson_id) = changes.lesson_id {
            columns.push(("lesson_id", SqlValue::Uuid(lesson_id)));
        }
        if let Some(questions) = changes.questions {
            columns.push(("questions", SqlValue::Json(questions)));
        }
        columns
    }
}

impl MemRecord for Quiz {
    fn from_new(new: NewQuiz) -> Self {
        Quiz {
            id: Uuid::new_v4(),
            lesson_id: new.lesson_id,
            questions: new.questions,
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: QuizChanges) {
        if let Some(lesson_id) = changes.lesson_id {
            self.lesson_id = lesson_id;
        }
        if let Some(questions) = changes.questions {
            self.questions = questions;
        }
    }
}
