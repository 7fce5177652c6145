use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemRecord;
use crate::database::postgres::{PgRecord, SqlValue};
use crate::database::{Changeset, Record};
use crate::ownership::ResourceKind;
use crate::validation::Patch;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: String,
    pub answers: Value,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub quiz_id: Uuid,
    pub user_id: String,
    pub answers: Value,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptChanges {
    #[serde(default)]
    pub answers: Option<Value>,
    #[serde(default)]
    pub score: Patch<i32>,
}

impl Changeset for QuizAttemptChanges {
    fn is_empty(&self) -> bool {
        self.answers.is_none() && self.score.is_absent()
    }
}

impl Record for QuizAttempt {
    const KIND: ResourceKind = ResourceKind::QuizAttempt;
    type New = NewQuizAttempt;
    type Changes = QuizAttemptChanges;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.quiz_id)
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PgRecord for QuizAttempt {
    fn insert_columns(new: NewQuizAttempt) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("quiz_id", SqlValue::Uuid(new.quiz_id)),
            ("user_id", SqlValue::Text(Some(new.user_id))),
            ("answers", SqlValue::Json(new.answers)),
            ("score", SqlValue::Integer(new.score)),
        ]
    }

    fn update_columns(changes: QuizAttemptChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(answers) = changes.answers {
            columns.push(("answers", SqlValue::Json(answers)));
        }
        if let Some(score) = changes.score.into_update() {
            columns.push(("score", SqlValue::Integer(score)));
        }
        columns
    }
}

impl MemRecord for QuizAttempt {
    fn from_new(new: NewQuizAttempt) -> Self {
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: new.quiz_id,
            user_id: new.user_id,
            answers: new.answers,
            score: new.score,
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: QuizAttemptChanges) {
        if let Some(answers) = changes.answers {
            self.answers = answers;
        }
        changes.score.apply_to(&mut self.score);
    }
}
