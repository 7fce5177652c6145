use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemSingletonRecord;
use crate::database::postgres::{PgSingletonRecord, SqlValue};
use crate::database::{Changeset, SingletonRecord};
use crate::validation::Patch;

/// Learning counters, one row per user, zeroed on first read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Progress {
    pub id: Uuid,
    pub user_id: String,
    pub lessons_completed: i32,
    pub quizzes_taken: i32,
    pub avg_score: Option<f64>,
    pub flashcards_created: i32,
    pub streak_days: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressChanges {
    #[serde(default)]
    pub lessons_completed: Option<i32>,
    #[serde(default)]
    pub quizzes_taken: Option<i32>,
    #[serde(default)]
    pub avg_score: Patch<f64>,
    #[serde(default)]
    pub flashcards_created: Option<i32>,
    #[serde(default)]
    pub streak_days: Option<i32>,
}

impl Changeset for ProgressChanges {
    fn is_empty(&self) -> bool {
        self.lessons_completed.is_none()
            && self.quizzes_taken.is_none()
            && self.avg_score.is_absent()
            && self.flashcards_created.is_none()
            && self.streak_days.is_none()
    }
}

impl SingletonRecord for Progress {
    const TABLE: &'static str = "progress";
    const KEY_COLUMN: &'static str = "user_id";
    type Changes = ProgressChanges;

    fn user_key(&self) -> &str {
        &self.user_id
    }
}

impl PgSingletonRecord for Progress {
    fn update_columns(changes: ProgressChanges) -> Vec<(&'static str, SqlValue)> {
        let counters = [
            ("lessons_completed", changes.lessons_completed),
            ("quizzes_taken", changes.quizzes_taken),
            ("flashcards_created", changes.flashcards_created),
            ("streak_days", changes.streak_days),
        ];

        let mut columns: Vec<(&'static str, SqlValue)> = counters
            .into_iter()
            .filter_map(|(column, value)| value.map(|v| (column, SqlValue::Integer(Some(v)))))
            .collect();
        if let Some(avg_score) = changes.avg_score.into_update() {
            columns.push(("avg_score", SqlValue::Float(avg_score)));
        }
        columns.push(("updated_at", SqlValue::Now));
        columns
    }
}

impl MemSingletonRecord for Progress {
    fn blank(user_id: &str) -> Self {
        Progress {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            lessons_completed: 0,
            quizzes_taken: 0,
            avg_score: None,
            flashcards_created: 0,
            streak_days: 0,
            updated_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: ProgressChanges) {
        if let Some(v) = changes.lessons_completed {
            self.lessons_completed = v;
        }
        if let Some(v) = changes.quizzes_taken {
            self.quizzes_taken = v;
        }
        if let Some(v) = changes.flashcards_created {
            self.flashcards_created = v;
        }
        if let Some(v) = changes.streak_days {
            self.streak_days = v;
        }
        changes.avg_score.apply_to(&mut self.avg_score);
        self.updated_at = Utc::now();
    }
}
