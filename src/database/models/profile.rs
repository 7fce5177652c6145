use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::memory::MemSingletonRecord;
use crate::database::postgres::{PgSingletonRecord, SqlValue};
use crate::database::{Changeset, SingletonRecord};
use crate::validation::Patch;

/// Per-user profile; the row id is the user id itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub grade: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub grade: Patch<String>,
    #[serde(default)]
    pub subjects: Patch<Vec<String>>,
}

impl Changeset for ProfileChanges {
    fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.grade.is_absent() && self.subjects.is_absent()
    }
}

impl SingletonRecord for Profile {
    const TABLE: &'static str = "profiles";
    const KEY_COLUMN: &'static str = "id";
    type Changes = ProfileChanges;

    fn user_key(&self) -> &str {
        &self.id
    }
}

impl PgSingletonRecord for Profile {
    fn update_columns(changes: ProfileChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(full_name) = changes.full_name {
            columns.push(("full_name", SqlValue::Text(Some(full_name))));
        }
        if let Some(grade) = changes.grade.into_update() {
            columns.push(("grade", SqlValue::Text(grade)));
        }
        if let Some(subjects) = changes.subjects.into_update() {
            columns.push(("subjects", SqlValue::TextList(subjects)));
        }
        columns
    }
}

impl MemSingletonRecord for Profile {
    fn blank(user_id: &str) -> Self {
        Profile {
            id: user_id.to_string(),
            full_name: None,
            grade: None,
            subjects: None,
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: ProfileChanges) {
        if let Some(full_name) = changes.full_name {
            self.full_name = Some(full_name);
        }
        changes.grade.apply_to(&mut self.grade);
        changes.subjects.apply_to(&mut self.subjects);
    }
}
