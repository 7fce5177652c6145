use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemRecord;
use crate::database::postgres::{PgRecord, SqlValue};
use crate::database::{Changeset, Record};
use crate::ownership::ResourceKind;
use crate::validation::Patch;

/// A spaced-repetition card. `review_count` starts at zero and is only
/// ever moved by explicit updates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Flashcard {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub user_id: String,
    pub front: String,
    pub back: String,
    pub hint: Option<String>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFlashcard {
    pub lesson_id: Uuid,
    pub user_id: String,
    pub front: String,
    pub back: String,
    pub hint: Option<String>,
    pub next_review_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardChanges {
    #[serde(default)]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub hint: Patch<String>,
    #[serde(default)]
    pub next_review_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub review_count: Option<i32>,
}

impl Changeset for FlashcardChanges {
    fn is_empty(&self) -> bool {
        self.lesson_id.is_none()
            && self.front.is_none()
            && self.back.is_none()
            && self.hint.is_absent()
            && self.next_review_date.is_absent()
            && self.review_count.is_none()
    }
}

impl Record for Flashcard {
    const KIND: ResourceKind = ResourceKind::Flashcard;
    type New = NewFlashcard;
    type Changes = FlashcardChanges;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.lesson_id)
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PgRecord for Flashcard {
    fn insert_columns(new: NewFlashcard) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("lesson_id", SqlValue::Uuid(new.lesson_id)),
            ("user_id", SqlValue::Text(Some(new.user_id))),
            ("front", SqlValue::Text(Some(new.front))),
            ("back", SqlValue::Text(Some(new.back))),
            ("hint", SqlValue::Text(new.hint)),
            ("next_review_date", SqlValue::Timestamp(new.next_review_date)),
        ]
    }

    fn update_columns(changes: FlashcardChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(lesson_id) = changes.lesson_id {
            columns.push(("lesson_id", SqlValue::Uuid(lesson_id)));
        }
        if let Some(front) = changes.front {
            columns.push(("front", SqlValue::Text(Some(front))));
        }
        if let Some(back) = changes.back {
            columns.push(("back", SqlValue::Text(Some(back))));
        }
        if let Some(hint) = changes.hint.into_update() {
            columns.push(("hint", SqlValue::Text(hint)));
        }
        if let Some(next_review_date) = changes.next_review_date.into_update() {
            columns.push(("next_review_date", SqlValue::Timestamp(next_review_date)));
        }
        if let Some(review_count) = changes.review_count {
            columns.push(("review_count", SqlValue::Integer(Some(review_count))));
        }
        columns
    }
}

impl MemRecord for Flashcard {
    fn from_new(new: NewFlashcard) -> Self {
        Flashcard {
            id: Uuid::new_v4(),
            lesson_id: new.lesson_id,
            user_id: new.user_id,
            front: new.front,
            back: new.back,
            hint: new.hint,
            next_review_date: new.next_review_date,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: FlashcardChanges) {
        if let Some(lesson_id) = changes.lesson_id {
            self.lesson_id = lesson_id;
        }
        if let Some(front) = changes.front {
            self.front = front;
        }
        if let Some(back) = changes.back {
            self.back = back;
        }
        changes.hint.apply_to(&mut self.hint);
        changes.next_review_date.apply_to(&mut self.next_review_date);
        if let Some(review_count) = changes.review_count {
            self.review_count = review_count;
        }
    }
}
