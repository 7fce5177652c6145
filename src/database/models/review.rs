use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemRecord;
use crate::database::postgres::{PgRecord, SqlValue};
use crate::database::{Changeset, Record};
use crate::ownership::ResourceKind;
use crate::validation::Patch;

/// One review event against a flashcard, with the scheduler's output.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub flashcard_id: Uuid,
    pub user_id: String,
    pub review_date: DateTime<Utc>,
    pub quality: i32,
    pub new_interval: Option<f64>,
    pub new_ef: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub flashcard_id: Uuid,
    pub user_id: String,
    /// Defaults to now when omitted
    pub review_date: Option<DateTime<Utc>>,
    pub quality: i32,
    pub new_interval: Option<f64>,
    pub new_ef: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewChanges {
    #[serde(default)]
    pub review_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quality: Option<i32>,
    #[serde(default)]
    pub new_interval: Patch<f64>,
    #[serde(default)]
    pub new_ef: Patch<f64>,
}

impl Changeset for ReviewChanges {
    fn is_empty(&self) -> bool {
        self.review_date.is_none()
            && self.quality.is_none()
            && self.new_interval.is_absent()
            && self.new_ef.is_absent()
    }
}

impl Record for Review {
    const KIND: ResourceKind = ResourceKind::Review;
    type New = NewReview;
    type Changes = ReviewChanges;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.flashcard_id)
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.review_date
    }
}

impl PgRecord for Review {
    fn insert_columns(new: NewReview) -> Vec<(&'static str, SqlValue)> {
        let mut columns = vec![
            ("flashcard_id", SqlValue::Uuid(new.flashcard_id)),
            ("user_id", SqlValue::Text(Some(new.user_id))),
            ("quality", SqlValue::Integer(Some(new.quality))),
            ("new_interval", SqlValue::Float(new.new_interval)),
            ("new_ef", SqlValue::Float(new.new_ef)),
        ];
        // Omitted dates fall back to the column default
        if let Some(review_date) = new.review_date {
            columns.push(("review_date", SqlValue::Timestamp(Some(review_date))));
        }
        columns
    }

    fn update_columns(changes: ReviewChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(review_date) = changes.review_date {
            columns.push(("review_date", SqlValue::Timestamp(Some(review_date))));
        }
        if let Some(quality) = changes.quality {
            columns.push(("quality", SqlValue::Integer(Some(quality))));
        }
        if let Some(new_interval) = changes.new_interval.into_update() {
            columns.push(("new_interval", SqlValue::Float(new_interval)));
        }
        if let Some(new_ef) = changes.new_ef.into_update() {
            columns.push(("new_ef", SqlValue::Float(new_ef)));
        }
        columns
    }
}

impl MemRecord for Review {
    fn from_new(new: NewReview) -> Self {
        Review {
            id: Uuid::new_v4(),
            flashcard_id: new.flashcard_id,
            user_id: new.user_id,
            review_date: new.review_date.unwrap_or_else(Utc::now),
            quality: new.quality,
            new_interval: new.new_interval,
            new_ef: new.new_ef,
        }
    }

    fn apply(&mut self, changes: ReviewChanges) {
        if let Some(review_date) = changes.review_date {
            self.review_date = review_date;
        }
        if let Some(quality) = changes.quality {
            self.quality = quality;
        }
        changes.new_interval.apply_to(&mut self.new_interval);
        changes.new_ef.apply_to(&mut self.new_ef);
    }
}
