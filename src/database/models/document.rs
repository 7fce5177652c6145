use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::memory::MemRecord;
use crate::database::postgres::{PgRecord, SqlValue};
use crate::database::{Changeset, Record};
use crate::ownership::ResourceKind;

/// Raw source text a user uploads; the root of every ownership chain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: String,
    pub text: String,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: String,
    pub text: String,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChanges {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Changeset for DocumentChanges {
    fn is_empty(&self) -> bool {
        self.text.is_none() && self.source_url.is_none()
    }
}

impl Record for Document {
    const KIND: ResourceKind = ResourceKind::Document;
    type New = NewDocument;
    type Changes = DocumentChanges;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        None
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PgRecord for Document {
    fn insert_columns(new: NewDocument) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", SqlValue::Text(Some(new.user_id))),
            ("text", SqlValue::Text(Some(new.text))),
            ("source_url", SqlValue::Text(new.source_url)),
        ]
    }

    fn update_columns(changes: DocumentChanges) -> Vec<(&'static str, SqlValue)> {
        let mut columns = Vec::new();
        if let Some(text) = changes.text {
            columns.push(("text", SqlValue::Text(Some(text))));
        }
        if let Some(source_url) = changes.source_url {
            columns.push(("source_url", SqlValue::Text(Some(source_url))));
        }
        columns
    }
}

impl MemRecord for Document {
    fn from_new(new: NewDocument) -> Self {
        Document {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            text: new.text,
            source_url: new.source_url,
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, changes: DocumentChanges) {
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(source_url) = changes.source_url {
            self.source_url = Some(source_url);
        }
    }
}
