//! Ownership resolution.
//!
//! Every resource hangs off exactly one user: either through its own
//! `user_id` column or through a chain of parent foreign keys that ends at a
//! document. The chain is a fixed tree,
//!
//! ```text
//! document <- lesson <- { quiz <- quiz_attempt, flashcard <- review }
//! ```
//!
//! so resolution is an iterative upward walk over the static [`RELATIONS`]
//! table. Any missing row or mismatched owner along the way is reported as
//! NotFound; callers never learn whether an id exists under another user.

use uuid::Uuid;

use crate::database::{Record, Store, Table};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Lesson,
    Quiz,
    QuizAttempt,
    Flashcard,
    Review,
}

/// Static description of one resource table and its place in the ownership tree
#[derive(Debug)]
pub struct Relation {
    pub kind: ResourceKind,
    pub table: &'static str,
    pub label: &'static str,
    /// Parent kind and the foreign key column pointing at it
    pub parent: Option<(ResourceKind, &'static str)>,
    /// Column holding the owning user id directly, when the row carries one
    pub owner_column: Option<&'static str>,
    pub order_column: &'static str,
}

/// Indexed by `ResourceKind as usize`
pub const RELATIONS: [Relation; 6] = [
    Relation {
        kind: ResourceKind::Document,
        table: "documents",
        label: "Document",
        parent: None,
        owner_column: Some("user_id"),
        order_column: "created_at",
    },
    Relation {
        kind: ResourceKind::Lesson,
        table: "lessons",
        label: "Lesson",
        parent: Some((ResourceKind::Document, "document_id")),
        owner_column: None,
        order_column: "created_at",
    },
    Relation {
        kind: ResourceKind::Quiz,
        table: "quizzes",
        label: "Quiz",
        parent: Some((ResourceKind::Lesson, "lesson_id")),
        owner_column: None,
        order_column: "created_at",
    },
    Relation {
        kind: ResourceKind::QuizAttempt,
        table: "quiz_attempts",
        label: "Quiz attempt",
        parent: Some((ResourceKind::Quiz, "quiz_id")),
        owner_column: Some("user_id"),
        order_column: "created_at",
    },
    Relation {
        kind: ResourceKind::Flashcard,
        table: "flashcards",
        label: "Flashcard",
        parent: Some((ResourceKind::Lesson, "lesson_id")),
        owner_column: Some("user_id"),
        order_column: "created_at",
    },
    Relation {
        kind: ResourceKind::Review,
        table: "reviews",
        label: "Review",
        parent: Some((ResourceKind::Flashcard, "flashcard_id")),
        owner_column: Some("user_id"),
        order_column: "review_date",
    },
];

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Document,
        ResourceKind::Lesson,
        ResourceKind::Quiz,
        ResourceKind::QuizAttempt,
        ResourceKind::Flashcard,
        ResourceKind::Review,
    ];

    pub fn relation(self) -> &'static Relation {
        &RELATIONS[self as usize]
    }

    pub fn table(self) -> &'static str {
        self.relation().table
    }

    pub fn label(self) -> &'static str {
        self.relation().label
    }

    pub fn parent(self) -> Option<ResourceKind> {
        self.relation().parent.map(|(kind, _)| kind)
    }

    pub fn foreign_key(self) -> Option<&'static str> {
        self.relation().parent.map(|(_, column)| column)
    }

    pub fn owner_column(self) -> Option<&'static str> {
        self.relation().owner_column
    }

    pub fn order_column(self) -> &'static str {
        self.relation().order_column
    }

    pub fn not_found(self) -> ApiError {
        ApiError::not_found(format!("{} not found", self.label()))
    }
}

/// One step of the walk: the row's parent pointer and direct owner, if any
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipLink {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub user_id: Option<String>,
}

pub struct OwnershipResolver<'a> {
    store: &'a dyn Store,
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// User id at the root of the chain
    pub async fn resolve_owner(&self, kind: ResourceKind, id: Uuid) -> Result<String, ApiError> {
        let (_, owner) = self.walk(kind, id, None).await?;
        Ok(owner)
    }

    /// Confirm `user_id` owns the resource, returning its ownership link
    pub async fn assert_owned(
        &self,
        kind: ResourceKind,
        id: Uuid,
        user_id: &str,
    ) -> Result<OwnershipLink, ApiError> {
        let (leaf, _) = self.walk(kind, id, Some(user_id)).await?;
        Ok(leaf)
    }

    /// Ownership-checked fetch of the full row
    pub async fn fetch_owned<R: Record>(
        &self,
        table: &dyn Table<R>,
        id: Uuid,
        user_id: &str,
    ) -> Result<R, ApiError> {
        self.assert_owned(R::KIND, id, user_id).await?;
        table.get(id).await?.ok_or_else(|| R::KIND.not_found())
    }

    /// Walk to the root. Every direct owner seen on the way must agree with
    /// the first one (the acting user, when given), so a leaf stamped for one
    /// user under another user's document never resolves.
    async fn walk(
        &self,
        kind: ResourceKind,
        id: Uuid,
        acting: Option<&str>,
    ) -> Result<(OwnershipLink, String), ApiError> {
        let mut expected = acting.map(str::to_string);
        let leaf = self.step(kind, id, &mut expected).await?;
        let mut kind = kind;
        let mut link = leaf.clone();

        // Depth is bounded by the tree: at most review -> flashcard -> lesson -> document
        loop {
            let Some(parent) = kind.parent() else {
                let owner = link.user_id.clone().ok_or_else(|| kind.not_found())?;
                return Ok((leaf, owner));
            };
            let parent_id = link.parent_id.ok_or_else(|| kind.not_found())?;
            link = self.step(parent, parent_id, &mut expected).await?;
            kind = parent;
        }
    }

    async fn step(
        &self,
        kind: ResourceKind,
        id: Uuid,
        expected: &mut Option<String>,
    ) -> Result<OwnershipLink, ApiError> {
        let link = self
            .store
            .link(kind, id)
            .await?
            .ok_or_else(|| kind.not_found())?;

        if let Some(owner) = link.user_id.as_deref() {
            match expected.as_deref() {
                Some(seen) if seen != owner => {
                    tracing::debug!(
                        table = kind.table(),
                        %id,
                        "Ownership mismatch, reporting not found"
                    );
                    return Err(kind.not_found());
                }
                Some(_) => {}
                None => *expected = Some(owner.to_string()),
            }
        }

        Ok(link)
    }
}
