use clap::ValueEnum;
use serde_json::Value;

use crate::cli::utils::{output_success, output_value, read_json_stdin};
use crate::cli::{client_from_config, OutputFormat};

/// Collections exposed under `/api`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceName {
    Documents,
    Lessons,
    Quizzes,
    QuizAttempts,
    Flashcards,
    Reviews,
}

impl ResourceName {
    pub fn path(self) -> &'static str {
        match self {
            ResourceName::Documents => "/api/documents",
            ResourceName::Lessons => "/api/lessons",
            ResourceName::Quizzes => "/api/quizzes",
            ResourceName::QuizAttempts => "/api/quiz-attempts",
            ResourceName::Flashcards => "/api/flashcards",
            ResourceName::Reviews => "/api/reviews",
        }
    }

    fn item_path(self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }
}

pub async fn list(resource: ResourceName, output_format: OutputFormat) -> anyhow::Result<()> {
    let rows: Value = client_from_config()?.get(resource.path()).await?;
    output_value(output_format, &rows)
}

pub async fn get(resource: ResourceName, id: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let row: Value = client_from_config()?.get(&resource.item_path(id)).await?;
    output_value(output_format, &row)
}

pub async fn create(resource: ResourceName, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = read_json_stdin()?;
    let row: Value = client_from_config()?.post(resource.path(), &body).await?;
    output_value(output_format, &row)
}

pub async fn update(resource: ResourceName, id: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = read_json_stdin()?;
    let row: Value = client_from_config()?.patch(&resource.item_path(id), &body).await?;
    output_value(output_format, &row)
}

pub async fn delete(resource: ResourceName, id: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    client_from_config()?.delete(&resource.item_path(id)).await?;
    output_success(output_format, &format!("Deleted {}", resource.item_path(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_in_kebab_case() {
        let parsed = ResourceName::from_str("quiz-attempts", false).unwrap();
        assert_eq!(parsed.path(), "/api/quiz-attempts");
    }
}
