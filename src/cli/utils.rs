use std::io::Read;

use serde_json::Value;

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "message": message }))?);
        }
        OutputFormat::Text => println!("✓ {}", message),
    }
    Ok(())
}

/// Print a row or list of rows returned by the API
pub fn output_value(output_format: OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value {
            Value::Array(rows) if rows.is_empty() => println!("(none)"),
            Value::Array(rows) => {
                for row in rows {
                    println!("{}", summarize_row(row));
                }
            }
            other => {
                if let Value::Object(map) = other {
                    for (key, field) in map {
                        println!("{:<20} {}", key, render_scalar(field));
                    }
                } else {
                    println!("{}", render_scalar(other));
                }
            }
        },
    }
    Ok(())
}

/// One-line summary: id plus the first human-readable column present
fn summarize_row(row: &Value) -> String {
    let id = row.get("id").map(render_scalar).unwrap_or_default();
    let label = ["title", "front", "text", "full_name", "quality", "score"]
        .iter()
        .find_map(|key| row.get(*key).filter(|v| !v.is_null()))
        .map(render_scalar)
        .unwrap_or_default();
    format!("{}  {}", id, truncate(&label, 60))
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}…", cut)
    }
}

/// Read a JSON body from stdin
pub fn read_json_stdin() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        anyhow::bail!("expected a JSON body on stdin");
    }
    Ok(serde_json::from_str(&input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summarizes_by_first_label_column() {
        let row = json!({ "id": "abc", "title": null, "front": "What is ATP?" });
        assert_eq!(summarize_row(&row), "abc  What is ATP?");
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
