//! Declarative request contracts.
//!
//! Each endpoint declares a static [`Schema`]: a list of fields, each with a
//! [`Rule`], a required flag and a nullable flag. [`Schema::check`] walks the
//! raw JSON body, collects every field error, normalises accepted values
//! (trimming, canonical UUIDs and timestamps) and drops undeclared keys. The
//! result is then deserialized into the endpoint's typed payload.

pub mod patch;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ApiError;

pub use patch::Patch;

/// Primitive constraint applied to a present, non-null value
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Uuid,
    Text {
        min: usize,
        max: Option<usize>,
        trim: bool,
    },
    Url,
    TextList {
        trim: bool,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as midnight UTC
    Timestamp,
    /// Any JSON value
    Json,
}

impl Rule {
    pub const fn text(min: usize) -> Self {
        Rule::Text { min, max: None, trim: false }
    }

    pub const fn trimmed(min: usize, max: Option<usize>) -> Self {
        Rule::Text { min, max, trim: true }
    }

    pub const fn int_range(min: i64, max: i64) -> Self {
        Rule::Integer { min: Some(min), max: Some(max) }
    }

    pub const fn non_negative_int() -> Self {
        Rule::Integer { min: Some(0), max: None }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
    pub nullable: bool,
}

impl Field {
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self { name, rule, required: true, nullable: false }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self { name, rule, required: false, nullable: false }
    }

    pub const fn nullable(self) -> Self {
        Self { nullable: true, ..self }
    }
}

#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Validate a raw body, returning the normalised object.
    pub fn check(&self, body: Value) -> Result<Value, ApiError> {
        let Value::Object(mut input) = body else {
            return Err(ApiError::validation_error(
                "Request body must be a JSON object",
                None,
            ));
        };

        let mut output = Map::new();
        let mut errors = BTreeMap::new();

        for field in self.fields {
            match input.remove(field.name) {
                None => {
                    if field.required {
                        errors.insert(field.name.to_string(), "is required".to_string());
                    }
                }
                Some(Value::Null) => {
                    if field.nullable {
                        output.insert(field.name.to_string(), Value::Null);
                    } else {
                        errors.insert(field.name.to_string(), "cannot be null".to_string());
                    }
                }
                Some(value) => match check_rule(field.rule, value) {
                    Ok(normalised) => {
                        output.insert(field.name.to_string(), normalised);
                    }
                    Err(msg) => {
                        errors.insert(field.name.to_string(), msg);
                    }
                },
            }
        }

        if !errors.is_empty() {
            let summary = errors
                .iter()
                .map(|(field, msg)| format!("{} {}", field, msg))
                .collect::<Vec<_>>()
                .join("; ");
            tracing::debug!(schema = self.name, "Validation failed: {}", summary);
            return Err(ApiError::validation_error(summary, Some(errors)));
        }

        Ok(Value::Object(output))
    }

    /// Validate and deserialize into the typed payload.
    pub fn parse<T: DeserializeOwned>(&self, body: Value) -> Result<T, ApiError> {
        let checked = self.check(body)?;
        serde_json::from_value(checked)
            .map_err(|e| ApiError::validation_error(format!("Invalid {}: {}", self.name, e), None))
    }
}

/// A typed request body bound to its schema
pub trait Payload: DeserializeOwned + Send {
    fn schema() -> &'static Schema;
}

/// Validate an arbitrary JSON value against `T`'s contract
pub fn validate<T: Payload>(payload: Value) -> Result<T, ApiError> {
    T::schema().parse(payload)
}

/// Extractor: JSON body validated against `T::schema()` before the handler runs
#[derive(Debug)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Payload,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;

        validate::<T>(body).map(Validated)
    }
}

fn check_rule(rule: Rule, value: Value) -> Result<Value, String> {
    match rule {
        Rule::Uuid => {
            let s = value.as_str().ok_or("must be a UUID string")?;
            let id = Uuid::parse_str(s).map_err(|_| "must be a valid UUID".to_string())?;
            Ok(Value::String(id.to_string()))
        }
        Rule::Text { min, max, trim } => {
            let s = value.as_str().ok_or("must be a string")?;
            let s = if trim { s.trim() } else { s };
            let len = s.chars().count();
            if len < min {
                return Err(format!("must be at least {} characters", min));
            }
            if let Some(max) = max {
                if len > max {
                    return Err(format!("must be at most {} characters", max));
                }
            }
            Ok(Value::String(s.to_string()))
        }
        Rule::Url => {
            let s = value.as_str().ok_or("must be a string")?;
            url::Url::parse(s).map_err(|_| "must be a valid URL".to_string())?;
            Ok(Value::String(s.to_string()))
        }
        Rule::TextList { trim } => {
            let items = value.as_array().ok_or("must be an array of strings")?;
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| Value::String(if trim { s.trim() } else { s }.to_string()))
                        .ok_or_else(|| "must be an array of strings".to_string())
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Rule::Integer { min, max } => {
            let n = as_integer(&value).ok_or("must be an integer")?;
            if let Some(min) = min {
                if n < min {
                    return Err(format!("must be at least {}", min));
                }
            }
            if let Some(max) = max {
                if n > max {
                    return Err(format!("must be at most {}", max));
                }
            }
            Ok(Value::Number(Number::from(n)))
        }
        Rule::Number { min, max } => {
            let n = value
                .as_f64()
                .filter(|n| n.is_finite())
                .ok_or("must be a number")?;
            if let Some(min) = min {
                if n < min {
                    return Err(format!("must be at least {}", min));
                }
            }
            if let Some(max) = max {
                if n > max {
                    return Err(format!("must be at most {}", max));
                }
            }
            Ok(value)
        }
        Rule::Timestamp => {
            let s = value.as_str().ok_or("must be a timestamp string")?;
            let ts = parse_timestamp(s.trim()).ok_or("must be an RFC 3339 timestamp or YYYY-MM-DD date")?;
            Ok(Value::String(ts.to_rfc3339()))
        }
        Rule::Json => Ok(value),
    }
}

/// Integers that fit an `integer` column; `5.0` counts, `5.5` does not
fn as_integer(value: &Value) -> Option<i64> {
    let n = match value.as_i64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || !f.is_finite() {
                return None;
            }
            f as i64
        }
    };
    (i64::from(i32::MIN)..=i64::from(i32::MAX))
        .contains(&n)
        .then_some(n)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static LESSON: Schema = Schema::new(
        "lesson",
        &[
            Field::required("documentId", Rule::Uuid),
            Field::required("title", Rule::text(1)),
            Field::optional("summary", Rule::text(1)).nullable(),
            Field::optional("bullets", Rule::TextList { trim: false }).nullable(),
        ],
    );

    static ATTEMPT: Schema = Schema::new(
        "quiz attempt",
        &[
            Field::required("answers", Rule::Json),
            Field::optional("score", Rule::int_range(0, 100)).nullable(),
        ],
    );

    fn field_errors(err: ApiError) -> BTreeMap<String, String> {
        match err {
            ApiError::ValidationError { field_errors: Some(f), .. } => f,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn collects_every_field_error() {
        let err = LESSON
            .check(json!({ "documentId": "nope", "title": "" }))
            .unwrap_err();
        let fields = field_errors(err);
        assert_eq!(fields["documentId"], "must be a valid UUID");
        assert_eq!(fields["title"], "must be at least 1 characters");
    }

    #[test]
    fn missing_required_field() {
        let fields = field_errors(LESSON.check(json!({ "title": "Cells" })).unwrap_err());
        assert_eq!(fields["documentId"], "is required");
    }

    #[test]
    fn null_allowed_only_on_nullable_fields() {
        let id = Uuid::new_v4().to_string();
        let ok = LESSON
            .check(json!({ "documentId": id, "title": "Cells", "summary": null }))
            .unwrap();
        assert_eq!(ok["summary"], Value::Null);

        let fields = field_errors(
            LESSON
                .check(json!({ "documentId": id, "title": null }))
                .unwrap_err(),
        );
        assert_eq!(fields["title"], "cannot be null");
    }

    #[test]
    fn strips_unknown_fields() {
        let id = Uuid::new_v4().to_string();
        let ok = LESSON
            .check(json!({ "documentId": id, "title": "Cells", "userId": "someone-else" }))
            .unwrap();
        assert!(ok.get("userId").is_none());
    }

    #[test]
    fn integer_bounds() {
        assert!(ATTEMPT.check(json!({ "answers": [], "score": 100 })).is_ok());
        assert!(ATTEMPT.check(json!({ "answers": [], "score": 0 })).is_ok());
        assert!(ATTEMPT.check(json!({ "answers": [], "score": 100.0 })).is_ok());

        let fields = field_errors(ATTEMPT.check(json!({ "answers": [], "score": 101 })).unwrap_err());
        assert_eq!(fields["score"], "must be at most 100");
        let fields = field_errors(ATTEMPT.check(json!({ "answers": [], "score": -1 })).unwrap_err());
        assert_eq!(fields["score"], "must be at least 0");
        let fields = field_errors(ATTEMPT.check(json!({ "answers": [], "score": 50.5 })).unwrap_err());
        assert_eq!(fields["score"], "must be an integer");
    }

    #[test]
    fn trims_and_normalises() {
        static PROFILE: Schema = Schema::new(
            "profile",
            &[
                Field::optional("fullName", Rule::trimmed(1, Some(5))),
                Field::optional("subjects", Rule::TextList { trim: true }).nullable(),
                Field::optional("reviewDate", Rule::Timestamp),
            ],
        );

        let ok = PROFILE
            .check(json!({ "fullName": "  Ada  ", "subjects": [" math "], "reviewDate": "2024-03-01" }))
            .unwrap();
        assert_eq!(ok["fullName"], "Ada");
        assert_eq!(ok["subjects"], json!(["math"]));
        assert_eq!(ok["reviewDate"], "2024-03-01T00:00:00+00:00");

        let fields = field_errors(PROFILE.check(json!({ "fullName": "   " })).unwrap_err());
        assert_eq!(fields["fullName"], "must be at least 1 characters");
    }

    #[test]
    fn rejects_non_object_body() {
        let err = LESSON.check(json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
