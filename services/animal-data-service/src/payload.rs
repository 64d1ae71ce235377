use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::NewAnimalRecord;

pub const REQUIRED_FIELDS: [&str; 3] = ["jobId", "generation", "displayName"];

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Missing required fields")]
    MissingFields,
    #[error("{field} must be a string")]
    NotAString { field: &'static str },
}

pub fn parse_animal_payload(body: &[u8]) -> Result<NewAnimalRecord, PayloadError> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice::<Value>(body)?
    };
    let fields = value.as_object();
    let field = |name: &str| fields.and_then(|map| map.get(name));

    if REQUIRED_FIELDS.iter().any(|name| is_falsy(field(name))) {
        return Err(PayloadError::MissingFields);
    }

    Ok(NewAnimalRecord {
        job_id: required_string(field("jobId"), "jobId")?,
        generation: required_string(field("generation"), "generation")?,
        display_name: required_string(field("displayName"), "displayName")?,
        timestamp: optional_string(field("timestamp"), "timestamp")?,
        source: optional_string(field("source"), "source")?,
    })
}

fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

fn required_string(value: Option<&Value>, field: &'static str) -> Result<String, PayloadError> {
    match value {
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        _ => Err(PayloadError::NotAString { field }),
    }
}

fn optional_string(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<String>, PayloadError> {
    if is_falsy(value) {
        return Ok(None);
    }
    match value {
        Some(Value::String(text)) => Ok(Some(text.clone())),
        _ => Err(PayloadError::NotAString { field }),
    }
}
