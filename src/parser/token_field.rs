use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::cache::token::Token;

/// Parse the endpoint body as JSON and pull `field` out of it.
///
/// A JSON body without the field yields `Token::Absent` rather than an error,
/// and an explicit `null` field yields `Token::Unset` (nothing to store).
/// Only a body that is not JSON at all (or is `null`) fails.
pub fn extract_token(body: &str, field: &str) -> Result<Token> {
    let json: Value = serde_json::from_str(body).context("response body is not valid JSON")?;

    let map = match json {
        Value::Null => return Err(anyhow!("cannot read '{}' from a null body", field)),
        Value::Object(map) => map,
        other => {
            warn!(field, body_type = json_type(&other), "csrf token response is not an object");
            return Ok(Token::Absent);
        }
    };

    let token = match map.get(field) {
        None => Token::Absent,
        Some(Value::Null) => Token::Unset,
        Some(Value::String(value)) => Token::Value(value.to_owned()),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Token::Value(value.to_string()),
        Some(other) => {
            warn!(field, value_type = json_type(other), "csrf token field is not a scalar");
            Token::Absent
        }
    };
    Ok(token)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
