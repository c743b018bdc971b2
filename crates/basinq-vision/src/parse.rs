//! Pulls the structure list out of a free-text model reply.

use serde_json::Value;

use crate::error::VisionError;

/// Parse the model's reply into a list of untyped structure records.
///
/// Accepts a bare JSON array, an object with a `structures` array, either of
/// those wrapped in a markdown code fence, or an array embedded in prose.
///
/// # Errors
///
/// Returns [`VisionError::EmptyResponse`] for blank replies and
/// [`VisionError::MalformedResponse`] when no structure list can be found.
pub fn extract_structures(content: &str) -> Result<Vec<Value>, VisionError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(VisionError::EmptyResponse);
    }

    let body = strip_code_fence(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return structures_from_value(value);
    }

    let embedded = match (body.find('['), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(VisionError::MalformedResponse {
                reason: "reply contains no JSON array".to_string(),
            })
        }
    };

    serde_json::from_str::<Value>(embedded)
        .map_err(|e| VisionError::MalformedResponse {
            reason: e.to_string(),
        })
        .and_then(structures_from_value)
}

fn structures_from_value(value: Value) -> Result<Vec<Value>, VisionError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("structures") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(VisionError::MalformedResponse {
                reason: "object reply has no 'structures' array".to_string(),
            }),
        },
        other => Err(VisionError::MalformedResponse {
            reason: format!("expected a JSON array, got {}", json_kind(&other)),
        }),
    }
}

/// Body of a markdown code fence, or the input unchanged.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let rest = rest.find('\n').map_or("", |i| &rest[i + 1..]);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
