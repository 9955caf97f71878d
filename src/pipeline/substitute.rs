//! `${id}` placeholder substitution.
//!
//! Tokens are matched whole, so `${a}` never matches inside `${ab}`. Every
//! token in a string is resolved in one left-to-right pass and the replaced
//! text is never rescanned.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::context::PipelineContext;
use super::error::PlaceholderError;

static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

/// Whether `text` contains at least one placeholder token.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_PATTERN.is_match(text)
}

/// Replace every placeholder in `text` with its context value.
///
/// String results are inserted trimmed; any other value is inserted as
/// compact JSON.
pub fn substitute_str(text: &str, context: &PipelineContext) -> Result<String, PlaceholderError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER_PATTERN.captures_iter(text) {
        let (Some(token), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = context.get(id.as_str()).ok_or_else(|| PlaceholderError {
            id: id.as_str().to_string(),
        })?;

        out.push_str(&text[last..token.start()]);
        match value {
            Value::String(s) => out.push_str(s.trim()),
            other => out.push_str(&other.to_string()),
        }
        last = token.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Substitute placeholders throughout an argument value.
///
/// Object values and array elements are visited recursively; numbers,
/// booleans, and nulls pass through unchanged. Object key order and array
/// element order are preserved.
pub fn substitute(value: &Value, context: &PipelineContext) -> Result<Value, PlaceholderError> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_str(s, context)?),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| substitute(v, context).map(|v| (k.clone(), v)))
                .collect::<Result<_, _>>()?,
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute(item, context))
                .collect::<Result<_, _>>()?,
        ),
        literal => literal.clone(),
    })
}
