//! Pipeline step definitions and parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::PipelineError;
use crate::capabilities::Arguments;

/// One capability invocation in a pipeline.
///
/// Accepts `tool` for `capability` and `parameters` for `arguments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Result id; the result is discarded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "tool")]
    pub capability: String,
    #[serde(default, alias = "parameters")]
    pub arguments: Arguments,
}

impl PipelineStep {
    pub fn new(capability: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            id: None,
            capability: capability.into(),
            arguments,
        }
    }

    /// Builder method to set the result id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Id the result is stored under. A blank id counts as no id.
    pub fn result_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Parse a pipeline from JSON.
///
/// An array is a list of steps; a single object is a one-step pipeline.
pub fn parse_pipeline(value: &Value) -> Result<Vec<PipelineStep>, PipelineError> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::Object(_) => vec![value.clone()],
        other => {
            return Err(PipelineError::malformed(format!(
                "expected a list of steps, got {}",
                json_kind(other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(PipelineError::malformed(format!(
                    "step {} is {}, not an object",
                    index,
                    json_kind(&item)
                )));
            }
            serde_json::from_value::<PipelineStep>(item)
                .map_err(|e| PipelineError::malformed(format!("step {}: {}", index, e)))
        })
        .collect()
}

/// Parse a pipeline from JSON text.
pub fn parse_pipeline_str(text: &str) -> Result<Vec<PipelineStep>, PipelineError> {
    let value: Value = serde_json::from_str(text)?;
    parse_pipeline(&value)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_canonical_fields() {
        let steps = parse_pipeline(&json!([
            {"id": "r1", "capability": "Echo", "arguments": {"text": "hi"}},
            {"capability": "Echo", "arguments": {"text": "${r1}"}}
        ]))
        .unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].id.as_deref(), Some("r1"));
        assert_eq!(steps[1].id, None);
        assert_eq!(steps[1].arguments.get("text"), Some(&json!("${r1}")));
    }

    #[test]
    fn test_parse_alias_fields_and_single_object() {
        let steps =
            parse_pipeline_str(r#"{"tool": "ShellTool", "parameters": {"input": "[]"}, "id": "s"}"#)
                .unwrap();
        let arguments = json!({"input": "[]"}).as_object().cloned().unwrap();
        assert_eq!(steps, vec![PipelineStep::new("ShellTool", arguments).with_id("s")]);
    }

    #[test]
    fn test_missing_arguments_default_to_empty() {
        let steps = parse_pipeline(&json!([{"capability": "RegistryTool"}])).unwrap();
        assert!(steps[0].arguments.is_empty());
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            parse_pipeline(&json!("nope")),
            Err(PipelineError::Malformed { .. })
        ));
        assert!(matches!(
            parse_pipeline(&json!([1])),
            Err(PipelineError::Malformed { .. })
        ));
        assert!(matches!(
            parse_pipeline(&json!([{"id": "x"}])),
            Err(PipelineError::Malformed { .. })
        ));
        assert!(matches!(
            parse_pipeline_str("[{"),
            Err(PipelineError::Json(_))
        ));
    }

    #[test]
    fn test_blank_id_is_no_id() {
        let step = PipelineStep::new("Echo", Arguments::new());
        assert_eq!(step.clone().with_id("").result_id(), None);
        assert_eq!(step.clone().with_id("  ").result_id(), None);
        assert_eq!(step.with_id("r1").result_id(), Some("r1"));
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(parse_pipeline(&json!([])).unwrap().is_empty());
    }
}
