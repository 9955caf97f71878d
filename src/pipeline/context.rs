//! Accumulated step results for one pipeline run.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Results keyed by step id, in the order ids were first written.
///
/// Overwriting an id keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PipelineContext {
    results: IndexMap<String, Value>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result under `id`.
    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.results.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.results.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.results.contains_key(id)
    }

    /// Ids in first-occurrence order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The context as a JSON object, preserving id order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.results
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut ctx = PipelineContext::new();
        ctx.insert("b", json!("first"));
        ctx.insert("a", json!("second"));
        assert_eq!(
            serde_json::to_string(&ctx).unwrap(),
            r#"{"b":"first","a":"second"}"#
        );
        assert_eq!(ctx.to_json().to_string(), r#"{"b":"first","a":"second"}"#);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut ctx = PipelineContext::new();
        ctx.insert("x", json!(1));
        ctx.insert("y", json!(2));
        ctx.insert("x", json!(3));
        assert_eq!(ctx.ids().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(ctx.get("x"), Some(&json!(3)));
        assert_eq!(ctx.len(), 2);
    }
}
