//! Tool call data structures.
//!
//! A model asks for a capability by name with its arguments encoded as a
//! JSON string. `ToolCall` is the parsed form handed to the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capabilities::Arguments;

/// A request to invoke one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Capability name.
    pub name: String,
    /// Named arguments.
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolCall {
    /// Create a new `ToolCall`.
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Build a call from a model function call whose arguments arrive as a
    /// JSON string.
    ///
    /// Arguments that do not parse as a JSON object are replaced with an
    /// empty mapping; the capability's own validation then reports whatever
    /// is missing.
    pub fn from_function_call(name: impl Into<String>, raw_arguments: &str) -> Self {
        let name = name.into();
        let arguments = if raw_arguments.trim().is_empty() {
            Arguments::new()
        } else {
            match serde_json::from_str::<Value>(raw_arguments) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    log::warn!(
                        "Arguments for {} are not a JSON object ({}); using none",
                        name,
                        other
                    );
                    Arguments::new()
                }
                Err(e) => {
                    log::warn!("Error parsing JSON arguments for {}: {}", name, e);
                    Arguments::new()
                }
            }
        };

        Self { name, arguments }
    }
}
