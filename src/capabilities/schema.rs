//! Schema projection for an external model driver.
//!
//! Every call recomputes from the registry so the schema always reflects
//! what is currently loaded.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::capability::CapabilityDescriptor;
use super::registry::CapabilityRegistry;

/// Schema entry for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Always `"string"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Parameter description.
    pub description: String,
}

/// Machine-readable invocation schema for one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySchema {
    /// Capability name.
    pub name: String,
    /// First line of the contract text.
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: IndexMap<String, ParameterSchema>,
    /// Names of required parameters.
    pub required: Vec<String>,
}

impl CapabilitySchema {
    /// Project a descriptor into its schema.
    pub fn from_descriptor(descriptor: &CapabilityDescriptor) -> Self {
        let parameters = descriptor
            .parameters
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    ParameterSchema {
                        kind: "string".to_string(),
                        description: spec.description.clone(),
                    },
                )
            })
            .collect();

        Self {
            name: descriptor.name.clone(),
            description: descriptor.summary().to_string(),
            parameters,
            required: descriptor
                .required_params()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Wrap the schema in the chat-completions function tool envelope.
    pub fn to_function_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": self.parameters,
                    "required": self.required,
                }
            }
        })
    }
}

/// One schema per registered capability, in registry order.
pub fn project_all(registry: &CapabilityRegistry) -> Vec<CapabilitySchema> {
    registry
        .iter()
        .map(|capability| CapabilitySchema::from_descriptor(capability.descriptor()))
        .collect()
}

/// Function tool envelopes for every registered capability.
pub fn function_tools(registry: &CapabilityRegistry) -> Vec<Value> {
    project_all(registry)
        .iter()
        .map(CapabilitySchema::to_function_tool)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{echo_factory, services, stub_factory};

    #[test]
    fn test_schema_shape() {
        let descriptor = CapabilityDescriptor::new("ShellTool")
            .with_description("Run commands.\n\nLong form.")
            .with_param("input", "Commands as JSON")
            .with_optional_param("cwd", "Working directory");

        let value = serde_json::to_value(CapabilitySchema::from_descriptor(&descriptor)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "ShellTool",
                "description": "Run commands.",
                "parameters": {
                    "input": {"type": "string", "description": "Commands as JSON"},
                    "cwd": {"type": "string", "description": "Working directory"}
                },
                "required": ["input"]
            })
        );
    }

    #[test]
    fn test_parameter_order_survives_serialization() {
        let descriptor = CapabilityDescriptor::new("X")
            .with_param("zz", "")
            .with_param("aa", "");
        let text = serde_json::to_string(&CapabilitySchema::from_descriptor(&descriptor)).unwrap();
        assert!(text.find("\"zz\"").unwrap() < text.find("\"aa\"").unwrap());
    }

    #[test]
    fn test_project_all_follows_registry_order() {
        let (registry, _) = crate::capabilities::CapabilityRegistry::load(
            vec![
                stub_factory("Dependent", &["Echo"]),
                echo_factory(),
                stub_factory("Other", &[]),
                stub_factory("Broken", &["Missing"]),
            ],
            &services(),
        );
        let names: Vec<String> = project_all(&registry).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Echo", "Other", "Dependent"]);
    }

    #[test]
    fn test_function_tool_envelope() {
        let (registry, _) =
            crate::capabilities::CapabilityRegistry::load(vec![echo_factory()], &services());
        let tools = function_tools(&registry);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "Echo");
        assert_eq!(tools[0]["function"]["parameters"]["type"], "object");
        assert_eq!(tools[0]["function"]["parameters"]["required"], json!(["text"]));
        assert_eq!(
            tools[0]["function"]["parameters"]["properties"]["text"]["type"],
            "string"
        );
    }
}
