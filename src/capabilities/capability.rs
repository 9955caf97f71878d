//! The capability contract the orchestrator relies on.
//!
//! A capability declares:
//! - a unique name
//! - the names of other capabilities it needs registered first
//! - an ordered parameter contract (description + required flag)
//!
//! and exposes a single `invoke` operation. Everything else about a
//! capability is opaque to the registry, dispatcher, and pipeline.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{CapabilityError, CapabilityResult};
use super::services::Services;
use crate::dispatch::Dispatcher;

/// Named arguments passed to a capability, in author order.
pub type Arguments = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Contract for a single named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Human-readable description shown to the model.
    pub description: String,
    /// Whether the caller must supply the parameter.
    pub required: bool,
}

/// Static metadata for one capability.
///
/// ```
/// use toolsmith::capabilities::CapabilityDescriptor;
///
/// let d = CapabilityDescriptor::new("CodeTool")
///     .with_description("Rewrite a file.\nLonger notes follow.")
///     .depends_on(["GptTool", "FileTool"])
///     .with_param("path", "File to rewrite")
///     .with_optional_param("instructions", "What to change");
///
/// assert!(!d.is_independent());
/// assert_eq!(d.summary(), "Rewrite a file.");
/// assert_eq!(d.required_params(), vec!["path"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Unique name within a registry.
    pub name: String,
    /// Contract text; the first line is the short description.
    #[serde(default)]
    pub description: String,
    /// Capabilities that must already be registered before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Parameters by name, in declaration order.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterSpec>,
}

impl CapabilityDescriptor {
    /// Create a descriptor with no description, dependencies, or parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            dependencies: Vec::new(),
            parameters: IndexMap::new(),
        }
    }

    /// Builder method to set the contract text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to declare dependencies. Duplicates are dropped.
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dep in dependencies {
            let dep = dep.into();
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        self
    }

    /// Builder method to add a required parameter.
    pub fn with_param(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.with_parameter(name, description, true)
    }

    /// Builder method to add an optional parameter.
    pub fn with_optional_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.with_parameter(name, description, false)
    }

    fn with_parameter(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.insert(
            name.into(),
            ParameterSpec {
                description: description.into(),
                required,
            },
        );
        self
    }

    /// Whether the capability declares no dependencies.
    pub fn is_independent(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// First line of the contract text, trimmed.
    pub fn summary(&self) -> &str {
        self.description.trim().lines().next().unwrap_or_default().trim()
    }

    /// Names of the required parameters, in declaration order.
    pub fn required_params(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Check that every required parameter is present in `args`.
    pub fn check_arguments(&self, args: &Arguments) -> CapabilityResult<()> {
        match self
            .required_params()
            .into_iter()
            .find(|name| !args.contains_key(*name))
        {
            Some(missing) => Err(CapabilityError::MissingArgument(missing.to_string())),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// A single named, invocable unit of functionality.
///
/// Implementations own whatever state they need (clients, settings) and
/// receive a [`Dispatcher`] so that a dependent capability can reach its
/// declared dependencies through the same error-containing chokepoint.
pub trait Capability: Send + Sync {
    /// Static contract for this capability.
    fn descriptor(&self) -> &CapabilityDescriptor;

    /// Run the capability.
    fn invoke(&self, args: &Arguments, dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value>;

    /// Unique name; defaults to the descriptor's.
    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

// ---------------------------------------------------------------------------
// Registration list
// ---------------------------------------------------------------------------

/// Constructor invoked once at load time.
pub type CapabilityConstructor =
    Box<dyn Fn(&Services) -> CapabilityResult<Box<dyn Capability>> + Send + Sync>;

/// A capability that has been discovered but not yet instantiated.
///
/// The descriptor is available before construction so the registry can
/// partition and check dependencies without building anything.
pub struct CapabilityFactory {
    descriptor: CapabilityDescriptor,
    constructor: CapabilityConstructor,
}

impl CapabilityFactory {
    /// Create a factory from a descriptor and constructor.
    pub fn new<F>(descriptor: CapabilityDescriptor, constructor: F) -> Self
    where
        F: Fn(&Services) -> CapabilityResult<Box<dyn Capability>> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            constructor: Box::new(constructor),
        }
    }

    /// The descriptor this factory will produce.
    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    /// Name of the capability this factory builds.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Instantiate the capability.
    pub fn build(&self, services: &Services) -> CapabilityResult<Box<dyn Capability>> {
        (self.constructor)(services)
    }
}

impl fmt::Debug for CapabilityFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityFactory")
            .field("name", &self.descriptor.name)
            .field("dependencies", &self.descriptor.dependencies)
            .finish()
    }
}

/// Anything that can enumerate capability factories.
pub trait CapabilitySource {
    /// Factories in discovery order.
    fn factories(self) -> Vec<CapabilityFactory>;
}

impl CapabilitySource for Vec<CapabilityFactory> {
    fn factories(self) -> Vec<CapabilityFactory> {
        self
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Fetch a string argument that must be present.
pub fn required_str<'a>(args: &'a Arguments, name: &str) -> CapabilityResult<&'a str> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(CapabilityError::invalid(
            name,
            format!("expected a string, got {}", other),
        )),
        None => Err(CapabilityError::MissingArgument(name.to_string())),
    }
}

/// Fetch an optional string argument.
pub fn optional_str<'a>(args: &'a Arguments, name: &str) -> CapabilityResult<Option<&'a str>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required_str(args, name).map(Some),
    }
}

/// Interpret an argument as a list of JSON values.
///
/// Accepts a JSON-encoded string or an already structured value. A single
/// object is treated as a one-element list.
pub fn json_list(args: &Arguments, name: &str) -> CapabilityResult<Vec<Value>> {
    let raw = args
        .get(name)
        .ok_or_else(|| CapabilityError::MissingArgument(name.to_string()))?;

    let parsed = match raw {
        Value::String(s) => serde_json::from_str(s).map_err(|e| {
            CapabilityError::invalid(name, format!("Invalid JSON input: {} ({})", s, e))
        })?,
        other => other.clone(),
    };

    Ok(match parsed {
        Value::Array(items) => items,
        other => vec![other],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_descriptor_defaults_independent() {
        let d = CapabilityDescriptor::new("ShellTool");
        assert!(d.is_independent());
        assert_eq!(d.summary(), "");
        assert!(d.required_params().is_empty());
    }

    #[test]
    fn test_depends_on_drops_duplicates() {
        let d = CapabilityDescriptor::new("X").depends_on(["A", "B", "A"]);
        assert_eq!(d.dependencies, vec!["A", "B"]);
    }

    #[test]
    fn test_parameters_keep_declaration_order() {
        let d = CapabilityDescriptor::new("X")
            .with_param("zeta", "last letter")
            .with_optional_param("alpha", "first letter")
            .with_param("mid", "middle");
        let names: Vec<&String> = d.parameters.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(d.required_params(), vec!["zeta", "mid"]);
    }

    #[test]
    fn test_summary_is_first_line() {
        let text = "\n  Run things.  \n\n  More detail here.\n";
        let d = CapabilityDescriptor::new("X").with_description(text);
        assert_eq!(d.summary(), "Run things.");
    }

    #[test]
    fn test_check_arguments_reports_first_missing() {
        let d = CapabilityDescriptor::new("X")
            .with_param("a", "")
            .with_param("b", "")
            .with_optional_param("c", "");
        assert!(d.check_arguments(&args(json!({"a": 1, "b": 2}))).is_ok());
        match d.check_arguments(&args(json!({"a": 1}))) {
            Err(CapabilityError::MissingArgument(name)) => assert_eq!(name, "b"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_required_str_type_mismatch() {
        let a = args(json!({"input": 5}));
        assert!(matches!(
            required_str(&a, "input"),
            Err(CapabilityError::InvalidArgument { .. })
        ));
        assert!(matches!(
            required_str(&a, "other"),
            Err(CapabilityError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_optional_str_null_is_none() {
        let a = args(json!({"x": null, "y": "v"}));
        assert_eq!(optional_str(&a, "x").unwrap(), None);
        assert_eq!(optional_str(&a, "y").unwrap(), Some("v"));
        assert_eq!(optional_str(&a, "z").unwrap(), None);
    }

    #[test]
    fn test_json_list_accepts_string_and_structure() {
        let from_str = args(json!({"input": "[{\"command\": \"ls\"}]"}));
        assert_eq!(json_list(&from_str, "input").unwrap().len(), 1);

        let single = args(json!({"input": {"command": "ls"}}));
        let list = json_list(&single, "input").unwrap();
        assert_eq!(list, vec![json!({"command": "ls"})]);

        let bad = args(json!({"input": "not json"}));
        let err = json_list(&bad, "input").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON input"));
    }
}
