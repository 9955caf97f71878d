//! Introspection of the loaded registry.

use serde_json::Value;

use crate::capabilities::{
    optional_str, project_all, Arguments, Capability, CapabilityDescriptor, CapabilityFactory,
    CapabilityResult,
};
use crate::dispatch::Dispatcher;

/// Returns the schema of every registered capability.
pub struct RegistryTool {
    descriptor: CapabilityDescriptor,
}

impl RegistryTool {
    pub const NAME: &'static str = "RegistryTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description("List every loaded tool with its parameters.")
            .with_optional_param("name", "Only describe the tool with this name")
    }

    pub fn new() -> Self {
        Self {
            descriptor: Self::descriptor(),
        }
    }

    pub fn factory() -> CapabilityFactory {
        CapabilityFactory::new(Self::descriptor(), |_| {
            Ok(Box::new(Self::new()) as Box<dyn Capability>)
        })
    }
}

impl Default for RegistryTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for RegistryTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let only = optional_str(args, "name")?;
        let schemas: Vec<_> = project_all(dispatcher.registry())
            .into_iter()
            .filter(|s| only.map_or(true, |name| s.name == name))
            .collect();
        Ok(serde_json::to_value(schemas)?)
    }
}
