//! Exposes the pipeline interpreter as a capability.

use serde_json::Value;

use crate::capabilities::{
    json_list, Arguments, Capability, CapabilityDescriptor, CapabilityError, CapabilityFactory,
    CapabilityResult,
};
use crate::dispatch::Dispatcher;
use crate::pipeline::{parse_pipeline, PipelineError, PipelineInterpreter};

/// Runs a pipeline against the registry it is registered in and returns
/// the result object as JSON text.
pub struct PipelineTool {
    descriptor: CapabilityDescriptor,
}

impl PipelineTool {
    pub const NAME: &'static str = "PipelineTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description(
                "Execute a pipeline of tool calls, passing earlier results into later steps.\n\
                 Reference the result of a step with an id as ${id} in any later argument. \
                 Example input: [{\"id\": \"files\", \"tool\": \"ShellTool\", \
                 \"parameters\": {\"input\": [{\"command\": \"ls\"}]}}, \
                 {\"tool\": \"GptTool\", \"parameters\": {\"input\": \
                 [{\"role\": \"user\", \"content\": \"Summarise: ${files}\"}]}}]",
            )
            .with_param(
                "input",
                "JSON list of steps, each {\"id\"?, \"tool\": <name>, \"parameters\": {...}}",
            )
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

impl Default for PipelineTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for PipelineTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let steps = json_list(args, "input")?;
        let context = parse_pipeline(&Value::Array(steps))
            .and_then(|steps| PipelineInterpreter::new(*dispatcher).run(&steps))
            .map_err(|e| match e {
                PipelineError::Malformed { reason } => CapabilityError::invalid("input", reason),
                other => CapabilityError::Execution(other.to_string()),
            })?;

        Ok(Value::String(serde_json::to_string(&context)?))
    }
}
