//! Chat completion through the injected model.

use std::sync::Arc;

use serde_json::Value;

use crate::capabilities::{
    json_list, Arguments, Capability, CapabilityDescriptor, CapabilityError, CapabilityFactory,
    CapabilityResult,
};
use crate::dispatch::Dispatcher;
use crate::llm::{ChatMessage, ChatModel};

/// Sends a list of chat messages and returns the reply text.
pub struct GptTool {
    descriptor: CapabilityDescriptor,
    chat: Arc<dyn ChatModel>,
}

impl GptTool {
    pub const NAME: &'static str = "GptTool";

    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new(Self::NAME)
            .with_description(
                "Send messages to the configured chat model and return its reply.\n\
                 Example input: [{\"role\": \"user\", \"content\": \"What is 2+2?\"}]",
            )
            .with_param(
                "input",
                "JSON list of messages, each {\"role\": <role>, \"content\": <text>}",
            )
    }

    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self {
            descriptor: Self::descriptor(),
            chat,
        }
    }

    pub fn factory() -> CapabilityFactory {
        CapabilityFactory::new(Self::descriptor(), |services| {
            Ok(Box::new(Self::new(Arc::clone(&services.chat))) as Box<dyn Capability>)
        })
    }
}

impl Capability for GptTool {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, _dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        let messages = json_list(args, "input")?
            .into_iter()
            .map(serde_json::from_value::<ChatMessage>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CapabilityError::invalid("input", e.to_string()))?;

        if messages.is_empty() {
            return Err(CapabilityError::invalid("input", "no messages to send"));
        }

        log::debug!(
            "GptTool: sending {} message(s) to {}",
            messages.len(),
            self.chat.model()
        );
        let reply = self.chat.complete_blocking(&messages)?;
        Ok(Value::String(reply))
    }
}
