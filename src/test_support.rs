//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::capabilities::{
    optional_str, required_str, Arguments, Capability, CapabilityDescriptor, CapabilityError,
    CapabilityFactory, CapabilityResult, Services,
};
use crate::config::Settings;
use crate::dispatch::Dispatcher;
use crate::llm::{ChatMessage, ChatModel, LlmError};

/// Chat model that returns a canned reply and records every request.
pub struct StubChat {
    reply: Result<String, String>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for StubChat {
    fn model(&self) -> &str {
        "stub"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.reply.clone().map_err(LlmError::Decode)
    }
}

pub fn services() -> Services {
    services_with(Arc::new(StubChat::replying("stub reply")))
}

pub fn services_with(chat: Arc<dyn ChatModel>) -> Services {
    Services::with_chat(Settings::default(), chat)
}

pub fn args(value: Value) -> Arguments {
    value.as_object().cloned().unwrap()
}

/// Capability backed by a closure, for fixtures.
struct FnCapability<F> {
    descriptor: CapabilityDescriptor,
    run: F,
}

impl<F> Capability for FnCapability<F>
where
    F: Fn(&Arguments, &Dispatcher<'_>) -> CapabilityResult<Value> + Send + Sync,
{
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    fn invoke(&self, args: &Arguments, dispatcher: &Dispatcher<'_>) -> CapabilityResult<Value> {
        (self.run)(args, dispatcher)
    }
}

pub fn fn_factory<F>(descriptor: CapabilityDescriptor, run: F) -> CapabilityFactory
where
    F: Fn(&Arguments, &Dispatcher<'_>) -> CapabilityResult<Value> + Clone + Send + Sync + 'static,
{
    let built = descriptor.clone();
    CapabilityFactory::new(descriptor, move |_| {
        Ok(Box::new(FnCapability {
            descriptor: built.clone(),
            run: run.clone(),
        }) as Box<dyn Capability>)
    })
}

/// `Echo(text)` returns `text`.
pub fn echo_factory() -> CapabilityFactory {
    fn_factory(
        CapabilityDescriptor::new("Echo")
            .with_description("Return the input text unchanged.")
            .with_param("text", "Text to echo"),
        |args, _| Ok(Value::String(required_str(args, "text")?.to_string())),
    )
}

/// `Fail(reason?)` always errors.
pub fn failing_factory() -> CapabilityFactory {
    fn_factory(
        CapabilityDescriptor::new("Fail").with_optional_param("reason", "Failure message"),
        |args, _| {
            let reason = optional_str(args, "reason")?.unwrap_or("failed");
            Err(CapabilityError::Execution(reason.to_string()))
        },
    )
}

/// `Panic()` always panics with `kaboom`.
pub fn panicking_factory() -> CapabilityFactory {
    fn_factory(CapabilityDescriptor::new("Panic"), |_, _| panic!("kaboom"))
}

/// A capability that returns its own name.
pub fn stub_factory(name: &str, deps: &[&str]) -> CapabilityFactory {
    let returned = name.to_string();
    fn_factory(
        CapabilityDescriptor::new(name).depends_on(deps.iter().copied()),
        move |_, _| Ok(Value::String(returned.clone())),
    )
}
