//! # Dispatcher
//!
//! The single chokepoint through which every capability runs. Both direct
//! callers and the pipeline interpreter go through [`Dispatcher`], so
//! failure handling is uniform: a missing capability, a capability error,
//! or a capability panic all come back as a [`DispatchError`] (or, from
//! [`Dispatcher::invoke`], as an error string), never as an unwind.

pub mod tool_call;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use thiserror::Error;

use crate::capabilities::{Arguments, CapabilityError, CapabilityRegistry};

pub use tool_call::ToolCall;

/// Prefix carried by every dispatch error string.
pub const ERROR_MARKER: &str = "Error executing";

/// Failure of a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No capability is registered under the requested name.
    #[error("Error executing {name}: no capability named '{name}' is registered")]
    NotFound { name: String },

    /// The capability returned an error.
    #[error("Error executing {name}: {source}")]
    Execution {
        name: String,
        #[source]
        source: CapabilityError,
    },

    /// The capability panicked.
    #[error("Error executing {name}: panicked: {message}")]
    Panicked { name: String, message: String },
}

impl DispatchError {
    /// Name of the capability the dispatch targeted.
    pub fn capability(&self) -> &str {
        match self {
            Self::NotFound { name }
            | Self::Execution { name, .. }
            | Self::Panicked { name, .. } => name,
        }
    }
}

/// Looks up capabilities by name and invokes them with uniform error
/// containment.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> Dispatcher<'r> {
    /// Create a dispatcher over a loaded registry.
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher reads from.
    pub fn registry(&self) -> &'r CapabilityRegistry {
        self.registry
    }

    /// Invoke a capability, returning its result or a contained failure.
    pub fn try_invoke(&self, name: &str, args: &Arguments) -> Result<Value, DispatchError> {
        let capability = self.registry.get(name).map_err(|_| {
            log::warn!("Dispatch: no capability named '{}'", name);
            DispatchError::NotFound {
                name: name.to_string(),
            }
        })?;

        log::debug!(
            "Dispatch: invoking {} with {} argument(s)",
            name,
            args.len()
        );

        if let Err(source) = capability.descriptor().check_arguments(args) {
            return Err(execution_failed(name, source));
        }

        match panic::catch_unwind(AssertUnwindSafe(|| capability.invoke(args, self))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(execution_failed(name, source)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("Dispatch: {} panicked: {}", name, message);
                Err(DispatchError::Panicked {
                    name: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Invoke a capability; any failure becomes an error string result.
    pub fn invoke(&self, name: &str, args: &Arguments) -> Value {
        self.try_invoke(name, args)
            .unwrap_or_else(|e| Value::String(e.to_string()))
    }

    /// Invoke a parsed tool call.
    pub fn invoke_call(&self, call: &ToolCall) -> Value {
        self.invoke(&call.name, &call.arguments)
    }
}

/// Whether a result value is a dispatch error string.
pub fn is_error_result(value: &Value) -> bool {
    value
        .as_str()
        .map_or(false, |s| s.starts_with(ERROR_MARKER))
}

/// Render a result as the text content of a tool message.
///
/// `null` renders as `"None"`, strings render unquoted, everything else as
/// compact JSON.
pub fn render_result(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn execution_failed(name: &str, source: CapabilityError) -> DispatchError {
    log::warn!("Dispatch: {} failed: {}", name, source);
    DispatchError::Execution {
        name: name.to_string(),
        source,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
