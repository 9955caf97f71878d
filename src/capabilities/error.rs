//! Capability and registry errors.

use thiserror::Error;

use crate::llm::LlmError;

/// Result type returned by every capability invocation.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Failure raised by a capability's own invocation.
///
/// The dispatcher converts every one of these into an error string, so a
/// failing capability never aborts the caller.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// A parameter declared `required` was not supplied.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// An argument was present but unusable.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// The capability ran but could not complete.
    #[error("{0}")]
    Execution(String),

    /// A dependency invoked through the dispatcher reported an error.
    #[error("dependency {name} failed: {detail}")]
    Dependency { name: String, detail: String },

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Language model call failed.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl CapabilityError {
    /// Shorthand for [`CapabilityError::InvalidArgument`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reported while discovering and loading capabilities.
///
/// None of these are fatal to the registry: the affected capability is
/// left out and the error is recorded in the load report.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A capability implementation could not be loaded at all.
    #[error("failed to load capability '{name}': {reason}")]
    Discovery { name: String, reason: String },

    /// A dependent capability's dependencies were not all registered.
    #[error("failed to load capability '{name}': missing dependencies {missing:?}")]
    DependencyUnsatisfied { name: String, missing: Vec<String> },

    /// No capability is registered under this name.
    #[error("capability not found: {name}")]
    NotFound { name: String },
}
