//! Pipeline authoring errors.
//!
//! Tool failures never show up here; the dispatcher turns them into result
//! strings. These errors mean the pipeline itself is wrong.

use thiserror::Error;

/// A `${id}` token with no matching result in the context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unresolved placeholder '${{{id}}}'")]
pub struct PlaceholderError {
    /// The referenced id, without the `${` `}` delimiters.
    pub id: String,
}

/// Failure that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A step referenced an id that has not been produced yet.
    #[error("step {step} ({capability}) references unknown result '{id}'")]
    UnresolvedPlaceholder {
        /// Zero-based step index.
        step: usize,
        capability: String,
        id: String,
    },

    /// The step list could not be interpreted.
    #[error("malformed pipeline: {reason}")]
    Malformed { reason: String },

    #[error("invalid pipeline JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_error_shows_token() {
        let err = PlaceholderError { id: "missing".into() };
        assert_eq!(err.to_string(), "unresolved placeholder '${missing}'");
    }

    #[test]
    fn test_unresolved_names_step_and_id() {
        let err = PipelineError::UnresolvedPlaceholder {
            step: 2,
            capability: "Echo".into(),
            id: "r9".into(),
        };
        let text = err.to_string();
        assert!(text.contains("step 2"));
        assert!(text.contains("r9"));
    }
}
