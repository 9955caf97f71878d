//! # Pipeline
//!
//! Ordered capability invocations where later steps reference earlier
//! results through `${id}` placeholders.
//!
//! ```
//! use serde_json::json;
//! use toolsmith::pipeline::{parse_pipeline, substitute, PipelineContext};
//!
//! let steps = parse_pipeline(&json!([
//!     {"id": "r1", "capability": "Echo", "arguments": {"text": "hi"}},
//! ]))
//! .unwrap();
//! assert_eq!(steps[0].capability, "Echo");
//!
//! let mut ctx = PipelineContext::new();
//! ctx.insert("r1", json!("hi"));
//! assert_eq!(substitute(&json!("${r1} there"), &ctx).unwrap(), json!("hi there"));
//! ```

pub mod context;
pub mod error;
pub mod interpreter;
pub mod step;
pub mod substitute;

pub use context::PipelineContext;
pub use error::{PipelineError, PlaceholderError};
pub use interpreter::PipelineInterpreter;
pub use step::{parse_pipeline, parse_pipeline_str, PipelineStep};
pub use substitute::{has_placeholders, substitute, substitute_str};
