//! # toolsmith
//!
//! A tool orchestration engine: a registry of pluggable capabilities with
//! dependency-aware loading, a schema projection for language-model
//! drivers, a dispatcher that contains every failure, and a pipeline
//! interpreter that threads results between steps via `${id}` placeholders.
//!
//! ```
//! use toolsmith::capabilities::{CapabilityRegistry, Services};
//! use toolsmith::config::Settings;
//! use toolsmith::dispatch::Dispatcher;
//! use toolsmith::tools::Builtins;
//!
//! let services = Services::from_settings(Settings::default()).unwrap();
//! let (registry, report) = CapabilityRegistry::load(Builtins, &services);
//! assert!(report.is_complete());
//!
//! let dispatcher = Dispatcher::new(&registry);
//! let out = dispatcher.invoke("Nope", &Default::default());
//! assert!(out.as_str().unwrap().starts_with("Error executing Nope"));
//! ```

pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod llm;
pub mod pipeline;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use capabilities::{Capability, CapabilityDescriptor, CapabilityRegistry, Services};
pub use config::Settings;
pub use dispatch::{DispatchError, Dispatcher};
pub use pipeline::{PipelineContext, PipelineError, PipelineInterpreter, PipelineStep};
