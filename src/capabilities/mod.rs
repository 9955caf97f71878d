//! # Capabilities
//!
//! The capability layer of the orchestrator:
//!
//! - [`Capability`] / [`CapabilityDescriptor`]: the invocation contract every
//!   tool supplies directly (name, dependencies, parameters).
//! - [`CapabilityRegistry`]: discovers capability factories, loads the
//!   independent ones, then the dependent ones whose dependencies are
//!   already present, and reports the rest.
//! - [`schema`]: projects each registered capability into the JSON schema
//!   handed to a language-model driver.
//!
//! ## Load Flow
//!
//! 1. A [`CapabilitySource`] yields [`CapabilityFactory`] values in
//!    discovery order.
//! 2. [`registry::discover`] partitions them into independent and dependent.
//! 3. [`CapabilityRegistry::load`] builds independents, then dependents in a
//!    single pass, returning the registry and a [`LoadReport`].
//! 4. The registry is read-only from then on.

pub mod capability;
pub mod error;
pub mod registry;
pub mod schema;
pub mod services;

pub use capability::{
    json_list, optional_str, required_str, Arguments, Capability, CapabilityDescriptor,
    CapabilityFactory, CapabilitySource, ParameterSpec,
};
pub use error::{CapabilityError, CapabilityResult, RegistryError};
pub use registry::{discover, CapabilityRegistry, Discovered, LoadReport, SkippedCapability};
pub use schema::{function_tools, project_all, CapabilitySchema, ParameterSchema};
pub use services::Services;
