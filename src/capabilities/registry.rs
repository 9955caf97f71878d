//! Capability registry with two-phase loading of discovered capabilities.
//!
//! Loading happens once at process start:
//! 1. Every independent capability (no declared dependencies) is built.
//! 2. Each dependent capability, in discovery order, is built only if all of
//!    its dependencies are already registered.
//!
//! Resolution is a single pass. A dependent whose dependency is itself a
//! dependent loads only when discovery order happens to put the dependency
//! first; there is no retry and no topological sort.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use super::capability::{Capability, CapabilityFactory, CapabilitySource};
use super::error::RegistryError;
use super::services::Services;

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Factories partitioned by whether they declare dependencies.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Factories with no dependencies, in discovery order.
    pub independent: Vec<CapabilityFactory>,
    /// Factories with one or more dependencies, in discovery order.
    pub dependent: Vec<CapabilityFactory>,
    /// Factories rejected as malformed.
    pub rejected: Vec<SkippedCapability>,
}

/// Enumerate a source and partition it into independent and dependent
/// capabilities.
///
/// A factory with an empty name, a name with surrounding whitespace, or a
/// name that repeats an earlier factory is rejected with
/// [`RegistryError::Discovery`].
pub fn discover<S: CapabilitySource>(source: S) -> Discovered {
    let mut discovered = Discovered::default();
    let mut seen = HashSet::new();

    for factory in source.factories() {
        let name = factory.name().to_string();

        let malformed = if name.trim().is_empty() {
            Some("capability name is empty")
        } else if name.trim() != name {
            Some("capability name has surrounding whitespace")
        } else {
            None
        };
        if let Some(reason) = malformed {
            discovered.rejected.push(SkippedCapability::new(RegistryError::Discovery {
                name,
                reason: reason.to_string(),
            }));
            continue;
        }

        if !seen.insert(name.clone()) {
            discovered.rejected.push(SkippedCapability::new(RegistryError::Discovery {
                name,
                reason: "duplicate capability name".to_string(),
            }));
            continue;
        }

        if factory.descriptor().is_independent() {
            discovered.independent.push(factory);
        } else {
            discovered.dependent.push(factory);
        }
    }

    discovered
}

// ---------------------------------------------------------------------------
// Load report
// ---------------------------------------------------------------------------

/// A capability left out of the registry, with the reason.
#[derive(Debug)]
pub struct SkippedCapability {
    /// Capability name.
    pub name: String,
    /// Why it was excluded.
    pub reason: RegistryError,
}

impl SkippedCapability {
    fn new(reason: RegistryError) -> Self {
        let name = match &reason {
            RegistryError::Discovery { name, .. }
            | RegistryError::DependencyUnsatisfied { name, .. }
            | RegistryError::NotFound { name } => name.clone(),
        };
        Self { name, reason }
    }

    /// Missing dependency names, if this was a dependency failure.
    pub fn missing(&self) -> Option<&[String]> {
        match &self.reason {
            RegistryError::DependencyUnsatisfied { missing, .. } => Some(missing),
            _ => None,
        }
    }
}

/// Outcome of [`CapabilityRegistry::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of loaded capabilities, in registration order.
    pub loaded: Vec<String>,
    /// Capabilities that were excluded.
    pub skipped: Vec<SkippedCapability>,
}

impl LoadReport {
    /// Whether every discovered capability loaded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Look up the skip record for a capability.
    pub fn skipped(&self, name: &str) -> Option<&SkippedCapability> {
        self.skipped.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "loaded ({}): {}", self.loaded.len(), self.loaded.join(", "))?;
        for skipped in &self.skipped {
            writeln!(f, "skipped {}: {}", skipped.name, skipped.reason)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// In-memory collection of successfully loaded capabilities.
///
/// Iteration order is insertion order: independents first, then the
/// dependents that loaded, each group in discovery order. Entries are never
/// removed once added.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: IndexMap<String, Box<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and load every capability from `source`.
    ///
    /// Never fails as a whole: capabilities that cannot be built or whose
    /// dependencies are unsatisfied are excluded and listed in the report.
    pub fn load<S: CapabilitySource>(source: S, services: &Services) -> (Self, LoadReport) {
        let Discovered {
            independent,
            dependent,
            rejected,
        } = discover(source);

        let mut registry = Self::new();
        let mut report = LoadReport {
            loaded: Vec::new(),
            skipped: Vec::new(),
        };

        for skipped in rejected {
            log::error!("{}", skipped.reason);
            report.skipped.push(skipped);
        }

        for factory in independent {
            registry.instantiate(&factory, services, &mut report);
        }

        for factory in dependent {
            let missing: Vec<String> = factory
                .descriptor()
                .dependencies
                .iter()
                .filter(|dep| !registry.contains(dep))
                .cloned()
                .collect();

            if missing.is_empty() {
                registry.instantiate(&factory, services, &mut report);
            } else {
                let err = RegistryError::DependencyUnsatisfied {
                    name: factory.name().to_string(),
                    missing,
                };
                log::error!("{}", err);
                report.skipped.push(SkippedCapability::new(err));
            }
        }

        log::info!(
            "Loaded capabilities: [{}] ({} skipped)",
            report.loaded.join(", "),
            report.skipped.len(),
        );

        (registry, report)
    }

    fn instantiate(
        &mut self,
        factory: &CapabilityFactory,
        services: &Services,
        report: &mut LoadReport,
    ) {
        let name = factory.name().to_string();

        let capability = match factory.build(services) {
            Ok(capability) => capability,
            Err(e) => {
                let err = RegistryError::Discovery {
                    name,
                    reason: e.to_string(),
                };
                log::error!("{}", err);
                report.skipped.push(SkippedCapability::new(err));
                return;
            }
        };

        let mismatch = if capability.name() != name {
            Some(format!("constructor produced capability '{}'", capability.name()))
        } else if capability.descriptor().dependencies != factory.descriptor().dependencies {
            Some(format!(
                "constructor declared dependencies {:?}, expected {:?}",
                capability.descriptor().dependencies,
                factory.descriptor().dependencies
            ))
        } else {
            None
        };
        if let Some(reason) = mismatch {
            let err = RegistryError::Discovery { name, reason };
            log::error!("{}", err);
            report.skipped.push(SkippedCapability::new(err));
            return;
        }

        log::info!("Loaded capability '{}'", name);
        report.loaded.push(name.clone());
        self.entries.insert(name, capability);
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Result<&dyn Capability, RegistryError> {
        self.entries
            .get(name)
            .map(|c| c.as_ref())
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Whether a capability with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Registered capabilities, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Capability> {
        self.entries.values().map(|c| c.as_ref())
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no capabilities are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("entries", &self.names())
            .finish()
    }
}
