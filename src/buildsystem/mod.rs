//! Build system capability interface
//!
//! A build system answers two questions about a directory: is it an app, and
//! which targets does it declare support for. One implementation exists per
//! [`BuildSystemId`]; the id is resolved once at the entry point.

use crate::app::BuildSystemId;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub mod cmake;

pub use cmake::CMakeBuildSystem;

pub trait BuildSystem: Send + Sync {
    fn id(&self) -> BuildSystemId;

    /// Whether `directory` carries the metadata this build system requires.
    /// Read failures count as "not an app".
    fn is_app(&self, directory: &Path) -> bool;

    /// Targets the app in `directory` declares support for
    fn enabled_targets(&self, directory: &Path) -> Vec<String>;
}

pub struct BuildSystemRegistry {
    build_systems: HashMap<BuildSystemId, Arc<dyn BuildSystem>>,
}

impl BuildSystemRegistry {
    pub fn new() -> Self {
        Self {
            build_systems: HashMap::new(),
        }
    }

    /// Registry with every known build system, `default_targets` used by
    /// apps that declare none.
    pub fn with_defaults(default_targets: &[String]) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CMakeBuildSystem::new(default_targets.to_vec())));
        registry
    }

    pub fn register(&mut self, build_system: Arc<dyn BuildSystem>) {
        self.build_systems.insert(build_system.id(), build_system);
    }

    pub fn get(&self, id: BuildSystemId) -> Option<Arc<dyn BuildSystem>> {
        self.build_systems.get(&id).cloned()
    }
}

impl Default for BuildSystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
