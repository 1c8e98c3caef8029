//! Module identity and optional module capabilities.

use crate::config::BuildConfig;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A module being built.
pub trait Module: Send + Sync {
    /// Module name, unique in the build.
    fn name(&self) -> &str;

    /// Test suite membership, for test modules only.
    fn as_test_suite_member(&self) -> Option<&dyn TestSuiteMembership> {
        None
    }
}

/// Capability of test modules to report the suites they are packaged into.
pub trait TestSuiteMembership {
    fn included_in_test_suite(&self, suite: &str) -> bool;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything a rule emitter may know about the module it emits for.
#[derive(Clone, Copy)]
pub struct ModuleContext<'a> {
    config: &'a BuildConfig,
    module: &'a dyn Module,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<'a> ModuleContext<'a> {
    pub fn new(config: &'a BuildConfig, module: &'a dyn Module) -> Self {
        Self { config, module }
    }

    pub fn config(&self) -> &'a BuildConfig {
        self.config
    }

    pub fn module(&self) -> &'a dyn Module {
        self.module
    }

    pub fn module_name(&self) -> &'a str {
        self.module.name()
    }

    /// Path under the module's output directory.
    pub fn path_for_module_out<P: AsRef<Path>>(&self, components: &[P]) -> PathBuf {
        let mut path = self.config.module_out_dir(self.module.name());
        for component in components {
            path.push(component);
        }
        path
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
