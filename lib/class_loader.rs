//! Class loader contexts of a module.
//!
//! A module's `<uses-library>` dependencies are tracked per SDK version: some
//! libraries are only added for apps targeting an old SDK (compatibility
//! libraries), while [`ANY_SDK_VERSION`] holds the unconditional ones. Each entry
//! records whether the build inferred it (implicit) or the module author
//! declared it (explicit), and whether it is optional at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Key of dependencies that apply regardless of the target SDK.
pub const ANY_SDK_VERSION: i32 = -1;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A library in a class loader context, with its own dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLoaderContext {
    /// Library name as it appears in `<uses-library>`.
    pub name: String,

    /// Inferred by the build rather than declared by the module.
    #[serde(default)]
    pub implicit: bool,

    /// The app can run without it.
    #[serde(default)]
    pub optional: bool,

    /// Libraries loaded by this library's class loader.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcontexts: Vec<ClassLoaderContext>,
}

/// Class loader contexts keyed by SDK version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLoaderContextMap(BTreeMap<i32, Vec<ClassLoaderContext>>);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ClassLoaderContext {
    pub fn new(name: impl Into<String>, implicit: bool, optional: bool) -> Self {
        Self {
            name: name.into(),
            implicit,
            optional,
            subcontexts: Vec::new(),
        }
    }
}

impl ClassLoaderContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library under an SDK version.
    ///
    /// A library already present under the same version is kept as first
    /// declared; returns false in that case.
    pub fn add_context(&mut self, sdk_version: i32, context: ClassLoaderContext) -> bool {
        let contexts = self.0.entry(sdk_version).or_default();
        if contexts.iter().any(|c| c.name == context.name) {
            tracing::debug!(
                library = %context.name,
                sdk_version,
                "ignoring duplicate class loader context"
            );
            return false;
        }
        contexts.push(context);
        true
    }

    /// Contexts added under an SDK version, in declaration order.
    pub fn contexts(&self, sdk_version: i32) -> &[ClassLoaderContext] {
        self.0.get(&sdk_version).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Unconditional libraries inferred by the build, split into required and
    /// optional ones, each in declaration order.
    ///
    /// Explicitly declared libraries are left out: the module's own manifest
    /// already lists them.
    pub fn implicit_uses_libs(&self) -> (Vec<String>, Vec<String>) {
        let mut required = Vec::new();
        let mut optional = Vec::new();

        for context in self.contexts(ANY_SDK_VERSION).iter().filter(|c| c.implicit) {
            if context.optional {
                optional.push(context.name.clone());
            } else {
                required.push(context.name.clone());
            }
        }

        (required, optional)
    }

    /// Every library name across all SDK versions, including subcontexts.
    pub fn all_library_names(&self) -> Vec<String> {
        fn collect(contexts: &[ClassLoaderContext], names: &mut Vec<String>) {
            for context in contexts {
                if !names.contains(&context.name) {
                    names.push(context.name.clone());
                }
                collect(&context.subcontexts, names);
            }
        }

        let mut names = Vec::new();
        for contexts in self.0.values() {
            collect(contexts, &mut names);
        }
        names
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
