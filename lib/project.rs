//! Project files describing the modules to prepare.
//!
//! A project file is TOML with a `[build]` table holding the [`BuildConfig`]
//! and one `[[module]]` table per module:
//!
//! ```toml
//! [build]
//! platform_sdk_version = 34
//! platform_sdk_codename = "VanillaIceCream"
//!
//! [[module]]
//! name = "Settings"
//! manifest = "packages/apps/Settings/AndroidManifest.xml"
//! sdk_version = "current"
//! min_sdk_version = "28"
//! static_lib_manifests = ["out/SettingsLib/AndroidManifest.xml"]
//!
//! [[module.uses_libs]]
//! name = "androidx.window.extensions"
//! implicit = true
//! optional = true
//! ```

use crate::class_loader::{ANY_SDK_VERSION, ClassLoaderContext, ClassLoaderContextMap};
use crate::config::BuildConfig;
use crate::constants::DEFAULT_PROJECT_FILE;
use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{ManifestFixerParams, ManifestStage};
use crate::module::{Module, TestSuiteMembership};
use crate::sdk::{SdkContext, SdkSpec, SdkVersions};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A parsed project file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Build configuration.
    #[serde(default)]
    pub build: BuildConfig,

    /// Modules in declaration order.
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDecl>,
}

/// Kind of module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// An installable application.
    #[default]
    App,
    /// A static library packaged into apps.
    Library,
    /// An instrumentation test application.
    Test,
}

/// A module declared in a project file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDecl {
    pub name: String,

    #[serde(default)]
    pub kind: ModuleKind,

    /// The module's own manifest.
    pub manifest: PathBuf,

    /// SDK the module compiles against. Modules without any SDK
    /// declaration get no version flags.
    #[serde(default)]
    pub sdk_version: Option<String>,

    #[serde(default)]
    pub min_sdk_version: Option<String>,

    #[serde(default)]
    pub target_sdk_version: Option<String>,

    #[serde(default)]
    pub use_embedded_native_libs: bool,

    #[serde(default)]
    pub uses_non_sdk_apis: bool,

    #[serde(default)]
    pub use_embedded_dex: bool,

    #[serde(default)]
    pub has_no_code: bool,

    #[serde(default)]
    pub test_only: bool,

    #[serde(default)]
    pub logging_parent: Option<String>,

    /// Suites a test module is packaged into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_suites: Vec<String>,

    /// `<uses-library>` dependencies, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses_libs: Vec<UsesLibDecl>,

    /// Manifests of static library dependencies, in dependency order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_lib_manifests: Vec<PathBuf>,

    #[serde(default)]
    pub dont_merge_manifests: bool,
}

/// A `<uses-library>` dependency of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsesLibDecl {
    pub name: String,

    /// Inferred by the build rather than written by the module author.
    #[serde(default)]
    pub implicit: bool,

    #[serde(default)]
    pub optional: bool,

    /// Only added for apps targeting at most this SDK version.
    #[serde(default)]
    pub sdk_version: Option<i32>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Project {
    /// Parse a project from TOML.
    pub fn parse(content: &str) -> ManifestResult<Self> {
        let project: Project = toml::from_str(content)?;
        project.check_unique_names()?;
        Ok(project)
    }

    /// Load a project file.
    ///
    /// Relative module paths stay relative to the working directory, like the
    /// paths of the build that consumes the generated graph.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        if !path.exists() {
            return Err(ManifestError::ProjectNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let project = Self::parse(&content)?;

        tracing::debug!(
            path = %path.display(),
            modules = project.modules.len(),
            "loaded project"
        );

        Ok(project)
    }

    /// Load the project at `path`, or the default project file.
    pub fn load_or_default_path(path: Option<&Path>) -> ManifestResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(Path::new(DEFAULT_PROJECT_FILE)),
        }
    }

    pub fn module(&self, name: &str) -> ManifestResult<&ModuleDecl> {
        self.modules
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ManifestError::ModuleNotFound(name.to_string()))
    }

    fn check_unique_names(&self) -> ManifestResult<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if !seen.insert(module.name.as_str()) {
                return Err(ManifestError::Generic(format!(
                    "module {:?} is declared more than once",
                    module.name
                )));
            }
        }
        Ok(())
    }
}

impl ModuleDecl {
    pub fn is_library(&self) -> bool {
        self.kind == ModuleKind::Library
    }

    /// Whether the module declares any SDK version.
    pub fn declares_sdk(&self) -> bool {
        self.sdk_version.is_some()
            || self.min_sdk_version.is_some()
            || self.target_sdk_version.is_some()
    }

    fn sdk_versions(&self) -> SdkVersions {
        SdkVersions {
            sdk_version: self.sdk_version.clone().unwrap_or_default(),
            min_sdk_version: self.min_sdk_version.clone(),
            target_sdk_version: self.target_sdk_version.clone(),
        }
    }

    /// Class loader contexts built from the declared `uses_libs`.
    pub fn class_loader_contexts(&self) -> ClassLoaderContextMap {
        let mut contexts = ClassLoaderContextMap::new();
        for lib in &self.uses_libs {
            contexts.add_context(
                lib.sdk_version.unwrap_or(ANY_SDK_VERSION),
                ClassLoaderContext::new(&lib.name, lib.implicit, lib.optional),
            );
        }
        contexts
    }

    /// Fixer parameters of the module.
    pub fn fixer_params<'a>(
        &'a self,
        contexts: &'a ClassLoaderContextMap,
    ) -> ManifestFixerParams<'a> {
        ManifestFixerParams {
            sdk_context: self.declares_sdk().then_some(self as &dyn SdkContext),
            class_loader_contexts: (!self.uses_libs.is_empty()).then_some(contexts),
            is_library: self.is_library(),
            use_embedded_native_libs: self.use_embedded_native_libs,
            uses_non_sdk_apis: self.uses_non_sdk_apis,
            use_embedded_dex: self.use_embedded_dex,
            has_no_code: self.has_no_code,
            test_only: self.test_only,
            logging_parent: self.logging_parent.as_deref(),
        }
    }

    /// Whole manifest stage of the module.
    pub fn manifest_stage<'a>(&'a self, contexts: &'a ClassLoaderContextMap) -> ManifestStage<'a> {
        ManifestStage {
            manifest: &self.manifest,
            fixer: self.fixer_params(contexts),
            static_lib_manifests: &self.static_lib_manifests,
            dont_merge_manifests: self.dont_merge_manifests,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Module for ModuleDecl {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_test_suite_member(&self) -> Option<&dyn TestSuiteMembership> {
        match self.kind {
            ModuleKind::Test => Some(self),
            _ => None,
        }
    }
}

impl SdkContext for ModuleDecl {
    fn sdk_version(&self, config: &BuildConfig) -> SdkSpec {
        self.sdk_versions().sdk_version(config)
    }

    fn min_sdk_version(&self, config: &BuildConfig) -> SdkSpec {
        self.sdk_versions().min_sdk_version(config)
    }

    fn target_sdk_version(&self, config: &BuildConfig) -> SdkSpec {
        self.sdk_versions().target_sdk_version(config)
    }
}

impl TestSuiteMembership for ModuleDecl {
    fn included_in_test_suite(&self, suite: &str) -> bool {
        self.test_suites.iter().any(|s| s == suite)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
