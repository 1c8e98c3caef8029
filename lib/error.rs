//! Error types for manifest-rules.

use thiserror::Error;

use crate::graph::GraphError;
use crate::sdk::{ApiLevel, SdkError};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Result type for manifest-rules operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Error type for manifest-rules operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Target SDK version could not be resolved.
    #[error("invalid targetSdkVersion: {0}")]
    InvalidTargetSdkVersion(SdkError),

    /// Min SDK version could not be resolved.
    #[error("invalid minSdkVersion: {0}")]
    InvalidMinSdkVersion(SdkError),

    /// Uncompressed native libraries requested below the supported API level.
    #[error(
        "module attempted to store uncompressed native libraries, but minSdkVersion={min_sdk} doesn't support it"
    )]
    UncompressedNativeLibs {
        /// The resolved min SDK level.
        min_sdk: ApiLevel,
    },

    /// An error attributed to a specific module.
    #[error("module {module:?}: {source}")]
    Module {
        module: String,
        #[source]
        source: Box<ManifestError>,
    },

    /// Build graph rejected a node.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Module not declared in the project.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// Project file not found.
    #[error("project file not found: {0}")]
    ProjectNotFound(std::path::PathBuf),

    /// One or more modules failed to derive their manifest rules.
    #[error("{failed} of {total} modules failed")]
    BuildFailed { failed: usize, total: usize },

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ManifestError {
    /// Attribute this error to a module.
    pub fn in_module(self, module: impl Into<String>) -> Self {
        ManifestError::Module {
            module: module.into(),
            source: Box::new(self),
        }
    }

    /// Whether this is a configuration error of the module itself, as opposed to
    /// an environment or graph failure.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            ManifestError::InvalidTargetSdkVersion(_)
            | ManifestError::InvalidMinSdkVersion(_)
            | ManifestError::UncompressedNativeLibs { .. } => true,
            ManifestError::Module { source, .. } => source.is_configuration_error(),
            _ => false,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<anyhow::Error> for ManifestError {
    fn from(err: anyhow::Error) -> Self {
        ManifestError::Generic(format!("{:#}", err))
    }
}
