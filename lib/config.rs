//! Build configuration consumed by the manifest rules.
//!
//! Everything the derivation needs to know about the surrounding build (SDK
//! finality, platform codename, fingerprinting, tool locations) lives in
//! [`BuildConfig`], which is passed explicitly instead of being read from
//! ambient state.

use crate::constants::{
    API_FINGERPRINT_FILE, DEFAULT_MANIFEST_FIXER, DEFAULT_MANIFEST_MERGER, DEFAULT_OUT_DIR,
    INTERMEDIATES_DIR,
};
use crate::sdk::ApiLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Build-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Whether this is an unbundled build (no platform image).
    pub unbundled_build: bool,

    /// Apps requested by an unbundled apps build (TARGET_BUILD_APPS).
    pub unbundled_build_apps: Vec<String>,

    /// Integer level of the platform SDK being built.
    pub platform_sdk_version: u32,

    /// Codename of the platform SDK being built.
    pub platform_sdk_codename: String,

    /// Whether the platform SDK is finalized.
    pub platform_sdk_final: bool,

    /// Codenames of preview levels that are still active.
    pub platform_version_active_codenames: Vec<String>,

    /// Codenames that have been finalized, with their integer level.
    pub finalized_codenames: BTreeMap<String, u32>,

    /// Whether preview versions are replaced by an API fingerprint.
    pub api_fingerprint: bool,

    /// Output root.
    pub out_dir: PathBuf,

    /// External tool locations.
    pub tools: ToolPaths,
}

/// Locations of the external manifest tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    /// Manifest fixer executable.
    pub manifest_fixer: PathBuf,

    /// Manifest merger executable.
    pub manifest_merger: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl BuildConfig {
    /// Whether this build only produces the apps listed in TARGET_BUILD_APPS.
    pub fn unbundled_build_apps(&self) -> bool {
        !self.unbundled_build_apps.is_empty()
    }

    /// Whether preview versions should be substituted with the API fingerprint.
    ///
    /// Applies to bundled and unbundled builds alike.
    pub fn use_api_fingerprint(&self) -> bool {
        self.api_fingerprint
    }

    /// Path of the API fingerprint file.
    pub fn api_fingerprint_path(&self) -> PathBuf {
        self.out_dir.join(API_FINGERPRINT_FILE)
    }

    /// Default target SDK of apps built against "current".
    pub fn default_app_target_sdk(&self) -> ApiLevel {
        if self.platform_sdk_final {
            ApiLevel::Final(self.platform_sdk_version)
        } else {
            ApiLevel::Preview(self.platform_sdk_codename.clone())
        }
    }

    /// Whether a codename names a preview level of this build.
    pub fn is_active_codename(&self, codename: &str) -> bool {
        codename == self.platform_sdk_codename
            || self
                .platform_version_active_codenames
                .iter()
                .any(|c| c == codename)
    }

    /// Directory holding a module's outputs.
    pub fn module_out_dir(&self, module: &str) -> PathBuf {
        self.out_dir.join(INTERMEDIATES_DIR).join(module)
    }

    /// Variables referenced by rule templates as `${config.<name>}`.
    pub fn rule_variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert(
            "config.ManifestFixerCmd".to_string(),
            self.tools.manifest_fixer.display().to_string(),
        );
        vars.insert(
            "config.ManifestMergerCmd".to_string(),
            self.tools.manifest_merger.display().to_string(),
        );
        vars
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            unbundled_build: false,
            unbundled_build_apps: Vec::new(),
            platform_sdk_version: 35,
            platform_sdk_codename: "Baklava".to_string(),
            platform_sdk_final: false,
            platform_version_active_codenames: Vec::new(),
            finalized_codenames: BTreeMap::new(),
            api_fingerprint: false,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            tools: ToolPaths::default(),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            manifest_fixer: PathBuf::from(DEFAULT_MANIFEST_FIXER),
            manifest_merger: PathBuf::from(DEFAULT_MANIFEST_MERGER),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_target_sdk() {
        let mut config = BuildConfig::default();
        assert_eq!(
            config.default_app_target_sdk(),
            ApiLevel::Preview("Baklava".to_string())
        );

        config.platform_sdk_final = true;
        assert_eq!(config.default_app_target_sdk(), ApiLevel::Final(35));
    }

    #[test]
    fn test_use_api_fingerprint() {
        let mut config = BuildConfig {
            api_fingerprint: true,
            ..Default::default()
        };
        assert!(config.use_api_fingerprint());

        config.unbundled_build = true;
        assert!(config.use_api_fingerprint());

        config.api_fingerprint = false;
        assert!(!config.use_api_fingerprint());
    }

    #[test]
    fn test_active_codenames() {
        let config = BuildConfig {
            platform_version_active_codenames: vec!["VanillaIceCream".to_string()],
            ..Default::default()
        };
        assert!(config.is_active_codename("Baklava"));
        assert!(config.is_active_codename("VanillaIceCream"));
        assert!(!config.is_active_codename("Tiramisu"));
    }

    #[test]
    fn test_paths() {
        let config = BuildConfig::default();
        assert_eq!(
            config.api_fingerprint_path(),
            PathBuf::from("out/soong/api_fingerprint.txt")
        );
        assert_eq!(
            config.module_out_dir("Settings"),
            PathBuf::from("out/soong/.intermediates/Settings")
        );
    }

    #[test]
    fn test_parse_partial_config() {
        let config: BuildConfig = toml::from_str(
            r#"
            platform_sdk_version = 34
            platform_sdk_codename = "VanillaIceCream"
            unbundled_build_apps = ["Camera2"]

            [finalized_codenames]
            Tiramisu = 33
            UpsideDownCake = 34

            [tools]
            manifest_fixer = "bin/fixer"
            "#,
        )
        .unwrap();

        assert!(config.unbundled_build_apps());
        assert_eq!(config.finalized_codenames.get("Tiramisu"), Some(&33));
        assert_eq!(config.tools.manifest_fixer, PathBuf::from("bin/fixer"));
        assert_eq!(
            config.tools.manifest_merger,
            PathBuf::from(DEFAULT_MANIFEST_MERGER)
        );
        assert_eq!(config.out_dir, PathBuf::from(DEFAULT_OUT_DIR));
    }
}
