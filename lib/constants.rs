//! Constants for manifest-rules.
//!
//! This module contains the reserved API levels, tool-owned output locations
//! and default file names shared by the derivation and the CLI.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// API level reported for anything that is not finalized yet.
pub const FUTURE_API_LEVEL: u32 = 10_000;

/// Name of the "current" preview level.
pub const CURRENT_CODENAME: &str = "current";

/// Lowest min SDK level that supports uncompressed native libraries in the APK.
pub const EXTRACT_NATIVE_LIBS_MIN_SDK: u32 = 23;

/// Platform resource module, which never gets fingerprinted versions.
pub const FRAMEWORK_RES_MODULE: &str = "framework-res";

/// Test suite whose members must stay testable on stable branches.
pub const MTS_SUITE: &str = "mts";

/// File name of every manifest produced by this stage.
pub const MANIFEST_FILE: &str = "AndroidManifest.xml";

/// Module-scoped output directory owned by the fixer rule.
pub const MANIFEST_FIXER_DIR: &str = "manifest_fixer";

/// Module-scoped output directory owned by the merger rule.
pub const MANIFEST_MERGER_DIR: &str = "manifest_merger";

/// Directory under the output root holding per-module outputs.
pub const INTERMEDIATES_DIR: &str = ".intermediates";

/// API fingerprint file name under the output root.
pub const API_FINGERPRINT_FILE: &str = "api_fingerprint.txt";

/// Default output root.
pub const DEFAULT_OUT_DIR: &str = "out/soong";

/// Default fixer executable.
pub const DEFAULT_MANIFEST_FIXER: &str = "build/soong/scripts/manifest_fixer.py";

/// Default merger executable.
pub const DEFAULT_MANIFEST_MERGER: &str = "out/host/linux-x86/bin/manifest-merger";

/// Default project file looked up by the CLI.
pub const DEFAULT_PROJECT_FILE: &str = "manifest-rules.toml";

/// Default Ninja file written by `generate`.
pub const DEFAULT_NINJA_FILE: &str = "build.manifest.ninja";
