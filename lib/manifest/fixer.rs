//! Manifest fixer arguments and rule.

use crate::class_loader::ClassLoaderContextMap;
use crate::constants::{
    EXTRACT_NATIVE_LIBS_MIN_SDK, FRAMEWORK_RES_MODULE, FUTURE_API_LEVEL, MANIFEST_FILE,
    MANIFEST_FIXER_DIR, MTS_SUITE,
};
use crate::error::{ManifestError, ManifestResult};
use crate::graph::{BuildGraph, BuildParams};
use crate::module::{Module, ModuleContext};
use crate::sdk::SdkContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::MANIFEST_FIXER_RULE;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Module configuration the fixer arguments are derived from.
#[derive(Clone, Copy, Default)]
pub struct ManifestFixerParams<'a> {
    /// SDK constraints; without them no version flags are emitted.
    pub sdk_context: Option<&'a dyn SdkContext>,

    /// Library dependencies; only the implicit ones reach the fixer.
    pub class_loader_contexts: Option<&'a ClassLoaderContextMap>,

    pub is_library: bool,
    pub use_embedded_native_libs: bool,
    pub uses_non_sdk_apis: bool,
    pub use_embedded_dex: bool,
    pub has_no_code: bool,
    pub test_only: bool,
    pub logging_parent: Option<&'a str>,
}

/// Derived fixer flags and the files they make the node depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixerArgs {
    /// Flags in the order the fixer expects them.
    pub args: Vec<String>,

    /// Extra inputs read when the command runs.
    pub implicits: Vec<PathBuf>,
}

/// Version substituted by the API fingerprint.
struct ApiFingerprint {
    version: String,
    path: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FixerArgs {
    fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    fn push_pair(&mut self, flag: &str, value: impl Into<String>) {
        self.args.push(flag.to_string());
        self.args.push(value.into());
    }

    fn add_implicit(&mut self, path: &Path) {
        if !self.implicits.iter().any(|p| p == path) {
            self.implicits.push(path.to_path_buf());
        }
    }

    /// Flags as passed to the rule's `args` variable.
    pub fn joined(&self) -> String {
        self.args.join(" ")
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Whether a module is a test packaged into MTS.
///
/// Modules that are not tests are never included.
pub fn included_in_mts(module: &dyn Module) -> bool {
    module
        .as_test_suite_member()
        .is_some_and(|test| test.included_in_test_suite(MTS_SUITE))
}

/// Target SDK version passed to the fixer.
///
/// Modules targeting a preview get [`FUTURE_API_LEVEL`] when built unbundled
/// or run in MTS, so release builds can target APIs that are not finalized yet.
pub fn target_sdk_version_for_fixer(
    ctx: &ModuleContext<'_>,
    sdk_context: &dyn SdkContext,
) -> ManifestResult<String> {
    let config = ctx.config();
    let target_sdk = sdk_context.target_sdk_version(config);

    // TODO: decide how test APEXes targeting a preview should be versioned.
    if target_sdk.api_level.is_preview()
        && (config.unbundled_build_apps() || included_in_mts(ctx.module()))
    {
        return Ok(FUTURE_API_LEVEL.to_string());
    }

    target_sdk
        .effective_version_string(config)
        .map_err(ManifestError::InvalidTargetSdkVersion)
}

/// Derive the fixer flags of a module.
///
/// Flags are emitted in a fixed order the fixer relies on. Version resolution
/// failures and uncompressed native libraries below API 23 are fatal.
pub fn derive_fixer_args(
    ctx: &ModuleContext<'_>,
    params: &ManifestFixerParams<'_>,
) -> ManifestResult<FixerArgs> {
    let config = ctx.config();
    let mut fixer = FixerArgs::default();
    let min_sdk = params.sdk_context.map(|sdk| sdk.min_sdk_version(config));

    if params.is_library {
        fixer.push("--library");
    } else if let Some(min_sdk) = &min_sdk {
        let min_sdk = min_sdk
            .effective_version(config)
            .map_err(ManifestError::InvalidMinSdkVersion)?;

        if min_sdk.final_or_future_int() >= EXTRACT_NATIVE_LIBS_MIN_SDK {
            fixer.push(format!(
                "--extract-native-libs={}",
                !params.use_embedded_native_libs
            ));
        } else if params.use_embedded_native_libs {
            return Err(ManifestError::UncompressedNativeLibs { min_sdk });
        }
    }

    if params.uses_non_sdk_apis {
        fixer.push("--uses-non-sdk-api");
    }

    if params.use_embedded_dex {
        fixer.push("--use-embedded-dex");
    }

    if let Some(contexts) = params.class_loader_contexts {
        // Explicit uses_libs are already in the module's manifest.
        let (required, optional) = contexts.implicit_uses_libs();
        for lib in required {
            fixer.push_pair("--uses-library", lib);
        }
        for lib in optional {
            fixer.push_pair("--optional-uses-library", lib);
        }
    }

    if params.has_no_code {
        fixer.push("--has-no-code");
    }

    if params.test_only {
        fixer.push("--test-only");
    }

    if let Some(parent) = params.logging_parent.filter(|p| !p.is_empty()) {
        fixer.push_pair("--logging-parent", parent);
    }

    if let (Some(sdk_context), Some(min_sdk)) = (params.sdk_context, &min_sdk) {
        let fingerprint = api_fingerprint(ctx);

        let mut target_sdk_version = target_sdk_version_for_fixer(ctx, sdk_context)?;
        if let Some(fingerprint) = &fingerprint {
            target_sdk_version = fingerprint.version.clone();
            fixer.add_implicit(&fingerprint.path);
        }
        fixer.push_pair("--targetSdkVersion", target_sdk_version);

        let mut min_sdk_version = min_sdk
            .effective_version_string(config)
            .map_err(ManifestError::InvalidMinSdkVersion)?;
        if let Some(fingerprint) = &fingerprint {
            min_sdk_version = fingerprint.version.clone();
            fixer.add_implicit(&fingerprint.path);
        }
        fixer.push_pair("--minSdkVersion", min_sdk_version);
        fixer.push("--raise-min-sdk-version");
    }

    tracing::debug!(
        module = ctx.module_name(),
        args = %fixer.joined(),
        "derived manifest fixer args"
    );

    Ok(fixer)
}

/// Register the fixer node of a module with already derived flags.
///
/// Returns the fixed manifest path.
pub fn emit_manifest_fixer(
    ctx: &ModuleContext<'_>,
    graph: &mut BuildGraph,
    manifest: &Path,
    fixer: FixerArgs,
) -> ManifestResult<PathBuf> {
    let fixed_manifest = ctx.path_for_module_out(&[MANIFEST_FIXER_DIR, MANIFEST_FILE]);

    let mut args = BTreeMap::new();
    args.insert("args".to_string(), fixer.joined());

    graph.build(
        ctx.module_name(),
        BuildParams {
            rule: &MANIFEST_FIXER_RULE,
            description: "fix manifest".to_string(),
            input: manifest.to_path_buf(),
            implicits: fixer.implicits,
            output: fixed_manifest.clone(),
            args,
        },
    )?;

    Ok(fixed_manifest)
}

/// Derive the fixer flags of a module and register its fixer node.
///
/// Nothing is registered when derivation fails.
pub fn manifest_fixer(
    ctx: &ModuleContext<'_>,
    graph: &mut BuildGraph,
    manifest: &Path,
    params: &ManifestFixerParams<'_>,
) -> ManifestResult<PathBuf> {
    let fixer = derive_fixer_args(ctx, params)?;
    emit_manifest_fixer(ctx, graph, manifest, fixer)
}

/// Fingerprinted version of a module, when the build uses API fingerprints.
///
/// The version is only known once the fingerprint file is read by the shell
/// running the command, so the file becomes an input of the node.
fn api_fingerprint(ctx: &ModuleContext<'_>) -> Option<ApiFingerprint> {
    let config = ctx.config();
    if !config.use_api_fingerprint() || ctx.module_name() == FRAMEWORK_RES_MODULE {
        return None;
    }

    let path = config.api_fingerprint_path();
    Some(ApiFingerprint {
        version: format!(
            "{}.$$(cat {})",
            config.platform_sdk_codename,
            path.display()
        ),
        path,
    })
}
