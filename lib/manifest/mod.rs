//! Manifest fixer and merger rules.
//!
//! A module's manifest goes through two external tools before packaging:
//!
//! 1. the fixer, which injects SDK versions, `<uses-library>` entries and
//!    packaging attributes derived from the module's configuration;
//! 2. the merger, which folds the manifests of static library dependencies
//!    into the fixed manifest.
//!
//! Both stages are registered as [`BuildGraph`] nodes; nothing runs here.

mod fixer;
mod merger;


use crate::error::ManifestResult;
use crate::graph::{BuildGraph, Rule};
use crate::module::ModuleContext;
use std::path::{Path, PathBuf};

pub use fixer::{
    FixerArgs, ManifestFixerParams, derive_fixer_args, emit_manifest_fixer, included_in_mts,
    manifest_fixer, target_sdk_version_for_fixer,
};
pub use merger::{MergerArgs, join_with_prefix, manifest_merger, merger_args};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Fixer invocation: `<fixer> <args> <input> <output>`.
pub static MANIFEST_FIXER_RULE: Rule = Rule {
    name: "manifestFixer",
    command: "${config.ManifestFixerCmd} $args $in $out",
    command_deps: &["${config.ManifestFixerCmd}"],
    args: &["args"],
};

/// Merger invocation: `<merger> <args> --main <input> <libs> --out <output>`.
pub static MANIFEST_MERGER_RULE: Rule = Rule {
    name: "manifestMerger",
    command: "${config.ManifestMergerCmd} $args --main $in $libs --out $out",
    command_deps: &["${config.ManifestMergerCmd}"],
    args: &["args", "libs"],
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Inputs of a module's whole manifest preparation.
#[derive(Clone, Copy)]
pub struct ManifestStage<'a> {
    /// The module's own manifest.
    pub manifest: &'a Path,

    /// Fixer configuration.
    pub fixer: ManifestFixerParams<'a>,

    /// Manifests of static library dependencies, in dependency order.
    pub static_lib_manifests: &'a [PathBuf],

    /// Skip the merger even when static library manifests are present.
    pub dont_merge_manifests: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ManifestStage<'_> {
    /// Whether the merger runs after the fixer.
    pub fn merges(&self) -> bool {
        !self.static_lib_manifests.is_empty() && !self.dont_merge_manifests
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Register the fixer and, when needed, the merger for a module.
///
/// Returns the manifest the module should package.
pub fn prepare_manifest(
    ctx: &ModuleContext<'_>,
    graph: &mut BuildGraph,
    stage: &ManifestStage<'_>,
) -> ManifestResult<PathBuf> {
    let fixer_args = derive_fixer_args(ctx, &stage.fixer)?;
    emit_manifest_stage(ctx, graph, stage, fixer_args)
}

/// Register the nodes of a module whose fixer arguments are already derived.
pub fn emit_manifest_stage(
    ctx: &ModuleContext<'_>,
    graph: &mut BuildGraph,
    stage: &ManifestStage<'_>,
    fixer_args: FixerArgs,
) -> ManifestResult<PathBuf> {
    let fixed = emit_manifest_fixer(ctx, graph, stage.manifest, fixer_args)?;
    if !stage.merges() {
        return Ok(fixed);
    }

    manifest_merger(
        ctx,
        graph,
        &fixed,
        stage.static_lib_manifests,
        stage.fixer.is_library,
    )
}
