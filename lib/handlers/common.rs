//! Helpers shared by the command handlers.

use crate::config::BuildConfig;
use crate::error::ManifestResult;
use crate::graph::BuildGraph;
use crate::manifest::{FixerArgs, derive_fixer_args, emit_manifest_stage};
use crate::module::ModuleContext;
use crate::project::ModuleDecl;
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Derive the fixer flags of a declared module.
///
/// Errors are attributed to the module.
pub fn derive_module(config: &BuildConfig, decl: &ModuleDecl) -> ManifestResult<FixerArgs> {
    let ctx = ModuleContext::new(config, decl);
    let contexts = decl.class_loader_contexts();
    derive_fixer_args(&ctx, &decl.fixer_params(&contexts)).map_err(|e| e.in_module(&decl.name))
}

/// Register the manifest nodes of a declared module with derived fixer flags.
///
/// Returns the manifest the module packages.
pub fn register_module(
    config: &BuildConfig,
    decl: &ModuleDecl,
    graph: &mut BuildGraph,
    fixer: FixerArgs,
) -> ManifestResult<PathBuf> {
    let ctx = ModuleContext::new(config, decl);
    let contexts = decl.class_loader_contexts();
    emit_manifest_stage(&ctx, graph, &decl.manifest_stage(&contexts), fixer)
        .map_err(|e| e.in_module(&decl.name))
}
