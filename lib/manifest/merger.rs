//! Manifest merger arguments and rule.

use crate::constants::{MANIFEST_FILE, MANIFEST_MERGER_DIR};
use crate::error::ManifestResult;
use crate::graph::{BuildGraph, BuildParams};
use crate::module::ModuleContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::MANIFEST_MERGER_RULE;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Values of the merger rule's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergerArgs {
    /// Merge options.
    pub args: String,

    /// One `--libs <path>` per static library manifest.
    pub libs: String,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Prefix every item and join them with spaces.
pub fn join_with_prefix<I, S>(items: I, prefix: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("{}{}", prefix, item.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merger arguments for a module.
///
/// Tools declarations are only removed from application manifests, the way
/// Gradle's merger does it; libraries keep them for their consumers.
pub fn merger_args(static_lib_manifests: &[PathBuf], is_library: bool) -> MergerArgs {
    let args = if is_library {
        String::new()
    } else {
        "--remove-tools-declarations".to_string()
    };

    let libs = join_with_prefix(
        static_lib_manifests
            .iter()
            .map(|path| path.display().to_string()),
        "--libs ",
    );

    MergerArgs { args, libs }
}

/// Register the merger node of a module.
///
/// `manifest` is the module's fixed manifest; the static library manifests
/// become implicit inputs. Returns the merged manifest path.
pub fn manifest_merger(
    ctx: &ModuleContext<'_>,
    graph: &mut BuildGraph,
    manifest: &Path,
    static_lib_manifests: &[PathBuf],
    is_library: bool,
) -> ManifestResult<PathBuf> {
    let merged_manifest = ctx.path_for_module_out(&[MANIFEST_MERGER_DIR, MANIFEST_FILE]);
    let merger = merger_args(static_lib_manifests, is_library);

    let mut args = BTreeMap::new();
    args.insert("args".to_string(), merger.args);
    args.insert("libs".to_string(), merger.libs);

    graph.build(
        ctx.module_name(),
        BuildParams {
            rule: &MANIFEST_MERGER_RULE,
            description: "merge manifest".to_string(),
            input: manifest.to_path_buf(),
            implicits: static_lib_manifests.to_vec(),
            output: merged_manifest.clone(),
            args,
        },
    )?;

    Ok(merged_manifest)
}
