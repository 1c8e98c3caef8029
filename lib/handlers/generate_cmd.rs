//! `generate` command handler.

use crate::config::BuildConfig;
use crate::constants::DEFAULT_NINJA_FILE;
use crate::error::{ManifestError, ManifestResult};
use crate::graph::{BuildGraph, write_ninja};
use crate::manifest::FixerArgs;
use crate::project::{ModuleDecl, Project};
use anyhow::Context;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::common::{derive_module, register_module};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Result of generating a project's graph.
#[derive(Debug)]
pub struct GenerateSummary {
    pub graph: BuildGraph,

    /// Manifest packaged by each module, in declaration order.
    pub outputs: Vec<(String, PathBuf)>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Generate the manifest rules of every module in a project.
pub async fn generate(
    project: Option<PathBuf>,
    output: Option<PathBuf>,
    json_output: bool,
) -> ManifestResult<()> {
    let project = Project::load_or_default_path(project.as_deref())?;
    let config = project.build.clone();
    let summary = generate_graph(project).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary.graph)?);
        return Ok(());
    }

    let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_NINJA_FILE));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let ninja = write_ninja(&summary.graph, &config.rule_variables());
    std::fs::write(&output, ninja)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!();
    for (module, manifest) in &summary.outputs {
        println!(
            "  {} {} {}",
            "✓".bright_green(),
            module.bold(),
            manifest.display().to_string().dimmed()
        );
    }
    println!();
    println!(
        "  Wrote {} nodes for {} modules to {}",
        summary.graph.len().to_string().bright_cyan(),
        summary.outputs.len().to_string().bright_cyan(),
        output.display().to_string().bright_white()
    );
    println!();

    Ok(())
}

/// Derive every module concurrently, then register them in declaration order.
///
/// Every failing module is reported before the whole generation fails, so the
/// graph is only returned when all modules succeed.
pub async fn generate_graph(project: Project) -> ManifestResult<GenerateSummary> {
    let config = Arc::new(project.build);
    let modules: Vec<Arc<ModuleDecl>> = project.modules.into_iter().map(Arc::new).collect();
    let derived = derive_all(&config, &modules).await?;

    let total = modules.len();
    let mut graph = BuildGraph::new();
    let mut outputs = Vec::with_capacity(total);
    let mut failed = 0;

    for (decl, fixer) in modules.iter().zip(derived) {
        match fixer.and_then(|fixer| register_module(&config, decl, &mut graph, fixer)) {
            Ok(manifest) => outputs.push((decl.name.clone(), manifest)),
            Err(err) => {
                failed += 1;
                report_failure(&err);
            }
        }
    }

    if failed > 0 {
        return Err(ManifestError::BuildFailed { failed, total });
    }

    tracing::debug!(modules = total, nodes = graph.len(), "generated build graph");

    Ok(GenerateSummary { graph, outputs })
}

/// Derive fixer flags for all modules, one blocking task each.
///
/// Results are returned in module order regardless of completion order.
async fn derive_all(
    config: &Arc<BuildConfig>,
    modules: &[Arc<ModuleDecl>],
) -> ManifestResult<Vec<ManifestResult<FixerArgs>>> {
    let mut tasks = JoinSet::new();
    for (index, decl) in modules.iter().enumerate() {
        let config = Arc::clone(config);
        let decl = Arc::clone(decl);
        tasks.spawn_blocking(move || (index, derive_module(&config, &decl)));
    }

    let mut results: Vec<Option<ManifestResult<FixerArgs>>> =
        std::iter::repeat_with(|| None).take(modules.len()).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined
            .map_err(|e| ManifestError::Generic(format!("derivation task failed: {}", e)))?;
        results[index] = Some(result);
    }

    Ok(results.into_iter().flatten().collect())
}

fn report_failure(err: &ManifestError) {
    tracing::warn!(error = %err, "module failed");

    let label = match err {
        ManifestError::Module { module, .. } => format!("error[{}]", module),
        _ => "error".to_string(),
    };
    let message = match err {
        ManifestError::Module { source, .. } => source.to_string(),
        other => other.to_string(),
    };
    println!("  {} {}", label.bright_red().bold(), message);
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[build]
platform_sdk_version = 34
platform_sdk_codename = "VanillaIceCream"
api_fingerprint = true

[[module]]
name = "Settings"
manifest = "Settings/AndroidManifest.xml"
sdk_version = "current"
min_sdk_version = "28"
static_lib_manifests = ["SettingsLib/AndroidManifest.xml"]

[[module]]
name = "SettingsLib"
kind = "library"
manifest = "SettingsLib/AndroidManifest.xml"

[[module]]
name = "framework-res"
manifest = "core/res/AndroidManifest.xml"
sdk_version = "current"
"#;

    const BROKEN: &str = r#"
[[module]]
name = "Good"
manifest = "Good/AndroidManifest.xml"

[[module]]
name = "Legacy"
manifest = "Legacy/AndroidManifest.xml"
sdk_version = "current"
min_sdk_version = "21"
use_embedded_native_libs = true

[[module]]
name = "Typo"
manifest = "Typo/AndroidManifest.xml"
sdk_version = "system_currnet"
"#;

    #[tokio::test]
    async fn test_generate_graph_in_declaration_order() {
        let summary = generate_graph(Project::parse(PROJECT).unwrap())
            .await
            .unwrap();

        let modules: Vec<&str> = summary
            .graph
            .nodes()
            .iter()
            .map(|node| node.module.as_str())
            .collect();
        assert_eq!(modules, vec!["Settings", "Settings", "SettingsLib", "framework-res"]);

        assert_eq!(summary.outputs.len(), 3);
        assert_eq!(
            summary.outputs[1].1,
            PathBuf::from("out/soong/.intermediates/SettingsLib/manifest_fixer/AndroidManifest.xml")
        );

        // Fingerprinting applies to every module except framework-res
        let settings = &summary.graph.nodes()[0];
        assert_eq!(
            settings.implicits,
            vec![PathBuf::from("out/soong/api_fingerprint.txt")]
        );
        let framework = &summary.graph.nodes()[3];
        assert!(framework.implicits.is_empty());
        assert!(framework.args["args"].contains("--targetSdkVersion VanillaIceCream"));
    }

    #[tokio::test]
    async fn test_generate_graph_reports_all_failures() {
        let result = generate_graph(Project::parse(BROKEN).unwrap()).await;
        assert!(matches!(
            result,
            Err(ManifestError::BuildFailed {
                failed: 2,
                total: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_generate_writes_ninja_file() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("manifest-rules.toml");
        let output = dir.path().join("out").join("build.manifest.ninja");
        std::fs::write(&project, PROJECT).unwrap();

        generate(Some(project), Some(output.clone()), false)
            .await
            .unwrap();

        let ninja = std::fs::read_to_string(&output).unwrap();
        assert_eq!(ninja.matches("rule manifestFixer\n").count(), 1);
        assert_eq!(ninja.matches("rule manifestMerger\n").count(), 1);
        assert_eq!(ninja.matches("\nbuild ").count(), 4);
        assert!(ninja.contains(
            "build out/soong/.intermediates/Settings/manifest_merger/AndroidManifest.xml: manifestMerger"
        ));
    }

    #[tokio::test]
    async fn test_generate_does_not_write_on_failure() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("manifest-rules.toml");
        let output = dir.path().join("build.manifest.ninja");
        std::fs::write(&project, BROKEN).unwrap();

        let result = generate(Some(project), Some(output.clone()), false).await;
        assert!(matches!(result, Err(ManifestError::BuildFailed { .. })));
        assert!(!output.exists());
    }
}
