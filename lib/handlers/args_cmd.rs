//! `args` command handler.

use crate::config::BuildConfig;
use crate::error::ManifestResult;
use crate::graph::BuildGraph;
use crate::manifest::{FixerArgs, MergerArgs, merger_args};
use crate::project::{ModuleDecl, Project};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{derive_module, register_module};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything derived for a single module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub module: String,

    /// Fixer flags and implicit inputs.
    pub fixer: FixerArgs,

    /// Merger arguments, when the module merges static library manifests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merger: Option<MergerArgs>,

    /// Manifest the module packages.
    pub output: PathBuf,

    /// Fully rendered commands, fixer first.
    pub commands: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Show the derived arguments of a module.
pub async fn show_args(
    module: String,
    project: Option<PathBuf>,
    json_output: bool,
) -> ManifestResult<()> {
    let project = Project::load_or_default_path(project.as_deref())?;
    let decl = project.module(&module)?;
    let report = module_report(&project.build, decl)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output_report(&report);
    }

    Ok(())
}

/// Derive a module's arguments and render its commands.
pub fn module_report(config: &BuildConfig, decl: &ModuleDecl) -> ManifestResult<ModuleReport> {
    let fixer = derive_module(config, decl)?;

    let contexts = decl.class_loader_contexts();
    let stage = decl.manifest_stage(&contexts);
    let merger = stage
        .merges()
        .then(|| merger_args(stage.static_lib_manifests, stage.fixer.is_library));

    let mut graph = BuildGraph::new();
    let output = register_module(config, decl, &mut graph, fixer.clone())?;

    let vars = config.rule_variables();
    let commands = graph
        .nodes()
        .iter()
        .map(|node| node.rule.render_command(node, &vars))
        .collect();

    Ok(ModuleReport {
        module: decl.name.clone(),
        fixer,
        merger,
        output,
        commands,
    })
}

fn output_report(report: &ModuleReport) {
    println!();
    println!("  {}", report.module.bold());
    println!();

    let flags = if report.fixer.args.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        report.fixer.joined()
    };
    println!("    {:<10} {}", "fixer".bright_cyan(), flags);

    for implicit in &report.fixer.implicits {
        println!("    {:<10} {}", "implicit".bright_cyan(), implicit.display());
    }

    if let Some(merger) = &report.merger {
        let args = [merger.args.as_str(), merger.libs.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        println!("    {:<10} {}", "merger".bright_cyan(), args);
    }

    println!(
        "    {:<10} {}",
        "output".bright_cyan(),
        report.output.display().to_string().bright_white()
    );
    println!();

    for command in &report.commands {
        println!("    {} {}", "$".dimmed(), command.dimmed());
    }
    println!();
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[build]
platform_sdk_version = 34
platform_sdk_codename = "VanillaIceCream"

[build.tools]
manifest_fixer = "bin/fixer"
manifest_merger = "bin/merger"

[[module]]
name = "Settings"
manifest = "Settings/AndroidManifest.xml"
sdk_version = "current"
min_sdk_version = "28"
uses_non_sdk_apis = true
static_lib_manifests = ["SettingsLib/AndroidManifest.xml"]

[[module]]
name = "Broken"
manifest = "Broken/AndroidManifest.xml"
sdk_version = "current"
min_sdk_version = "21"
use_embedded_native_libs = true
"#;

    #[test]
    fn test_module_report() {
        let project = Project::parse(PROJECT).unwrap();
        let report = module_report(&project.build, project.module("Settings").unwrap()).unwrap();

        assert_eq!(report.fixer.args[0], "--extract-native-libs=true");
        assert_eq!(report.fixer.args[1], "--uses-non-sdk-api");
        assert_eq!(
            report.merger.as_ref().unwrap().libs,
            "--libs SettingsLib/AndroidManifest.xml"
        );
        assert_eq!(
            report.output,
            PathBuf::from("out/soong/.intermediates/Settings/manifest_merger/AndroidManifest.xml")
        );

        assert_eq!(report.commands.len(), 2);
        assert!(report.commands[0].starts_with("bin/fixer --extract-native-libs=true"));
        assert!(report.commands[0].ends_with(
            "Settings/AndroidManifest.xml out/soong/.intermediates/Settings/manifest_fixer/AndroidManifest.xml"
        ));
        assert!(report.commands[1].starts_with("bin/merger --remove-tools-declarations --main"));
    }

    #[test]
    fn test_module_report_error_names_module() {
        let project = Project::parse(PROJECT).unwrap();
        let err = module_report(&project.build, project.module("Broken").unwrap()).unwrap_err();

        assert!(err.is_configuration_error());
        match err {
            ManifestError::Module { module, .. } => assert_eq!(module, "Broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_show_args_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest-rules.toml");
        std::fs::write(&path, PROJECT).unwrap();

        show_args("Settings".to_string(), Some(path.clone()), true)
            .await
            .unwrap();

        let result = show_args("Launcher3".to_string(), Some(path), true).await;
        assert!(matches!(result, Err(ManifestError::ModuleNotFound(_))));
    }
}
