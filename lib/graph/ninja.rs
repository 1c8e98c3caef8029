//! Ninja serialization of a build graph.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use super::BuildGraph;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const HEADER: &str = "# Generated by manifest-rules. Do not edit.\n";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Render a graph as a Ninja file.
///
/// `vars` become top-level bindings so rule commands can reference them as
/// `${name}`. Argument values are written as-is: they are already Ninja
/// values (`$$` for a literal `$`).
pub fn write_ninja(graph: &BuildGraph, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for (name, value) in vars {
        let _ = writeln!(out, "{} = {}", name, value);
    }
    if !vars.is_empty() {
        out.push('\n');
    }

    for rule in graph.rules() {
        let _ = writeln!(out, "rule {}", rule.name);
        let _ = writeln!(out, "  command = {}", rule.command);
        let _ = writeln!(out, "  description = $desc");
        out.push('\n');
    }

    for node in graph.nodes() {
        let _ = write!(
            out,
            "build {}: {} {}",
            escape_path(&node.output),
            node.rule.name,
            escape_path(&node.input)
        );

        let implicits: Vec<String> = node
            .implicits
            .iter()
            .map(|path| escape_path(path))
            .chain(node.rule.command_deps.iter().map(|dep| dep.to_string()))
            .collect();
        if !implicits.is_empty() {
            let _ = write!(out, " | {}", implicits.join(" "));
        }
        out.push('\n');

        let _ = writeln!(out, "  desc = {} {}", node.description, node.module);
        for (name, value) in &node.args {
            if value.is_empty() {
                let _ = writeln!(out, "  {} =", name);
            } else {
                let _ = writeln!(out, "  {} = {}", name, value);
            }
        }
        out.push('\n');
    }

    out
}

/// Escape a path for use in a `build` statement.
pub fn escape_path(path: &Path) -> String {
    let raw = path.display().to_string();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '$' | ' ' | ':' => {
                escaped.push('$');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BuildParams, Rule};
    use std::path::PathBuf;

    static TOOL_RULE: Rule = Rule {
        name: "tool",
        command: "${config.Tool} $args $in $out",
        command_deps: &["${config.Tool}"],
        args: &["args"],
    };

    fn graph() -> BuildGraph {
        let mut graph = BuildGraph::new();
        for (module, args) in [("a", "--x S.$$(cat fp)"), ("b", "")] {
            let mut node_args = BTreeMap::new();
            node_args.insert("args".to_string(), args.to_string());
            graph
                .build(
                    module,
                    BuildParams {
                        rule: &TOOL_RULE,
                        description: "run tool".to_string(),
                        input: PathBuf::from(format!("src/{module}.xml")),
                        implicits: vec![PathBuf::from("out/fp.txt")],
                        output: PathBuf::from(format!("out/{module}.xml")),
                        args: node_args,
                    },
                )
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_write_ninja() {
        let mut vars = BTreeMap::new();
        vars.insert("config.Tool".to_string(), "bin/tool".to_string());
        let ninja = write_ninja(&graph(), &vars);

        assert!(ninja.starts_with(HEADER));
        assert!(ninja.contains("config.Tool = bin/tool\n"));
        assert_eq!(ninja.matches("rule tool\n").count(), 1);
        assert!(ninja.contains(
            "build out/a.xml: tool src/a.xml | out/fp.txt ${config.Tool}\n  desc = run tool a\n  args = --x S.$$(cat fp)\n"
        ));
        assert!(ninja.contains("build out/b.xml: tool src/b.xml"));
        assert!(ninja.contains("  args =\n"));
    }

    #[test]
    fn test_escape_path() {
        assert_eq!(escape_path(Path::new("a b/c:d$e")), "a$ b/c$:d$$e");
        assert_eq!(escape_path(Path::new("plain/path.xml")), "plain/path.xml");
    }
}
