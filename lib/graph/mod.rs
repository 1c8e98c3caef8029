//! Build graph that rule emitters register their nodes with.
//!
//! The graph only records nodes; executing them is left to the engine that
//! consumes the graph (see [`write_ninja`]). Every output path is owned by
//! exactly one node so incremental rebuilds can attribute each file to the
//! command that produces it.

mod ninja;
mod rule;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use ninja::{escape_path, write_ninja};
pub use rule::Rule;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Parameters of a node to register.
#[derive(Debug, Clone)]
pub struct BuildParams {
    /// Rule the node runs.
    pub rule: &'static Rule,

    /// Human-readable action, shown while the node runs.
    pub description: String,

    /// The single explicit input.
    pub input: PathBuf,

    /// Extra inputs that invalidate the output without appearing on the command line as `$in`.
    pub implicits: Vec<PathBuf>,

    /// The single output, owned by the node.
    pub output: PathBuf,

    /// Values of the rule's per-node arguments.
    pub args: BTreeMap<String, String>,
}

/// A registered node.
#[derive(Debug, Clone, Serialize)]
pub struct BuildNode {
    /// Module that registered the node.
    pub module: String,
    pub rule: &'static Rule,
    pub description: String,
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implicits: Vec<PathBuf>,
    pub output: PathBuf,
    pub args: BTreeMap<String, String>,
}

/// Nodes registered so far, in registration order.
#[derive(Debug, Default, Serialize)]
pub struct BuildGraph {
    nodes: Vec<BuildNode>,
    #[serde(skip)]
    owners: HashMap<PathBuf, usize>,
}

/// Error type for node registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Output path already produced by another node.
    #[error("output {output:?} of module {module:?} is already produced by module {owner:?}")]
    DuplicateOutput {
        output: PathBuf,
        module: String,
        owner: String,
    },

    /// Argument not referenced by the rule.
    #[error("rule {rule:?} does not declare argument {arg:?}")]
    UndeclaredArg { rule: &'static str, arg: String },
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node for `module`.
    ///
    /// The graph is left untouched when the node is rejected.
    pub fn build(&mut self, module: &str, params: BuildParams) -> Result<(), GraphError> {
        if let Some(arg) = params.args.keys().find(|arg| !params.rule.declares_arg(arg)) {
            return Err(GraphError::UndeclaredArg {
                rule: params.rule.name,
                arg: arg.clone(),
            });
        }

        if let Some(&owner) = self.owners.get(&params.output) {
            return Err(GraphError::DuplicateOutput {
                output: params.output,
                module: module.to_string(),
                owner: self.nodes[owner].module.clone(),
            });
        }

        tracing::debug!(
            module,
            rule = params.rule.name,
            output = %params.output.display(),
            "registering build node"
        );

        self.owners.insert(params.output.clone(), self.nodes.len());
        self.nodes.push(BuildNode {
            module: module.to_string(),
            rule: params.rule,
            description: params.description,
            input: params.input,
            implicits: params.implicits,
            output: params.output,
            args: params.args,
        });

        Ok(())
    }

    pub fn nodes(&self) -> &[BuildNode] {
        &self.nodes
    }

    /// Node producing `output`, if any.
    pub fn producer(&self, output: &Path) -> Option<&BuildNode> {
        self.owners.get(output).map(|&index| &self.nodes[index])
    }

    /// Nodes registered by a module, in registration order.
    pub fn module_nodes<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a BuildNode> + 'a {
        self.nodes.iter().filter(move |node| node.module == module)
    }

    /// Rules used by the graph, each once, in first-use order.
    pub fn rules(&self) -> Vec<&'static Rule> {
        let mut rules: Vec<&'static Rule> = Vec::new();
        for node in &self.nodes {
            if !rules.iter().any(|rule| rule.name == node.rule.name) {
                rules.push(node.rule);
            }
        }
        rules
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
