//! Rule templates and command rendering.

use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::BuildNode;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// `$$`, `${name}` or `$name` inside a rule command.
static VARIABLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$\{([A-Za-z0-9_.\-]+)\}|\$([A-Za-z0-9_\-]+)").expect("Invalid regex pattern")
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A command template shared by every node built with it.
///
/// Commands use Ninja syntax: `$in`, `$out` and the declared `args` are bound
/// per node, `${config.*}` variables once per build.
#[derive(Debug, PartialEq, Eq)]
pub struct Rule {
    /// Rule name, unique in the graph.
    pub name: &'static str,

    /// Command template.
    pub command: &'static str,

    /// Files the command itself depends on (usually the tool executable).
    pub command_deps: &'static [&'static str],

    /// Names of the per-node arguments the command references.
    pub args: &'static [&'static str],
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Rule {
    pub fn declares_arg(&self, name: &str) -> bool {
        self.args.iter().any(|arg| *arg == name)
    }

    /// Command a node of this rule runs, with every variable substituted.
    ///
    /// Unbound variables expand to nothing, as in Ninja, and a variable that
    /// expands to nothing takes one separating space with it. Everything else
    /// is kept byte for byte; paths are inserted unquoted like Ninja's `$in`
    /// and `$out`. The result is the shell command line, so `$$` becomes `$`.
    pub fn render_command(&self, node: &BuildNode, vars: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(self.command.len());
        let mut last = 0;
        let mut drop_leading_space = false;

        for caps in VARIABLE_REGEX.captures_iter(self.command) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_literal(&mut out, &self.command[last..whole.start()], drop_leading_space);
            drop_leading_space = false;
            last = whole.end();

            let value = match caps.get(1).or_else(|| caps.get(2)) {
                None => "$".to_string(),
                Some(name) => match name.as_str() {
                    "in" => node.input.display().to_string(),
                    "out" => node.output.display().to_string(),
                    other => node
                        .args
                        .get(other)
                        .or_else(|| vars.get(other))
                        .map(|value| unescape(value))
                        .unwrap_or_default(),
                },
            };

            if !value.is_empty() {
                out.push_str(&value);
            } else if out.ends_with(' ') {
                out.pop();
            } else {
                drop_leading_space = true;
            }
        }
        push_literal(&mut out, &self.command[last..], drop_leading_space);

        out
    }

    /// Command deps with `${config.*}` variables substituted.
    pub fn resolved_command_deps(&self, vars: &BTreeMap<String, String>) -> Vec<String> {
        self.command_deps
            .iter()
            .map(|dep| {
                VARIABLE_REGEX
                    .replace_all(dep, |caps: &Captures| {
                        caps.get(1)
                            .or_else(|| caps.get(2))
                            .and_then(|name| vars.get(name.as_str()).cloned())
                            .unwrap_or_default()
                    })
                    .into_owned()
            })
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Append a literal part of a command, minus the separator of an empty
/// variable at the start of the command.
fn push_literal(out: &mut String, literal: &str, drop_leading_space: bool) {
    match literal.strip_prefix(' ') {
        Some(rest) if drop_leading_space => out.push_str(rest),
        _ => out.push_str(literal),
    }
}

/// Turn Ninja `$$` escapes back into `$`.
fn unescape(value: &str) -> String {
    value.replace("$$", "$")
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Serialize for Rule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
