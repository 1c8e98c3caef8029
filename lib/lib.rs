//! `manifest-rules` library.

pub mod class_loader;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod manifest;
pub mod module;
pub mod project;
pub mod sdk;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use class_loader::*;
pub use commands::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use graph::{BuildGraph, BuildNode, BuildParams, GraphError, Rule};
pub use manifest::*;
pub use module::*;
pub use project::*;
pub use sdk::*;
