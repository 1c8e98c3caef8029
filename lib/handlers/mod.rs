//! Command handlers.

mod args_cmd;
mod common;
mod generate_cmd;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use args_cmd::{ModuleReport, module_report, show_args};
pub use common::{derive_module, register_module};
pub use generate_cmd::{GenerateSummary, generate, generate_graph};
