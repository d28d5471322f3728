//! CLI domain: parse, route, output, and presentation only.
//! No resolution logic here; a single route table dispatches to the resolver.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{map_error, CommandOutput};
pub use parse::{Cli, Commands};
pub use presentation::{
    format_check_report, format_document_list, format_tree, format_value, CheckResult,
};
pub use route::{load_settings, RunContext};
