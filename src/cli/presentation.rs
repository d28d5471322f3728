//! CLI presentation: text and json formatters per command family.

mod documents;
mod resolved;

pub use documents::{format_check_report, format_document_list, CheckResult};
pub use resolved::{format_tree, format_value};
