//! Document listing and check-report presentation.

use crate::error::ConfigError;
use crate::loader::DocumentEntry;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Outcome of resolving one document during `hpxconf check`.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    /// Number of leaf keys on success, error text on failure.
    pub outcome: Result<usize, String>,
}

pub fn format_document_list(entries: &[DocumentEntry], format: &str) -> Result<String, ConfigError> {
    if format == "json" {
        let arr: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "group": e.group(),
                    "variant": e.variant(),
                    "path": e.origin.as_ref().map(|p| p.display().to_string()),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&arr)?);
    }
    if entries.is_empty() {
        return Ok("No config documents found.".to_string());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Group", "Variant", "Path"]);
    for e in entries {
        let group = if e.group().is_empty() { "-" } else { e.group() };
        let path = e
            .origin
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![group.to_string(), e.variant().to_string(), path]);
    }
    Ok(table.to_string())
}

pub fn format_check_report(results: &[CheckResult]) -> String {
    let mut out = String::new();
    for r in results {
        match &r.outcome {
            Ok(keys) => out.push_str(&format!("{} {} ({} keys)\n", "ok  ".green(), r.name, keys)),
            Err(e) => out.push_str(&format!("{} {}: {}\n", "FAIL".red().bold(), r.name, e)),
        }
    }
    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    out.push_str(&format!(
        "\n{} checked, {} failed",
        results.len(),
        failed
    ));
    out
}
