//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
///
/// Includes run metadata, every vert with its per-threshold statistics, the
/// rounded tables and the failures.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
