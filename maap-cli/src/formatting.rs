//! Output Formatting
//!
//! Human-readable terminal output: population statistics per parameter and
//! one error table per parameter (thresholds down, sample sizes across).

use maap_report::{ParameterReport, Report};

/// Format a report for terminal display
pub fn format_human_output(report: &Report) -> String {
    let meta = &report.meta;
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "MAAP Results: {} ({} to {})\n",
        meta.site, meta.time_range.start, meta.time_range.end
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "strategy: {}  iterations: {}  seed: {}\n\n",
        meta.strategy,
        meta.iterations,
        meta.seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string())
    ));

    for parameter in &report.parameters {
        format_parameter(&mut output, parameter, &meta.percentiles);
    }

    if !report.failures.is_empty() {
        output.push_str("Failures\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for failure in &report.failures {
            output.push_str(&format!(
                "  ✗ [{}] {}: {}\n",
                failure.index, failure.name, failure.message
            ));
        }
        output.push('\n');
    }

    output
}

fn format_parameter(output: &mut String, parameter: &ParameterReport, percentiles: &[f64]) {
    let result = &parameter.result;
    let actual = result.actual();

    output.push_str(&format!("[{}] {}\n", parameter.index, parameter.name));
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  observations: {} of {} ({} missing, {} culled)\n",
        result.actual_observations(),
        result.potential_observations(),
        result.missing_observations(),
        result.num_culled()
    ));
    output.push_str(&format!(
        "  population mean: {:.4}  sd: {:.4}\n",
        actual.mean(),
        actual.std_dev()
    ));

    let sample_sizes = result.config().sample_sizes();
    output.push_str(&format!("  {:>8}", "n ="));
    for n in sample_sizes {
        output.push_str(&format!(" {:>18}", n));
    }
    output.push('\n');

    for (p, threshold) in percentiles.iter().enumerate() {
        output.push_str(&format!("  {:>8}", format!("P{}", threshold)));
        for position in 0..sample_sizes.len() {
            output.push_str(&format!(
                " {:>9.3} ±{:>7.3}",
                result.absolute_error_means()[p][position],
                result.absolute_error_sds()[p][position]
            ));
        }
        output.push_str(&format!("   (population {:.4})\n", actual.percentiles()[p]));
    }

    output.push_str(&format!("  {:>8}", "rel %"));
    for position in 0..sample_sizes.len() {
        let mean_rel: f64 = result
            .relative_error_means()
            .iter()
            .map(|row| row[position])
            .sum::<f64>()
            / percentiles.len() as f64;
        output.push_str(&format!(" {:>18.3}", mean_rel));
    }
    output.push_str("\n\n");
}
