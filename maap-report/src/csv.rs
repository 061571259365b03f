//! CSV Output
//!
//! Two tables, both append-friendly: the model summary (one row per
//! parameter and sample size) and the site summary (one row per parameter).
//! Headers are built from the configured percentile thresholds.

use crate::report::{ParameterReport, Report, ReportMeta};

/// Header line of the model summary
pub fn model_summary_header(meta: &ReportMeta) -> String {
    let mut columns: Vec<String> = leading_columns();
    columns.extend(
        [
            "strategy",
            "iterations",
            "sample_size",
            "num_culled",
            "percent_culled",
            "value_grand_mean",
            "value_grand_sd",
        ]
        .map(String::from),
    );
    columns.extend(percentile_columns("value", &meta.percentiles));
    columns.extend(["abs_err_grand_mean", "abs_err_grand_sd"].map(String::from));
    columns.extend(percentile_columns("abs_err", &meta.percentiles));
    columns.extend(["rel_err_grand_mean", "rel_err_grand_sd"].map(String::from));
    columns.extend(percentile_columns("rel_err", &meta.percentiles));
    columns.extend(percentile_columns("abs_err_sd", &meta.percentiles));
    columns.extend(percentile_columns("rel_err_sd", &meta.percentiles));
    columns.join(",")
}

/// Header line of the site summary
pub fn site_summary_header(meta: &ReportMeta) -> String {
    let mut columns: Vec<String> = leading_columns();
    columns.extend(
        [
            "potential_observations",
            "actual_observations",
            "missing_observations",
            "source",
            "mean",
        ]
        .map(String::from),
    );
    columns.extend(percentile_columns("p", &meta.percentiles));
    columns.push("std_dev".to_string());
    columns.join(",")
}

/// Model summary rows, optionally preceded by the header
pub fn generate_model_summary_csv(report: &Report, include_header: bool) -> String {
    let mut output = String::new();
    if include_header {
        output.push_str(&model_summary_header(&report.meta));
        output.push('\n');
    }

    for parameter in &report.parameters {
        for row in parameter.model_rows() {
            let mut fields = identity_fields(report, parameter);
            fields.push(escape_field(&report.meta.strategy));
            fields.push(report.meta.iterations.to_string());
            fields.push(row.sample_size.to_string());
            fields.push(row.num_culled.to_string());
            fields.push(format_number(row.percent_culled));
            fields.push(format_number(row.value_grand.mean));
            fields.push(format_number(row.value_grand.std_dev));
            fields.extend(row.tables.value.iter().map(|&v| format_number(v)));
            fields.push(format_number(row.absolute_grand.mean));
            fields.push(format_number(row.absolute_grand.std_dev));
            fields.extend(row.tables.absolute_error.iter().map(|&v| format_number(v)));
            fields.push(format_number(row.relative_grand.mean));
            fields.push(format_number(row.relative_grand.std_dev));
            fields.extend(row.tables.relative_error.iter().map(|&v| format_number(v)));
            fields.extend(row.tables.absolute_error_sd.iter().map(|&v| format_number(v)));
            fields.extend(row.tables.relative_error_sd.iter().map(|&v| format_number(v)));

            output.push_str(&fields.join(","));
            output.push('\n');
        }
    }

    output
}

/// Site summary rows, optionally preceded by the header
pub fn generate_site_summary_csv(report: &Report, include_header: bool) -> String {
    let mut output = String::new();
    if include_header {
        output.push_str(&site_summary_header(&report.meta));
        output.push('\n');
    }

    for parameter in &report.parameters {
        let row = parameter.site_row();
        let mut fields = identity_fields(report, parameter);
        fields.push(row.potential_observations.to_string());
        fields.push(row.actual_observations.to_string());
        fields.push(row.missing_observations.to_string());
        fields.push(escape_field(&report.meta.source_label));
        fields.push(format_number(row.mean));
        fields.extend(row.percentiles.iter().map(|&v| format_number(v)));
        fields.push(format_number(row.std_dev));

        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

fn leading_columns() -> Vec<String> {
    [
        "parameter_index",
        "site",
        "parameter",
        "start_date",
        "start_time",
        "end_date",
        "end_time",
    ]
    .map(String::from)
    .to_vec()
}

fn identity_fields(report: &Report, parameter: &ParameterReport) -> Vec<String> {
    let mut fields = vec![
        parameter.index.to_string(),
        escape_field(&report.meta.site),
        escape_field(&parameter.name),
    ];
    fields.extend(report.meta.time_range.fields());
    fields
}

fn percentile_columns(prefix: &str, percentiles: &[f64]) -> Vec<String> {
    percentiles
        .iter()
        .map(|p| format!("{}_p{}", prefix, p))
        .collect()
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Quote a field when it contains a separator, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
