#![warn(missing_docs)]
//! MAAP Report - Output of resampling runs
//!
//! Generates:
//! - CSV model summary (one row per parameter and sample size)
//! - CSV site summary (population statistics per parameter)
//! - JSON (everything, machine-readable)

mod csv;
mod json;
mod report;

pub use csv::{
    generate_model_summary_csv, generate_site_summary_csv, model_summary_header,
    site_summary_header,
};
pub use json::generate_json_report;
pub use report::{
    FailureInfo, GrandSummary, ModelRow, ParameterReport, Report, ReportMeta, SiteRow, TimeWindow,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Append to the model and site summary CSV files
    Csv,
    /// JSON with full detail
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use maap_core::{MaapConfig, ResamplingEngine, Row};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_report() -> Report {
        let config = MaapConfig::builder()
            .percentiles([10.0, 50.0, 90.0])
            .sample_sizes([2, 4])
            .iterations(20)
            .build()
            .unwrap();
        let rows: Vec<Row> = (1..=12)
            .map(|v| vec![format!("2024-03-01T{:02}:00:00", v), v.to_string()])
            .collect();
        let result = ResamplingEngine::new(config.clone(), rows, 1)
            .generate(&mut StdRng::seed_from_u64(11))
            .unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();

        Report {
            meta: ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: Utc::now(),
                site: "river, north".to_string(),
                time_range: TimeWindow { start, end },
                iterations: config.iterations(),
                strategy: "all".to_string(),
                seed: Some(11),
                percentiles: config.percentiles().to_vec(),
                sample_sizes: config.sample_sizes().to_vec(),
                source_label: "USGS".to_string(),
            },
            parameters: vec![ParameterReport {
                index: 1,
                name: "Temp".to_string(),
                result,
            }],
            failures: Vec::new(),
        }
    }

    fn column_count(line: &str) -> usize {
        // site name is the only quoted field in the sample report
        line.replace("\"river, north\"", "site").split(',').count()
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_model_summary_shape() {
        let report = sample_report();
        let csv = generate_model_summary_csv(&report, true);
        let lines: Vec<&str> = csv.lines().collect();

        // header + one row per sample size
        assert_eq!(lines.len(), 3);
        let width = column_count(lines[0]);
        // identity, run columns, then value/abs/rel blocks and the two sd blocks
        assert_eq!(width, 7 + 7 + 3 + (2 + 3) + (2 + 3) + 3 + 3);
        for line in &lines[1..] {
            assert_eq!(column_count(line), width);
        }
        assert!(lines[1].starts_with("1,\"river, north\",Temp,2024-03-01,00:00:00,2024-03-02,12:30:00,all,20,2,"));
        assert!(lines[2].contains(",all,20,4,"));
    }

    #[test]
    fn test_site_summary_shape() {
        let report = sample_report();
        let csv = generate_site_summary_csv(&report, false);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(column_count(lines[0]), column_count(&site_summary_header(&report.meta)));
        assert!(lines[0].contains(",12,12,0,USGS,6.5,"));
    }

    #[test]
    fn test_model_rows_follow_sample_sizes() {
        let report = sample_report();
        let rows = report.parameters[0].model_rows();
        assert_eq!(rows.iter().map(|r| r.sample_size).collect::<Vec<_>>(), vec![2, 4]);
        assert!(rows.iter().all(|r| r.tables.value.len() == 3));
        assert_eq!(rows[0].value_grand, rows[1].value_grand);
    }

    #[test]
    fn test_json_report() {
        let report = sample_report();
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["meta"]["site"], "river, north");
        assert_eq!(value["parameters"][0]["name"], "Temp");
        assert_eq!(
            value["parameters"][0]["result"]["verts"]
                .as_array()
                .map(|v| v.len()),
            Some(2)
        );
    }
}
