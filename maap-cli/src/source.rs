//! Site data loading
//!
//! A site file is a comma-separated table whose first row names the columns
//! and whose first column is an ISO-8601 timestamp. Rows are expected in
//! ascending time order; that is assumed, not checked.

use chrono::{NaiveDate, NaiveDateTime};
use maap_core::Row;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading a site file
#[derive(Debug, Error)]
pub enum SourceError {
    /// IO error reading the file or directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file has no header row
    #[error("{0} has no header row")]
    MissingHeader(PathBuf),

    /// First column of a data row is not a timestamp
    #[error("line {line}: invalid timestamp '{value}'")]
    Timestamp {
        /// Line number (1-indexed)
        line: usize,
        /// Offending text
        value: String,
    },
}

/// Header plus data rows of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Column names; column 0 is the timestamp
    pub header: Row,
    /// Data rows in file order
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Indices of the parameter columns (everything after the timestamp)
    pub fn parameter_indices(&self) -> std::ops::Range<usize> {
        1..self.header.len().max(1)
    }

    /// Column name, or an empty string for an out-of-range index
    pub fn column_name(&self, index: usize) -> &str {
        self.header.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Parse an ISO-8601 date or date-time
///
/// Accepts `YYYY-MM-DD`, and `YYYY-MM-DD[T| ]HH:MM[:SS[.fff]]`. A bare date
/// means midnight.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read the header and every row stamped at or before `end`
///
/// The scan stops at the first row stamped after `end`. Blank lines are
/// skipped; fields are split on `,` and trimmed.
pub fn read_rows_until(path: &Path, end: NaiveDateTime) -> Result<Dataset, SourceError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut header: Option<Row> = None;
    let mut rows = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        if header.is_none() {
            header = Some(fields);
            continue;
        }

        let stamp = fields.first().map(String::as_str).unwrap_or("");
        let timestamp = parse_timestamp(stamp).ok_or_else(|| SourceError::Timestamp {
            line: line_num + 1,
            value: stamp.to_string(),
        })?;

        if timestamp > end {
            break;
        }
        rows.push(fields);
    }

    let header = header.ok_or_else(|| SourceError::MissingHeader(path.to_path_buf()))?;
    Ok(Dataset { header, rows })
}

/// Site files (`*.csv`) in a data directory, sorted by name
pub fn list_sites(dir: &Path) -> Result<Vec<String>, SourceError> {
    let mut sites: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    sites.sort();
    Ok(sites)
}

/// Site name as written into reports: the file name without extension
pub fn site_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

fn split_fields(line: &str) -> Row {
    line.split(',').map(|f| f.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn at(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2023-06-01T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-06-01 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-06-01 14:30"), Some(expected));
        assert_eq!(parse_timestamp(" 2023-06-01T14:30 "), Some(expected));
        assert_eq!(
            parse_timestamp("2023-06-01"),
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(parse_timestamp("2023-06-01T14:30:00.250").is_some());
        assert_eq!(parse_timestamp("June 1st"), None);
    }

    #[test]
    fn test_read_rows_until_stops_after_end() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "datetime,Temp,DO").unwrap();
        writeln!(file, "2023-06-01 00:00,10.5,8.1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "2023-06-01 01:00,11.0,").unwrap();
        writeln!(file, "2023-06-01 02:00,11.5,7.9").unwrap();
        writeln!(file, "2023-06-01 03:00,12.0,7.5").unwrap();
        writeln!(file, "not a time,1,1").unwrap();
        file.flush().unwrap();

        let data = read_rows_until(file.path(), at("2023-06-01 02:00")).unwrap();
        assert_eq!(data.header, vec!["datetime", "Temp", "DO"]);
        // the row stamped exactly at `end` is included
        assert_eq!(data.rows.len(), 3);
        assert_eq!(data.rows[1], vec!["2023-06-01 01:00", "11.0", ""]);
        assert_eq!(data.parameter_indices(), 1..3);
        assert_eq!(data.column_name(2), "DO");
    }

    #[test]
    fn test_read_rows_invalid_timestamp() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "datetime,Temp").unwrap();
        writeln!(file, "2023-06-01 00:00,10.5").unwrap();
        writeln!(file, "yesterday,11.0").unwrap();
        file.flush().unwrap();

        let result = read_rows_until(file.path(), at("2024-01-01"));
        assert!(matches!(
            result,
            Err(SourceError::Timestamp { line: 3, ref value }) if value == "yesterday"
        ));
    }

    #[test]
    fn test_read_rows_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let result = read_rows_until(file.path(), at("2024-01-01"));
        assert!(matches!(result, Err(SourceError::MissingHeader(_))));
    }

    #[test]
    fn test_list_sites() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_site.csv"), "t,x\n").unwrap();
        std::fs::write(dir.path().join("a_site.CSV"), "t,x\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let sites = list_sites(dir.path()).unwrap();
        assert_eq!(sites, vec!["a_site.CSV", "b_site.csv"]);
        assert_eq!(site_name("b_site.csv"), "b_site");
    }
}
