use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{LabelerError, LabelerResult};

use super::records::LightCurveRecord;

/// Time, magnitude and error columns of one light curve, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    pub time: Vec<f64>,
    pub magnitude: Vec<f64>,
    pub error: Vec<f64>,
}

impl RawSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Parse a whitespace (or comma) delimited numeric table.
    ///
    /// Blank lines and `#` comments are skipped. Every data row must have
    /// the same number of columns, at least three; the first three are read
    /// as time, magnitude and error.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut series = RawSeries::default();
        let mut width: Option<usize> = None;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let values = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|field| !field.is_empty())
                .map(|field| parse_value(field, line_no + 1))
                .collect::<Result<Vec<f64>, String>>()?;

            match width {
                None if values.len() < 3 => {
                    return Err(format!(
                        "line {}: expected at least 3 columns, found {}",
                        line_no + 1,
                        values.len()
                    ));
                }
                None => width = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(format!(
                        "line {}: expected {expected} columns, found {}",
                        line_no + 1,
                        values.len()
                    ));
                }
                Some(_) => {}
            }

            series.time.push(values[0]);
            series.magnitude.push(values[1]);
            series.error.push(values[2]);
        }

        Ok(series)
    }
}

fn parse_value(field: &str, line_no: usize) -> Result<f64, String> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("line {line_no}: non-finite value '{field}'")),
        Err(_) => Err(format!("line {line_no}: '{field}' is not a number")),
    }
}

/// Loads the raw series behind a catalog record.
///
/// Called every time a record becomes visible, so implementations may be
/// slow; the session does not cache results.
pub trait SeriesSource: Send {
    fn resolve(&self, record: &LightCurveRecord) -> LabelerResult<RawSeries>;
}

/// Reads light curve files from a single directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SeriesSource for DirectorySource {
    fn resolve(&self, record: &LightCurveRecord) -> LabelerResult<RawSeries> {
        let path = self.root.join(&record.source_file);
        let text = fs::read_to_string(&path).map_err(|err| LabelerError::DataUnavailable {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        RawSeries::parse(&text).map_err(|reason| LabelerError::DataUnavailable { path, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_columns_and_skips_comments() {
        let text = "# mjd mag err\n\
                    1.5 14.2 0.02 99\n\
                    \n\
                    2.5\t14.4\t0.03 98  # trailing note\n";
        let series = RawSeries::parse(text).unwrap();
        assert_eq!(series.time, vec![1.5, 2.5]);
        assert_eq!(series.magnitude, vec![14.2, 14.4]);
        assert_eq!(series.error, vec![0.02, 0.03]);
    }

    #[test]
    fn accepts_comma_separated_rows() {
        let series = RawSeries::parse("0,1,2\n3,4,5\n").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.error, vec![2.0, 5.0]);
    }

    #[test]
    fn empty_file_is_an_empty_series() {
        assert!(RawSeries::parse("").unwrap().is_empty());
        assert!(RawSeries::parse("# only a header\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(RawSeries::parse("1 2\n").is_err());
        assert!(RawSeries::parse("1 2 3\n4 5 6 7\n").is_err());
        assert!(RawSeries::parse("1 two 3\n").is_err());
        assert!(RawSeries::parse("1 nan 3\n").is_err());
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        let record = LightCurveRecord {
            id: 0,
            source_file: "absent.dat".into(),
            period: 1.0,
        };
        assert!(matches!(
            source.resolve(&record),
            Err(LabelerError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn reads_file_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dat"), "0 10 0.1\n1 11 0.2\n").unwrap();
        let source = DirectorySource::new(dir.path());
        let record = LightCurveRecord {
            id: 0,
            source_file: "a.dat".into(),
            period: 1.0,
        };
        let series = source.resolve(&record).unwrap();
        assert_eq!(series.magnitude, vec![10.0, 11.0]);
    }
}
