//! Export file naming convention
//!
//! Every published file is named `<table>--<YYYY-MM-DD>.csv`. The same codec
//! produces names on export and parses them back during the retention sweep.

use crate::domain::errors::StockpileError;
use crate::domain::Result;
use chrono::NaiveDate;
use std::fmt;

const SEPARATOR: &str = "--";
const EXTENSION: &str = ".csv";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A parsed or to-be-written export file name
///
/// # Examples
///
/// ```
/// use stockpile::domain::ExportFileName;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// let name = ExportFileName::new("inventory", date);
/// assert_eq!(name.to_file_name(), "inventory--2026-01-05.csv");
///
/// let parsed = ExportFileName::parse("inventory--2026-01-05.csv").unwrap();
/// assert_eq!(parsed, name);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportFileName {
    table_name: String,
    date: NaiveDate,
}

impl ExportFileName {
    /// Creates a file name for a table prefix and export date
    pub fn new(table_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            table_name: table_name.into(),
            date,
        }
    }

    /// Table part of the name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Export date embedded in the name
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Renders `<table>--<YYYY-MM-DD>.csv`
    pub fn to_file_name(&self) -> String {
        format!(
            "{}{}{}{}",
            self.table_name,
            SEPARATOR,
            self.date.format(DATE_FORMAT),
            EXTENSION
        )
    }

    /// Parses a name produced by [`ExportFileName::to_file_name`]
    ///
    /// The split happens at the rightmost `--`.
    ///
    /// # Errors
    ///
    /// Returns [`StockpileError::Format`] when the name does not end in `.csv`,
    /// has no `--` separator, has an empty table part, or carries an invalid date.
    pub fn parse(name: &str) -> Result<Self> {
        let format_error = |reason: &str| StockpileError::Format {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let stem = name
            .strip_suffix(EXTENSION)
            .ok_or_else(|| format_error("missing .csv extension"))?;

        let (table_name, date_part) = stem
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| format_error("missing '--' separator"))?;

        if table_name.is_empty() {
            return Err(format_error("empty table name"));
        }

        // chrono accepts unpadded fields, so enforce the fixed width explicitly
        if date_part.len() != 10 {
            return Err(format_error("date must be formatted as YYYY-MM-DD"));
        }

        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map_err(|e| format_error(&format!("invalid date '{date_part}': {e}")))?;

        Ok(Self::new(table_name, date))
    }
}

impl fmt::Display for ExportFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_file_name())
    }
}
