use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{Months, NaiveDate};

use crate::error::{RecpamError, Result};
use crate::models::IndexEntry;
use crate::period::month_start;

pub const DATE_COLUMN: &str = "fecha";
pub const VALUE_COLUMN: &str = "ipc_valor";

/// Monthly price-index levels keyed by period (first day of the month).
///
/// A repeated period keeps the last value seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexTable {
    values: BTreeMap<NaiveDate, f64>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value for the month containing `date`. Returns the value it
    /// replaced, if any.
    pub fn insert(&mut self, date: NaiveDate, value: f64) -> Option<f64> {
        self.values.insert(month_start(date), value)
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = IndexEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry.period, entry.value);
        }
        table
    }

    /// Build from raw `(fecha, ipc_valor)` text pairs. Row numbers in errors
    /// are 1-based positions in `pairs`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self::new();
        let mut overwritten = 0usize;
        for (i, (raw_date, raw_value)) in pairs.into_iter().enumerate() {
            let row = i + 1;
            let date = parse_index_date(raw_date).ok_or_else(|| RecpamError::InvalidDate {
                row,
                value: raw_date.trim().to_string(),
            })?;
            let value = parse_index_value(raw_value).ok_or_else(|| {
                RecpamError::InvalidIndexValue {
                    row,
                    value: raw_value.trim().to_string(),
                }
            })?;
            if table.insert(date, value).is_some() {
                overwritten += 1;
            }
        }
        if overwritten > 0 {
            log::warn!("{overwritten} repeated index period(s); the last value of each was kept");
        }
        log::debug!("built index table with {} periods", table.len());
        Ok(table)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let idx_date = column_index(&headers, DATE_COLUMN)?;
        let idx_value = column_index(&headers, VALUE_COLUMN)?;

        let mut raw: Vec<(String, String)> = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let date = record.get(idx_date).unwrap_or("").to_string();
            let value = record.get(idx_value).unwrap_or("").to_string();
            raw.push((date, value));
        }
        Self::from_pairs(raw.iter().map(|(d, v)| (d.as_str(), v.as_str())))
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_csv_reader(bytes)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// Index value for `period`, which must already be a first-of-month date.
    pub fn find(&self, period: NaiveDate) -> Option<f64> {
        self.values.get(&period).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<IndexEntry> {
        self.values
            .iter()
            .next()
            .map(|(&period, &value)| IndexEntry { period, value })
    }

    pub fn last(&self) -> Option<IndexEntry> {
        self.values
            .iter()
            .next_back()
            .map(|(&period, &value)| IndexEntry { period, value })
    }

    /// Months between the first and last period that have no value.
    pub fn gaps(&self) -> Vec<NaiveDate> {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Vec::new();
        };
        let mut missing = Vec::new();
        let mut period = first.period;
        while period < last.period {
            if !self.values.contains_key(&period) {
                missing.push(period);
            }
            match period.checked_add_months(Months::new(1)) {
                Some(next) => period = next,
                None => break,
            }
        }
        missing
    }

    /// Entries in ascending period order.
    pub fn entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        self.values
            .iter()
            .map(|(&period, &value)| IndexEntry { period, value })
    }
}

/// Position of `name` in a header row, ignoring surrounding whitespace and a
/// UTF-8 byte-order mark on the first field.
pub fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| RecpamError::MissingColumn(name.to_string()))
}

fn parse_index_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_index_value(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}
