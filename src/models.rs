use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One published index level, keyed by the first day of its month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub period: NaiveDate,
    pub value: f64,
}

impl IndexEntry {
    /// A usable entry: a first-of-month period and a finite, positive value.
    pub fn is_valid(&self) -> bool {
        self.period.day() == 1 && self.value.is_finite() && self.value > 0.0
    }
}

/// A dated historical amount as supplied by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub description: Option<String>,
    pub origin_date: NaiveDate,
    pub historical_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedTransaction {
    pub transaction: Transaction,
    pub origin_period: Option<NaiveDate>,
    /// `None` when the origin period is missing from the index table.
    pub origin_index: Option<f64>,
    pub coefficient: f64,
    pub adjusted_amount: f64,
    pub recpam_adjustment: f64,
}

impl AdjustedTransaction {
    pub fn is_adjusted(&self) -> bool {
        self.origin_index.is_some()
    }
}

/// Row-local lookup failure; the row itself is still emitted unadjusted.
#[derive(Debug, Clone, PartialEq)]
pub struct RowWarning {
    /// 1-based position in the input batch.
    pub row: usize,
    pub origin_date: NaiveDate,
    pub origin_period: Option<NaiveDate>,
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No index value for origin date {} in row {}",
            self.origin_date.format("%d/%m/%Y"),
            self.row
        )?;
        if let Some(period) = self.origin_period {
            write!(f, " (period {})", period.format("%Y-%m"))?;
        }
        write!(f, "; left unadjusted.")
    }
}

/// Transactions read from a user file, plus the columns and cell text needed
/// to write them back out.
#[derive(Debug, Clone, Default)]
pub struct TransactionFile {
    pub transactions: Vec<Transaction>,
    /// Input header in file order, including columns recpam does not read.
    pub columns: Vec<String>,
    /// Cell text of each row, aligned with `transactions` and `columns`.
    pub records: Vec<Vec<String>>,
    pub has_description: bool,
}
