use chrono::NaiveDate;

use crate::error::{RecpamError, Result};
use crate::index_table::IndexTable;
use crate::models::{AdjustedTransaction, RowWarning, Transaction};
use crate::period::{closing_period, origin_period};
use crate::summary::Summary;

/// The closing side of an adjustment, resolved once per batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentRun {
    pub closing_date: NaiveDate,
    pub closing_period: NaiveDate,
    pub closing_index: f64,
}

impl AdjustmentRun {
    /// Fails with `ClosingIndexNotFound` when the closing month is not in
    /// the table.
    pub fn resolve(closing_date: NaiveDate, table: &IndexTable) -> Result<Self> {
        let period = closing_period(closing_date);
        let closing_index = table
            .find(period)
            .ok_or(RecpamError::ClosingIndexNotFound(closing_date))?;
        log::debug!("closing period {period} resolved to index {closing_index}");
        Ok(Self {
            closing_date,
            closing_period: period,
            closing_index,
        })
    }

    /// Restate one transaction. `row` is its 1-based position, used only in
    /// the warning emitted when the origin period has no index value.
    pub fn adjust_row(
        &self,
        row: usize,
        transaction: &Transaction,
        table: &IndexTable,
    ) -> (AdjustedTransaction, Option<RowWarning>) {
        let period = origin_period(transaction.origin_date);
        let origin_index = period.and_then(|p| table.find(p));
        let amount = transaction.historical_amount;

        match origin_index {
            Some(origin_index) => {
                let coefficient = self.closing_index / origin_index;
                let adjusted_amount = amount * coefficient;
                let adjusted = AdjustedTransaction {
                    transaction: transaction.clone(),
                    origin_period: period,
                    origin_index: Some(origin_index),
                    coefficient,
                    adjusted_amount,
                    recpam_adjustment: adjusted_amount - amount,
                };
                (adjusted, None)
            }
            None => {
                let warning = RowWarning {
                    row,
                    origin_date: transaction.origin_date,
                    origin_period: period,
                };
                log::info!("{warning}");
                let unadjusted = AdjustedTransaction {
                    transaction: transaction.clone(),
                    origin_period: period,
                    origin_index: None,
                    coefficient: 1.0,
                    adjusted_amount: amount,
                    recpam_adjustment: 0.0,
                };
                (unadjusted, Some(warning))
            }
        }
    }
}

/// Result of restating one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub run: AdjustmentRun,
    pub rows: Vec<AdjustedTransaction>,
    pub warnings: Vec<RowWarning>,
}

impl Adjustment {
    pub fn summary(&self) -> Summary {
        Summary::from_rows(&self.rows)
    }
}

/// Restate every transaction to `closing_date`.
///
/// The closing index is resolved first; if it is missing nothing is
/// produced. Rows whose origin period is missing pass through with a
/// coefficient of 1 and are listed in `warnings`.
pub fn adjust(
    transactions: &[Transaction],
    closing_date: NaiveDate,
    table: &IndexTable,
) -> Result<Adjustment> {
    let run = AdjustmentRun::resolve(closing_date, table)?;

    let mut rows = Vec::with_capacity(transactions.len());
    let mut warnings = Vec::new();
    for (i, transaction) in transactions.iter().enumerate() {
        let (adjusted, warning) = run.adjust_row(i + 1, transaction, table);
        rows.push(adjusted);
        warnings.extend(warning);
    }

    log::info!(
        "adjusted {} rows to {} ({} unadjusted)",
        rows.len(),
        closing_date,
        warnings.len()
    );
    Ok(Adjustment {
        run,
        rows,
        warnings,
    })
}
