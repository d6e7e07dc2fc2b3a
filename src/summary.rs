use crate::models::AdjustedTransaction;

/// Totals over one adjusted batch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total_historical: f64,
    pub total_adjusted: f64,
    pub total_recpam: f64,
    /// `(adjusted / historical - 1) * 100`, or 0 when the historical total is 0.
    pub percentage_change: f64,
    pub rows: usize,
    pub unadjusted_rows: usize,
}

impl Summary {
    pub fn from_rows(rows: &[AdjustedTransaction]) -> Self {
        let total_historical: f64 = rows.iter().map(|r| r.transaction.historical_amount).sum();
        let total_adjusted: f64 = rows.iter().map(|r| r.adjusted_amount).sum();
        let total_recpam: f64 = rows.iter().map(|r| r.recpam_adjustment).sum();

        Self {
            total_historical,
            total_adjusted,
            total_recpam,
            percentage_change: percentage_change(total_historical, total_adjusted),
            rows: rows.len(),
            unadjusted_rows: rows.iter().filter(|r| !r.is_adjusted()).count(),
        }
    }
}

pub fn percentage_change(historical: f64, adjusted: f64) -> f64 {
    if historical == 0.0 {
        return 0.0;
    }
    let pct = (adjusted / historical - 1.0) * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}
