//! The four headline numbers of the dashboard.

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::schema::Field;
use crate::table::{counts, floats, OrderTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_revenue: f64,
    pub order_count: u64,
    /// `None` when there is no order (or no amount) to average.
    pub average_order_value: Option<f64>,
    /// Percentage of orders with a repeat-purchase count above zero, in `[0, 100]`.
    pub repeat_share: f64,
}

pub fn compute(table: &OrderTable) -> Result<Metrics> {
    let amount = Field::SettledAmount.name();
    let df = table
        .lazy()
        .select([
            col(amount).sum().alias("total"),
            col(amount).mean().alias("mean"),
            len().cast(DataType::UInt64).alias("orders"),
            col(Field::RepeatCount.name())
                .gt(lit(0i64))
                .cast(DataType::UInt64)
                .sum()
                .alias("repeats"),
        ])
        .collect()?;

    let total_revenue = floats(&df, "total")?
        .first()
        .copied()
        .flatten()
        .unwrap_or(0.0);
    let average_order_value = floats(&df, "mean")?
        .first()
        .copied()
        .flatten()
        .filter(|v| v.is_finite());
    let order_count = counts(&df, "orders")?.first().copied().unwrap_or(0);
    let repeats = counts(&df, "repeats")?.first().copied().unwrap_or(0);

    Ok(Metrics {
        total_revenue,
        order_count,
        average_order_value,
        repeat_share: share(repeats, order_count),
    })
}

/// `100 * part / whole`, or 0 for an empty whole.
pub(crate) fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
