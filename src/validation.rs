//! Data-quality checks run once after loading: negative or zero settled amounts and order
//! numbers that appear more than once.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::schema::Field;
use crate::table::OrderTable;

/// How findings are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Off,
    #[default]
    Warn,
    Strict,
}

impl From<orderdash_cli::ValidationArg> for ValidationMode {
    fn from(arg: orderdash_cli::ValidationArg) -> Self {
        match arg {
            orderdash_cli::ValidationArg::Off => ValidationMode::Off,
            orderdash_cli::ValidationArg::Warn => ValidationMode::Warn,
            orderdash_cli::ValidationArg::Strict => ValidationMode::Strict,
        }
    }
}

/// Counts of suspicious rows found in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub negative_amounts: u64,
    pub zero_amounts: u64,
    /// Rows whose order number is shared with at least one other row.
    pub duplicate_order_rows: u64,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.negative_amounts == 0 && self.zero_amounts == 0 && self.duplicate_order_rows == 0
    }

    /// Findings that fail a strict load. Zero amounts are reported but tolerated.
    pub fn has_errors(&self) -> bool {
        self.negative_amounts > 0 || self.duplicate_order_rows > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} negative amount(s), {} zero amount(s), {} row(s) with a duplicate order number",
            self.negative_amounts, self.zero_amounts, self.duplicate_order_rows
        )
    }
}

/// Inspect the table without modifying it.
pub fn inspect(table: &OrderTable) -> Result<ValidationReport> {
    let amount = Field::SettledAmount.name();
    let order_id = Field::OrderId.name();

    let counts = table
        .lazy()
        .select([
            col(amount)
                .lt(lit(0.0))
                .cast(DataType::UInt64)
                .sum()
                .alias("negative"),
            col(amount)
                .eq(lit(0.0))
                .cast(DataType::UInt64)
                .sum()
                .alias("zero"),
        ])
        .collect()?;
    let negative_amounts = first_u64(&counts, "negative")?;
    let zero_amounts = first_u64(&counts, "zero")?;

    let duplicates = table
        .lazy()
        .filter(col(order_id).is_not_null())
        .group_by([col(order_id)])
        .agg([len().cast(DataType::UInt64).alias("rows")])
        .filter(col("rows").gt(lit(1u64)))
        .select([col("rows").sum().alias("rows")])
        .collect()?;
    let duplicate_order_rows = first_u64(&duplicates, "rows")?;

    Ok(ValidationReport {
        negative_amounts,
        zero_amounts,
        duplicate_order_rows,
    })
}

/// Run the checks according to `mode`. `Warn` logs findings, `Strict` rejects the table.
pub fn validate(table: &OrderTable, mode: ValidationMode) -> Result<ValidationReport> {
    if mode == ValidationMode::Off {
        return Ok(ValidationReport::default());
    }
    let report = inspect(table)?;
    if report.is_clean() {
        tracing::debug!(rows = table.height(), "dataset passed validation");
        return Ok(report);
    }
    match mode {
        ValidationMode::Strict if report.has_errors() => {
            Err(DashboardError::Validation(report.summary()))
        }
        _ => {
            tracing::warn!(
                negative = report.negative_amounts,
                zero = report.zero_amounts,
                duplicate_rows = report.duplicate_order_rows,
                "dataset has suspicious rows"
            );
            Ok(report)
        }
    }
}

fn first_u64(df: &DataFrame, name: &str) -> Result<u64> {
    Ok(df.column(name)?.u64()?.get(0).unwrap_or(0))
}
