//! Reads the order dataset and normalizes it into an [`OrderTable`].
//!
//! Normalization maps the configured source headers onto canonical columns, coerces currency
//! text such as `"12,000"` to `f64`, parses the order timestamp and derives `order_date` and
//! `seller_group`. Columns the header mapping does not mention are dropped.

use polars::prelude::*;
use std::path::Path;

use crate::config::{AppConfig, ColumnConfig};
use crate::error::{DashboardError, Result};
use crate::schema::{Field, SellerGroup};
use crate::table::OrderTable;

const WHITESPACE: &str = " \t\n\r";

/// Everything needed to read and normalize one dataset file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub columns: ColumnConfig,
    pub reserved_seller: String,
    pub delimiter: u8,
    /// strftime format of the order timestamp; inferred from the first value when unset
    pub timestamp_format: Option<String>,
    /// Rows scanned to infer column types. `None` scans the whole file.
    pub infer_schema_length: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl LoadOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            reserved_seller: config.grouping.reserved_seller.clone(),
            delimiter: config.data.delimiter.unwrap_or(b','),
            timestamp_format: config.data.timestamp_format.clone(),
            infer_schema_length: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Read and normalize the dataset at `path`.
pub fn load_orders(path: &Path, options: &LoadOptions) -> Result<OrderTable> {
    let raw = read_csv(path, options)?;
    tracing::debug!(
        path = %path.display(),
        rows = raw.height(),
        columns = raw.width(),
        "parsed dataset file"
    );
    let table = normalize(raw, options)?;
    tracing::info!(path = %path.display(), rows = table.height(), "loaded order dataset");
    Ok(table)
}

/// Parse a delimited file with a header row. Values are typed by inference.
pub fn read_csv(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let delimiter = options.delimiter;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|opts| opts.with_separator(delimiter))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Map source headers to canonical columns, coerce types and derive the grouping columns.
pub fn normalize(raw: DataFrame, options: &LoadOptions) -> Result<OrderTable> {
    let mut present = Vec::with_capacity(Field::SOURCE.len());
    for field in Field::SOURCE {
        let header = options.columns.header(field);
        if raw.column(header).is_ok() {
            present.push(field);
        } else if field.is_required() {
            return Err(DashboardError::MissingColumn {
                field: field.name(),
                header: header.to_string(),
            });
        } else {
            tracing::debug!(field = %field, header, "optional column absent, skipping");
        }
    }

    let renamed: Vec<Expr> = present
        .iter()
        .map(|&field| col(options.columns.header(field)).alias(field.name()))
        .collect();
    let mut df = raw.lazy().select(renamed).collect()?;

    for &field in present.iter().filter(|f| f.is_currency()) {
        df = coerce_amount(df, field, options.columns.header(field))?;
    }
    df = parse_timestamp(df, options.timestamp_format.as_deref())?;

    let mut exprs: Vec<Expr> = [
        Field::OrderId,
        Field::Seller,
        Field::Variety,
        Field::Channel,
        Field::Region,
        Field::Membership,
    ]
    .iter()
    .map(|f| col(f.name()).cast(DataType::String).alias(f.name()))
    .collect();
    exprs.push(repeat_count_expr(df.column(Field::RepeatCount.name())?.dtype()));
    exprs.push(
        col(Field::OrderedAt.name())
            .dt()
            .date()
            .alias(Field::OrderDate.name()),
    );
    exprs.push(seller_group_expr(&options.reserved_seller));

    let df = df.lazy().with_columns(exprs).collect()?;
    OrderTable::from_frame(df)
}

/// `seller_group` as the stored group key. A missing seller name falls into the other group.
pub(crate) fn seller_group_expr(reserved_seller: &str) -> Expr {
    when(col(Field::Seller.name()).eq(lit(reserved_seller)))
        .then(lit(SellerGroup::Reserved.key()))
        .otherwise(lit(SellerGroup::Other.key()))
        .alias(Field::SellerGroup.name())
}

/// Trimmed text with blanks turned into nulls.
fn trimmed_text(name: &str) -> Expr {
    let trimmed = col(name)
        .str()
        .strip_chars(lit(PlSmallStr::from_static(WHITESPACE)));
    when(trimmed.clone().eq(lit(PlSmallStr::from_static(""))))
        .then(Null {}.lit())
        .otherwise(trimmed)
}

fn repeat_count_expr(dtype: &DataType) -> Expr {
    let name = Field::RepeatCount.name();
    let base = match dtype {
        DataType::String => trimmed_text(name).strict_cast(DataType::Int64),
        DataType::Float32 | DataType::Float64 => col(name).cast(DataType::Int64),
        _ => col(name).strict_cast(DataType::Int64),
    };
    base.fill_null(lit(0i64)).alias(name)
}

/// Text amounts lose their thousands separators; numeric amounts are widened to `f64`.
fn coerce_amount(df: DataFrame, field: Field, header: &str) -> Result<DataFrame> {
    let name = field.name();
    let expr = match df.column(name)?.dtype() {
        DataType::String => trimmed_text(name)
            .str()
            .replace_all(lit(","), lit(""), true)
            .strict_cast(DataType::Float64),
        _ => col(name).strict_cast(DataType::Float64),
    };
    df.lazy()
        .with_column(expr.alias(name))
        .collect()
        .map_err(|e| DashboardError::InvalidAmount {
            column: header.to_string(),
            message: e.to_string(),
        })
}

/// Parse `ordered_at` into a microsecond datetime. Every row must end up with a value.
fn parse_timestamp(df: DataFrame, format: Option<&str>) -> Result<DataFrame> {
    let name = Field::OrderedAt.name();
    let target = DataType::Datetime(TimeUnit::Microseconds, None);
    let expr = match df.column(name)?.dtype() {
        DataType::String => {
            let opts = StrptimeOptions {
                format: format.map(PlSmallStr::from),
                strict: true,
                exact: true,
                cache: true,
            };
            trimmed_text(name).str().to_datetime(
                Some(TimeUnit::Microseconds),
                None,
                opts,
                lit(PlSmallStr::from_static("raise")),
            )
        }
        DataType::Datetime(_, _) | DataType::Date => col(name).cast(target),
        other => {
            return Err(DashboardError::InvalidTimestamp {
                message: format!("column has type {} instead of text or datetime", other),
            })
        }
    };
    let parsed = df
        .lazy()
        .with_column(expr.alias(name))
        .collect()
        .map_err(|e| DashboardError::InvalidTimestamp {
            message: e.to_string(),
        })?;
    let missing = parsed.column(name)?.null_count();
    if missing > 0 {
        return Err(DashboardError::InvalidTimestamp {
            message: format!("{} row(s) have no order timestamp", missing),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::{options, raw_frame, TestOrder};
    use crate::table::{floats, ints, strings};

    fn headers() -> ColumnConfig {
        ColumnConfig::default()
    }

    #[test]
    fn test_normalize_maps_headers_and_derives_columns() {
        let table = normalize(
            raw_frame(&[
                TestOrder {
                    seller: "킹댕즈",
                    amount: 30000.0,
                    ..Default::default()
                },
                TestOrder {
                    order_id: "2",
                    seller: "A",
                    amount: 10000.0,
                    ..Default::default()
                },
            ]),
            &options(),
        )
        .unwrap();
        let df = table.frame();
        assert_eq!(
            strings(df, Field::SellerGroup.name()).unwrap(),
            vec!["reserved", "other"]
        );
        assert_eq!(
            floats(df, Field::SettledAmount.name()).unwrap(),
            vec![Some(30000.0), Some(10000.0)]
        );
        assert!(df.column(Field::OrderDate.name()).is_ok());
        assert!(df.column("실결제 금액").is_err());
    }

    #[test]
    fn test_currency_text_is_coerced() {
        let h = headers();
        let raw = df!(
            h.header(Field::OrderId) => &["1", "2", "3"],
            h.header(Field::OrderedAt) => &["2024-03-01 10:00:00", "2024-03-02 11:00:00", "2024-03-02 12:00:00"],
            h.header(Field::Seller) => &["A", "B", "C"],
            h.header(Field::Variety) => &["감귤", "한라봉", "감귤"],
            h.header(Field::Channel) => &["web", "app", "web"],
            h.header(Field::Region) => &["서울특별시", "부산광역시", "서울특별시"],
            h.header(Field::RepeatCount) => &[0i64, 1, 2],
            h.header(Field::Membership) => &["회원", "비회원", "회원"],
            h.header(Field::SettledAmount) => &["12,000", " 3,500 ", ""],
            h.header(Field::UnitPrice) => &[1000.0, 2000.0, 3000.0]
        )
        .unwrap();
        let table = normalize(raw, &options()).unwrap();
        let df = table.frame();
        assert_eq!(
            floats(df, Field::SettledAmount.name()).unwrap(),
            vec![Some(12000.0), Some(3500.0), None]
        );
        assert!(table.has(Field::UnitPrice));
        assert!(!table.has(Field::PaymentAmount));
    }

    #[test]
    fn test_bad_amount_is_reported_with_header() {
        let mut raw = raw_frame(&[TestOrder::default()]);
        raw.with_column(Column::new(
            "결제금액".into(),
            &["twelve thousand"],
        ))
        .unwrap();
        let err = normalize(raw, &options()).unwrap_err();
        match err {
            DashboardError::InvalidAmount { column, .. } => assert_eq!(column, "결제금액"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let raw = raw_frame(&[TestOrder::default()])
            .drop("셀러명")
            .unwrap();
        let err = normalize(raw, &options()).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::MissingColumn { field: "seller", .. }
        ));
    }

    #[test]
    fn test_unparseable_timestamp_is_fatal() {
        let raw = raw_frame(&[
            TestOrder::default(),
            TestOrder {
                order_id: "2",
                ordered_at: "not a date",
                ..Default::default()
            },
        ]);
        let err = normalize(raw, &options()).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_blank_timestamp_is_fatal() {
        let raw = raw_frame(&[
            TestOrder::default(),
            TestOrder {
                order_id: "2",
                ordered_at: "  ",
                ..Default::default()
            },
        ]);
        let err = normalize(raw, &options()).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_explicit_timestamp_format() {
        let raw = raw_frame(&[TestOrder {
            ordered_at: "01/03/2024 08:30",
            ..Default::default()
        }]);
        let mut opts = options();
        opts.timestamp_format = Some("%d/%m/%Y %H:%M".to_string());
        let table = normalize(raw, &opts).unwrap();
        let records = table.records().unwrap();
        assert_eq!(records[0].order_date.to_string(), "2024-03-01");
    }

    #[test]
    fn test_missing_seller_falls_into_other_group() {
        let h = headers();
        let raw = df!(
            h.header(Field::OrderId) => &["1"],
            h.header(Field::OrderedAt) => &["2024-03-01 10:00:00"],
            h.header(Field::Seller) => &[None::<&str>],
            h.header(Field::Variety) => &["감귤"],
            h.header(Field::Channel) => &["web"],
            h.header(Field::Region) => &["서울특별시"],
            h.header(Field::RepeatCount) => &[None::<i64>],
            h.header(Field::Membership) => &["회원"],
            h.header(Field::SettledAmount) => &[100.0]
        )
        .unwrap();
        let table = normalize(raw, &options()).unwrap();
        let df = table.frame();
        assert_eq!(strings(df, Field::SellerGroup.name()).unwrap(), vec!["other"]);
        assert_eq!(ints(df, Field::RepeatCount.name()).unwrap(), vec![0]);
    }

    #[test]
    fn test_read_csv_with_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(
            &path,
            "주문번호;주문일;셀러명;품종;주문경로;광역지역(정식);재구매 횟수;회원구분;실결제 금액\n\
             1;2024-03-01 10:00:00;킹댕즈;감귤;web;서울특별시;0;회원;\"1,500\"\n",
        )
        .unwrap();
        let opts = options().with_delimiter(b';');
        let table = load_orders(&path, &opts).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(
            floats(table.frame(), Field::SettledAmount.name()).unwrap(),
            vec![Some(1500.0)]
        );
    }
}
