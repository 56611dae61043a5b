//! The normalized, read-only order table and its typed row view.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::schema::{Field, SellerGroup};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// One order row with every canonical field typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub ordered_at: NaiveDateTime,
    pub order_date: NaiveDate,
    pub seller: String,
    pub seller_group: SellerGroup,
    pub variety: String,
    pub channel: String,
    pub region: String,
    pub repeat_count: i64,
    pub membership: String,
    pub settled_amount: Option<f64>,
    pub payment_amount: Option<f64>,
    pub unit_price: Option<f64>,
    pub supply_price: Option<f64>,
}

/// Column-oriented order table whose layout is checked on construction.
///
/// Cloning is cheap: the underlying columns are reference counted.
#[derive(Debug, Clone)]
pub struct OrderTable {
    df: DataFrame,
}

impl OrderTable {
    /// Wrap a normalized frame, verifying every required column and its dtype.
    pub fn from_frame(df: DataFrame) -> Result<Self> {
        for field in [
            Field::OrderId,
            Field::OrderedAt,
            Field::OrderDate,
            Field::Seller,
            Field::SellerGroup,
            Field::Variety,
            Field::Channel,
            Field::Region,
            Field::RepeatCount,
            Field::Membership,
            Field::SettledAmount,
        ] {
            let column = df.column(field.name()).map_err(|_| {
                DashboardError::InvalidSchema(format!("column '{}' is missing", field))
            })?;
            check_dtype(field, column.dtype())?;
        }
        for field in [Field::PaymentAmount, Field::UnitPrice, Field::SupplyPrice] {
            if let Ok(column) = df.column(field.name()) {
                check_dtype(field, column.dtype())?;
            }
        }
        Ok(Self { df })
    }

    /// Collect a lazy query over an order table back into an order table.
    pub(crate) fn from_lazy(lf: LazyFrame) -> Result<Self> {
        Self::from_frame(lf.collect()?)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Whether an optional column was present in the source.
    pub fn has(&self, field: Field) -> bool {
        self.df.column(field.name()).is_ok()
    }

    /// Materialize typed rows, in table order.
    pub fn records(&self) -> Result<Vec<OrderRecord>> {
        let df = &self.df;
        let order_ids = strings(df, Field::OrderId.name())?;
        let ordered_at = datetimes(df, Field::OrderedAt.name())?;
        let order_dates = dates(df, Field::OrderDate.name())?;
        let sellers = strings(df, Field::Seller.name())?;
        let groups = strings(df, Field::SellerGroup.name())?;
        let varieties = strings(df, Field::Variety.name())?;
        let channels = strings(df, Field::Channel.name())?;
        let regions = strings(df, Field::Region.name())?;
        let repeats = ints(df, Field::RepeatCount.name())?;
        let memberships = strings(df, Field::Membership.name())?;
        let settled = floats(df, Field::SettledAmount.name())?;
        let payment = self.optional_floats(Field::PaymentAmount)?;
        let unit = self.optional_floats(Field::UnitPrice)?;
        let supply = self.optional_floats(Field::SupplyPrice)?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let ordered_at = ordered_at[i].ok_or_else(|| {
                DashboardError::InvalidSchema(format!("row {} has no order timestamp", i))
            })?;
            records.push(OrderRecord {
                order_id: order_ids[i].clone(),
                ordered_at,
                order_date: order_dates[i].unwrap_or_else(|| ordered_at.date()),
                seller: sellers[i].clone(),
                seller_group: SellerGroup::from_key(&groups[i]).unwrap_or(SellerGroup::Other),
                variety: varieties[i].clone(),
                channel: channels[i].clone(),
                region: regions[i].clone(),
                repeat_count: repeats[i],
                membership: memberships[i].clone(),
                settled_amount: settled[i],
                payment_amount: payment.as_ref().and_then(|v| v[i]),
                unit_price: unit.as_ref().and_then(|v| v[i]),
                supply_price: supply.as_ref().and_then(|v| v[i]),
            });
        }
        Ok(records)
    }

    fn optional_floats(&self, field: Field) -> Result<Option<Vec<Option<f64>>>> {
        if self.has(field) {
            Ok(Some(floats(&self.df, field.name())?))
        } else {
            Ok(None)
        }
    }
}

fn check_dtype(field: Field, dtype: &DataType) -> Result<()> {
    let ok = match field {
        Field::OrderedAt => matches!(dtype, DataType::Datetime(_, _)),
        Field::OrderDate => matches!(dtype, DataType::Date),
        Field::RepeatCount => matches!(dtype, DataType::Int64),
        f if f.is_currency() => matches!(dtype, DataType::Float64),
        _ => matches!(dtype, DataType::String),
    };
    if ok {
        Ok(())
    } else {
        Err(DashboardError::InvalidSchema(format!(
            "column '{}' has type {}",
            field, dtype
        )))
    }
}

/// String column values; nulls become empty strings.
pub(crate) fn strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

pub(crate) fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

/// Count columns are produced as UInt64 by every aggregation in this crate.
pub(crate) fn counts(df: &DataFrame, name: &str) -> Result<Vec<u64>> {
    Ok(df
        .column(name)?
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect())
}

pub(crate) fn ints(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    Ok(df
        .column(name)?
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect())
}

pub(crate) fn dates(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let days = df.column(name)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(date_from_epoch_days))
        .collect())
}

/// Datetime columns are normalized to microseconds at load time.
pub(crate) fn datetimes(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let micros = df.column(name)?.cast(&DataType::Int64)?;
    Ok(micros
        .i64()?
        .into_iter()
        .map(|v| {
            v.and_then(chrono::DateTime::from_timestamp_micros)
                .map(|dt| dt.naive_utc())
        })
        .collect())
}

pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_CE_DAYS.checked_add(days)?)
}

/// Days since the Unix epoch, used as the x coordinate of date charts.
pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS
}



#[cfg(test)]
mod tests {
    use super::test_support::{table, TestOrder};
    use super::*;

    #[test]
    fn test_from_frame_rejects_missing_columns() {
        let df = df!("order_id" => &["1"]).unwrap();
        let err = OrderTable::from_frame(df).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSchema(_)));
    }

    #[test]
    fn test_records_are_typed() {
        let t = table(&[TestOrder {
            order_id: "A-1",
            ordered_at: "2024-03-05 17:45:10",
            seller: "킹댕즈",
            amount: 12000.0,
            repeat_count: 2,
            ..Default::default()
        }]);
        let records = t.records().unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.order_id, "A-1");
        assert_eq!(r.seller_group, SellerGroup::Reserved);
        assert_eq!(r.order_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(r.ordered_at.format("%H:%M:%S").to_string(), "17:45:10");
        assert_eq!(r.settled_amount, Some(12000.0));
        assert_eq!(r.repeat_count, 2);
        assert_eq!(r.payment_amount, None);
        assert!(!t.has(Field::PaymentAmount));
    }

    #[test]
    fn test_epoch_days_round_trip() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date_from_epoch_days(epoch_days(d)), Some(d));
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
    }
}
