//! The catalog of aggregation views behind the dashboard charts and tables.
//!
//! Every view is a pure function of an (already filtered) order table. Rows whose grouping key
//! is null are left out of the view, and every sort falls back to the grouping keys in
//! ascending order so repeated runs give identical output.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use crate::config::ViewConfig;
use crate::error::Result;
use crate::metrics::share;
use crate::schema::{Field, SellerGroup, VisitorType};
use crate::table::{counts, dates, floats, strings, OrderRecord, OrderTable};

const REVENUE: &str = "revenue";
const ORDERS: &str = "orders";
const REPEATS: &str = "repeat_orders";
const RATE: &str = "repeat_rate";
const AVERAGE: &str = "average";

/// Row limits and thresholds of the views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewLimits {
    pub top_varieties: usize,
    pub top_sellers: usize,
    pub top_seller_table: usize,
    pub loyalty_min_orders: u64,
    pub loyalty_top: usize,
    pub region_combos: usize,
    pub preview_rows: usize,
    pub detail_channels: Vec<String>,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self::from(&ViewConfig::default())
    }
}

impl From<&ViewConfig> for ViewLimits {
    fn from(config: &ViewConfig) -> Self {
        Self {
            top_varieties: config.top_varieties,
            top_sellers: config.top_sellers,
            top_seller_table: config.top_seller_table,
            loyalty_min_orders: config.loyalty_min_orders,
            loyalty_top: config.loyalty_top,
            region_combos: config.region_combos,
            preview_rows: config.preview_rows,
            detail_channels: config.detail_channels.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub group: SellerGroup,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelShare {
    pub channel: String,
    pub revenue: f64,
    /// Percentage of the revenue of all channels in the view.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAverage {
    pub channel: String,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: String,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarietyCount {
    pub variety: String,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerRevenue {
    pub seller: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerLoyalty {
    pub seller: String,
    pub orders: u64,
    pub repeat_orders: u64,
    pub repeat_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRevenue {
    pub region: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSellerRevenue {
    pub channel: String,
    pub seller: String,
    pub revenue: f64,
}

/// New and returning order counts of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorMix {
    pub channel: String,
    pub new: u64,
    pub returning: u64,
}

impl VisitorMix {
    pub fn count(&self, visitor: VisitorType) -> u64 {
        match visitor {
            VisitorType::New => self.new,
            VisitorType::Returning => self.returning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipCount {
    pub channel: String,
    pub membership: String,
    pub orders: u64,
}

/// Sort by `(column, descending)` keys; nulls last, ties keep their order.
fn sorted(lf: LazyFrame, keys: &[(&str, bool)]) -> LazyFrame {
    let options = SortMultipleOptions {
        descending: keys.iter().map(|(_, desc)| *desc).collect(),
        nulls_last: vec![true; keys.len()],
        maintain_order: true,
        ..Default::default()
    };
    lf.sort_by_exprs(keys.iter().map(|(k, _)| col(*k)).collect::<Vec<_>>(), options)
}

fn not_null(fields: &[Field]) -> Expr {
    fields
        .iter()
        .map(|f| col(f.name()).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true))
}

fn revenue_sum() -> Expr {
    col(Field::SettledAmount.name()).sum().alias(REVENUE)
}

/// Sum of revenue per key, highest first.
fn revenue_by(table: &OrderTable, key: Field) -> Result<DataFrame> {
    let lf = table
        .lazy()
        .filter(not_null(&[key]))
        .group_by([col(key.name())])
        .agg([revenue_sum()]);
    Ok(sorted(lf, &[(REVENUE, true), (key.name(), false)]).collect()?)
}

/// `channel IN channels`, or `None` when no channel is listed.
fn channel_in(channels: &[String]) -> Option<Expr> {
    channels
        .iter()
        .map(|c| col(Field::Channel.name()).eq(lit(c.as_str())))
        .reduce(|acc, e| acc.or(e))
}

/// Revenue per day and seller group, in date order.
pub fn daily_revenue(table: &OrderTable) -> Result<Vec<DailyRevenue>> {
    let date = Field::OrderDate.name();
    let group = Field::SellerGroup.name();
    let lf = table
        .lazy()
        .group_by([col(date), col(group)])
        .agg([revenue_sum()]);
    let df = sorted(lf, &[(date, false), (group, false)]).collect()?;

    let days = dates(&df, date)?;
    let groups = strings(&df, group)?;
    let revenue = floats(&df, REVENUE)?;
    Ok(days
        .into_iter()
        .zip(groups)
        .zip(revenue)
        .filter_map(|((day, group), revenue)| {
            Some(DailyRevenue {
                date: day?,
                group: SellerGroup::from_key(&group)?,
                revenue: revenue.unwrap_or(0.0),
            })
        })
        .collect())
}

/// Revenue per channel and its share of the total, by channel name.
pub fn channel_share(table: &OrderTable) -> Result<Vec<ChannelShare>> {
    let channel = Field::Channel.name();
    let lf = table
        .lazy()
        .filter(not_null(&[Field::Channel]))
        .group_by([col(channel)])
        .agg([revenue_sum()]);
    let df = sorted(lf, &[(channel, false)]).collect()?;

    let channels = strings(&df, channel)?;
    let revenue: Vec<f64> = floats(&df, REVENUE)?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    let total: f64 = revenue.iter().sum();
    Ok(channels
        .into_iter()
        .zip(revenue)
        .map(|(channel, revenue)| ChannelShare {
            channel,
            revenue,
            share: if total == 0.0 {
                0.0
            } else {
                100.0 * revenue / total
            },
        })
        .collect())
}

/// Average order value per channel, highest first.
pub fn channel_average(table: &OrderTable) -> Result<Vec<ChannelAverage>> {
    let channel = Field::Channel.name();
    let lf = table
        .lazy()
        .filter(not_null(&[Field::Channel]))
        .group_by([col(channel)])
        .agg([col(Field::SettledAmount.name()).mean().alias(AVERAGE)]);
    let df = sorted(lf, &[(AVERAGE, true), (channel, false)]).collect()?;

    Ok(strings(&df, channel)?
        .into_iter()
        .zip(floats(&df, AVERAGE)?)
        .map(|(channel, average)| ChannelAverage { channel, average })
        .collect())
}

/// Revenue and order count per channel, by revenue.
pub fn channel_summary(table: &OrderTable) -> Result<Vec<ChannelSummary>> {
    let channel = Field::Channel.name();
    let lf = table
        .lazy()
        .filter(not_null(&[Field::Channel]))
        .group_by([col(channel)])
        .agg([
            revenue_sum(),
            col(Field::OrderId.name())
                .count()
                .cast(DataType::UInt64)
                .alias(ORDERS),
        ]);
    let df = sorted(lf, &[(REVENUE, true), (channel, false)]).collect()?;

    Ok(strings(&df, channel)?
        .into_iter()
        .zip(floats(&df, REVENUE)?)
        .zip(counts(&df, ORDERS)?)
        .map(|((channel, revenue), orders)| ChannelSummary {
            channel,
            revenue: revenue.unwrap_or(0.0),
            orders,
        })
        .collect())
}

/// Most ordered varieties.
pub fn top_varieties(table: &OrderTable, limit: usize) -> Result<Vec<VarietyCount>> {
    let variety = Field::Variety.name();
    let lf = table
        .lazy()
        .filter(not_null(&[Field::Variety]))
        .group_by([col(variety)])
        .agg([len().cast(DataType::UInt64).alias(ORDERS)]);
    let df = sorted(lf, &[(ORDERS, true), (variety, false)])
        .limit(limit as IdxSize)
        .collect()?;

    Ok(strings(&df, variety)?
        .into_iter()
        .zip(counts(&df, ORDERS)?)
        .map(|(variety, orders)| VarietyCount { variety, orders })
        .collect())
}

/// Sellers with the highest revenue.
pub fn top_sellers(table: &OrderTable, limit: usize) -> Result<Vec<SellerRevenue>> {
    let df = revenue_by(table, Field::Seller)?.head(Some(limit));
    Ok(strings(&df, Field::Seller.name())?
        .into_iter()
        .zip(floats(&df, REVENUE)?)
        .map(|(seller, revenue)| SellerRevenue {
            seller,
            revenue: revenue.unwrap_or(0.0),
        })
        .collect())
}

/// Leading rows of the top-seller ranking, for the table next to the chart.
pub fn top_seller_table(top_sellers: &[SellerRevenue], rows: usize) -> Vec<SellerRevenue> {
    top_sellers.iter().take(rows).cloned().collect()
}

/// Sellers with at least `min_orders` orders, ranked by the share of repeat purchases.
pub fn loyal_sellers(
    table: &OrderTable,
    min_orders: u64,
    limit: usize,
) -> Result<Vec<SellerLoyalty>> {
    let seller = Field::Seller.name();
    let lf = table
        .lazy()
        .filter(not_null(&[Field::Seller]))
        .group_by([col(seller)])
        .agg([
            len().cast(DataType::UInt64).alias(ORDERS),
            col(Field::RepeatCount.name())
                .gt(lit(0i64))
                .cast(DataType::UInt64)
                .sum()
                .alias(REPEATS),
        ])
        .filter(col(ORDERS).gt_eq(lit(min_orders)))
        .with_column(
            (col(REPEATS).cast(DataType::Float64) * lit(100.0)
                / col(ORDERS).cast(DataType::Float64))
            .alias(RATE),
        );
    let df = sorted(lf, &[(RATE, true), (ORDERS, true), (seller, false)])
        .limit(limit as IdxSize)
        .collect()?;

    let sellers = strings(&df, seller)?;
    let orders = counts(&df, ORDERS)?;
    let repeats = counts(&df, REPEATS)?;
    Ok(sellers
        .into_iter()
        .zip(orders)
        .zip(repeats)
        .map(|((seller, orders), repeat_orders)| SellerLoyalty {
            seller,
            orders,
            repeat_orders,
            repeat_rate: share(repeat_orders, orders),
        })
        .collect())
}

/// Revenue per region, highest first.
pub fn regional_revenue(table: &OrderTable) -> Result<Vec<RegionRevenue>> {
    let df = revenue_by(table, Field::Region)?;
    Ok(strings(&df, Field::Region.name())?
        .into_iter()
        .zip(floats(&df, REVENUE)?)
        .map(|(region, revenue)| RegionRevenue {
            region,
            revenue: revenue.unwrap_or(0.0),
        })
        .collect())
}

/// The requested region when the regional view has it, otherwise its first (highest) region.
pub fn resolve_region(regions: &[RegionRevenue], requested: Option<&str>) -> Option<String> {
    requested
        .and_then(|name| regions.iter().find(|r| r.region == name))
        .or_else(|| regions.first())
        .map(|r| r.region.clone())
}

/// Best channel and seller combinations within one region.
pub fn region_combos(
    table: &OrderTable,
    region: &str,
    limit: usize,
) -> Result<Vec<ChannelSellerRevenue>> {
    let channel = Field::Channel.name();
    let seller = Field::Seller.name();
    let lf = table
        .lazy()
        .filter(col(Field::Region.name()).eq(lit(region)))
        .filter(not_null(&[Field::Channel, Field::Seller]))
        .group_by([col(channel), col(seller)])
        .agg([revenue_sum()]);
    let df = sorted(lf, &[(REVENUE, true), (channel, false), (seller, false)])
        .limit(limit as IdxSize)
        .collect()?;

    Ok(strings(&df, channel)?
        .into_iter()
        .zip(strings(&df, seller)?)
        .zip(floats(&df, REVENUE)?)
        .map(|((channel, seller), revenue)| ChannelSellerRevenue {
            channel,
            seller,
            revenue: revenue.unwrap_or(0.0),
        })
        .collect())
}

/// New versus returning orders for each detail channel, zero filled.
pub fn visitor_mix(table: &OrderTable, channels: &[String]) -> Result<Vec<VisitorMix>> {
    let Some(in_channels) = channel_in(channels) else {
        return Ok(Vec::new());
    };
    let channel = Field::Channel.name();
    let repeat = col(Field::RepeatCount.name());
    let new = VisitorType::New.label();
    let returning = VisitorType::Returning.label();
    let lf = table
        .lazy()
        .filter(in_channels)
        .group_by([col(channel)])
        .agg([
            repeat
                .clone()
                .eq(lit(0i64))
                .cast(DataType::UInt64)
                .sum()
                .alias(new),
            repeat
                .neq(lit(0i64))
                .cast(DataType::UInt64)
                .sum()
                .alias(returning),
        ]);
    let df = sorted(lf, &[(channel, false)]).collect()?;

    Ok(strings(&df, channel)?
        .into_iter()
        .zip(counts(&df, new)?)
        .zip(counts(&df, returning)?)
        .map(|((channel, new), returning)| VisitorMix {
            channel,
            new,
            returning,
        })
        .collect())
}

/// Order counts per detail channel and membership status.
pub fn membership_mix(table: &OrderTable, channels: &[String]) -> Result<Vec<MembershipCount>> {
    let Some(in_channels) = channel_in(channels) else {
        return Ok(Vec::new());
    };
    let channel = Field::Channel.name();
    let membership = Field::Membership.name();
    let lf = table
        .lazy()
        .filter(in_channels)
        .filter(not_null(&[Field::Membership]))
        .group_by([col(channel), col(membership)])
        .agg([len().cast(DataType::UInt64).alias(ORDERS)]);
    let df = sorted(lf, &[(channel, false), (membership, false)]).collect()?;

    Ok(strings(&df, channel)?
        .into_iter()
        .zip(strings(&df, membership)?)
        .zip(counts(&df, ORDERS)?)
        .map(|((channel, membership), orders)| MembershipCount {
            channel,
            membership,
            orders,
        })
        .collect())
}

/// Most recent orders first.
pub fn raw_preview(table: &OrderTable, rows: usize) -> Result<Vec<OrderRecord>> {
    let lf = sorted(table.lazy(), &[(Field::OrderedAt.name(), true)]).limit(rows as IdxSize);
    OrderTable::from_lazy(lf)?.records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::{table, TestOrder};

    fn order(
        order_id: &'static str,
        seller: &'static str,
        channel: &'static str,
        amount: f64,
    ) -> TestOrder {
        TestOrder {
            order_id,
            seller,
            channel,
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_revenue_by_group() {
        let t = table(&[
            TestOrder {
                ordered_at: "2024-03-02 09:00:00",
                seller: "킹댕즈",
                amount: 10.0,
                ..Default::default()
            },
            TestOrder {
                ordered_at: "2024-03-01 09:00:00",
                amount: 5.0,
                ..Default::default()
            },
            TestOrder {
                ordered_at: "2024-03-01 18:30:00",
                amount: 7.0,
                ..Default::default()
            },
        ]);
        let daily = daily_revenue(&t).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(daily[0].group, SellerGroup::Other);
        assert_eq!(daily[0].revenue, 12.0);
        assert_eq!(daily[1].group, SellerGroup::Reserved);
    }

    #[test]
    fn test_channel_views() {
        let t = table(&[
            order("1", "A", "web", 100.0),
            order("2", "A", "web", 300.0),
            order("3", "B", "app", 600.0),
        ]);
        let shares = channel_share(&t).unwrap();
        assert_eq!(shares[0].channel, "app");
        assert!((shares[0].share - 60.0).abs() < 1e-9);
        assert!((shares.iter().map(|s| s.share).sum::<f64>() - 100.0).abs() < 1e-9);

        let averages = channel_average(&t).unwrap();
        assert_eq!(averages[0].channel, "app");
        assert_eq!(averages[1].average, Some(200.0));

        let summary = channel_summary(&t).unwrap();
        assert_eq!(summary[0].channel, "app");
        assert_eq!(summary[1].orders, 2);
        assert_eq!(summary[1].revenue, 400.0);
    }

    #[test]
    fn test_zero_revenue_share() {
        let t = table(&[order("1", "A", "web", 0.0)]);
        assert_eq!(channel_share(&t).unwrap()[0].share, 0.0);
    }

    #[test]
    fn test_top_sellers_limit_and_order() {
        let t = table(&[
            order("1", "A", "web", 10.0),
            order("2", "B", "web", 30.0),
            order("3", "C", "web", 20.0),
            order("4", "D", "web", 30.0),
        ]);
        let top = top_sellers(&t, 3).unwrap();
        let names: Vec<_> = top.iter().map(|s| s.seller.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "C"]);
        assert_eq!(top_seller_table(&top, 2).len(), 2);
        assert_eq!(top_seller_table(&top, 10).len(), 3);
    }

    #[test]
    fn test_top_varieties() {
        let t = table(&[
            TestOrder {
                variety: "한라봉",
                ..Default::default()
            },
            TestOrder {
                variety: "감귤",
                ..Default::default()
            },
            TestOrder {
                variety: "한라봉",
                ..Default::default()
            },
        ]);
        let top = top_varieties(&t, 1).unwrap();
        assert_eq!(
            top,
            vec![VarietyCount {
                variety: "한라봉".to_string(),
                orders: 2
            }]
        );
    }

    #[test]
    fn test_loyalty_threshold() {
        let mut rows = Vec::new();
        // A: 3 orders, 1 repeat. B: 2 orders, 2 repeats. C: 3 orders, none repeat.
        for (seller, repeat) in [
            ("A", 0),
            ("A", 0),
            ("A", 1),
            ("B", 1),
            ("B", 2),
            ("C", 0),
            ("C", 0),
            ("C", 0),
        ] {
            rows.push(TestOrder {
                seller,
                repeat_count: repeat,
                ..Default::default()
            });
        }
        let t = table(&rows);
        let loyal = loyal_sellers(&t, 3, 10).unwrap();
        let names: Vec<_> = loyal.iter().map(|s| s.seller.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!((loyal[0].repeat_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(loyal[1].repeat_rate, 0.0);
        assert!(loyal.iter().all(|s| s.orders >= 3));
    }

    #[test]
    fn test_region_combos_with_single_combination() {
        let t = table(&[
            TestOrder {
                region: "제주특별자치도",
                channel: "web",
                seller: "A",
                amount: 50.0,
                ..Default::default()
            },
            TestOrder {
                region: "서울특별시",
                channel: "app",
                seller: "B",
                amount: 80.0,
                ..Default::default()
            },
        ]);
        let combos = region_combos(&t, "제주특별자치도", 5).unwrap();
        assert_eq!(
            combos,
            vec![ChannelSellerRevenue {
                channel: "web".to_string(),
                seller: "A".to_string(),
                revenue: 50.0
            }]
        );
        assert!(region_combos(&t, "부산광역시", 5).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_region() {
        let regions = vec![
            RegionRevenue {
                region: "서울특별시".to_string(),
                revenue: 2.0,
            },
            RegionRevenue {
                region: "부산광역시".to_string(),
                revenue: 1.0,
            },
        ];
        assert_eq!(
            resolve_region(&regions, Some("부산광역시")).as_deref(),
            Some("부산광역시")
        );
        assert_eq!(
            resolve_region(&regions, Some("없는 지역")).as_deref(),
            Some("서울특별시")
        );
        assert_eq!(resolve_region(&[], None), None);
    }

    #[test]
    fn test_visitor_mix_zero_fills() {
        let t = table(&[
            TestOrder {
                channel: "기타",
                repeat_count: 0,
                ..Default::default()
            },
            TestOrder {
                channel: "크롬",
                repeat_count: 2,
                ..Default::default()
            },
            TestOrder {
                channel: "web",
                repeat_count: 0,
                ..Default::default()
            },
        ]);
        let channels = vec!["기타".to_string(), "크롬".to_string()];
        let mix = visitor_mix(&t, &channels).unwrap();
        assert_eq!(mix.len(), 2);
        let other = mix.iter().find(|m| m.channel == "기타").unwrap();
        assert_eq!((other.new, other.returning), (1, 0));
        let chrome = mix.iter().find(|m| m.channel == "크롬").unwrap();
        assert_eq!(chrome.count(VisitorType::Returning), 1);
        assert_eq!(chrome.count(VisitorType::New), 0);
        assert!(visitor_mix(&t, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_membership_mix() {
        let t = table(&[
            TestOrder {
                channel: "기타",
                membership: "회원",
                ..Default::default()
            },
            TestOrder {
                channel: "기타",
                membership: "비회원",
                ..Default::default()
            },
            TestOrder {
                channel: "기타",
                membership: "회원",
                ..Default::default()
            },
        ]);
        let mix = membership_mix(&t, &["기타".to_string()]).unwrap();
        assert_eq!(mix.len(), 2);
        let members = mix.iter().find(|m| m.membership == "회원").unwrap();
        assert_eq!(members.orders, 2);
    }

    #[test]
    fn test_raw_preview_is_newest_first() {
        let t = table(&[
            TestOrder {
                order_id: "old",
                ordered_at: "2024-01-01 00:00:00",
                ..Default::default()
            },
            TestOrder {
                order_id: "new",
                ordered_at: "2024-05-01 00:00:00",
                ..Default::default()
            },
            TestOrder {
                order_id: "mid",
                ordered_at: "2024-03-01 00:00:00",
                ..Default::default()
            },
        ]);
        let preview = raw_preview(&t, 2).unwrap();
        let ids: Vec<_> = preview.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }
}
