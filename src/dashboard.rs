//! One pass of the dashboard: filter the base table, then compute the metrics and every view.

use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::filter::{filter_by_groups, GroupSelection};
use crate::metrics::{self, Metrics};
use crate::schema::SellerGroup;
use crate::table::{OrderRecord, OrderTable};
use crate::views::{self, *};

/// User controls that drive a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selections {
    pub groups: GroupSelection,
    /// Region for the best-combination view. `None` picks the top region.
    pub region: Option<String>,
}

/// Everything the presentation layer shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResults {
    pub groups: Vec<SellerGroup>,
    pub metrics: Metrics,
    pub daily_revenue: Vec<DailyRevenue>,
    pub channel_share: Vec<ChannelShare>,
    pub channel_average: Vec<ChannelAverage>,
    pub channel_summary: Vec<ChannelSummary>,
    pub top_varieties: Vec<VarietyCount>,
    pub top_sellers: Vec<SellerRevenue>,
    pub top_seller_table: Vec<SellerRevenue>,
    pub loyal_sellers: Vec<SellerLoyalty>,
    pub regional_revenue: Vec<RegionRevenue>,
    /// Region the combination view was computed for
    pub selected_region: Option<String>,
    pub region_combos: Vec<ChannelSellerRevenue>,
    pub visitor_mix: Vec<VisitorMix>,
    pub membership_mix: Vec<MembershipCount>,
    pub raw_preview: Vec<OrderRecord>,
}

impl ViewResults {
    /// Position of the selected region in the regional view.
    pub fn selected_region_index(&self) -> Option<usize> {
        let selected = self.selected_region.as_deref()?;
        self.regional_revenue
            .iter()
            .position(|r| r.region == selected)
    }
}

/// Compute metrics and views over an already filtered table.
pub fn render(
    filtered: &OrderTable,
    selections: &Selections,
    limits: &ViewLimits,
) -> Result<ViewResults> {
    let top_sellers = views::top_sellers(filtered, limits.top_sellers)?;
    let regional_revenue = views::regional_revenue(filtered)?;
    let selected_region = resolve_region(&regional_revenue, selections.region.as_deref());
    let region_combos = match &selected_region {
        Some(region) => views::region_combos(filtered, region, limits.region_combos)?,
        None => Vec::new(),
    };

    Ok(ViewResults {
        groups: selections.groups.groups(),
        metrics: metrics::compute(filtered)?,
        daily_revenue: views::daily_revenue(filtered)?,
        channel_share: views::channel_share(filtered)?,
        channel_average: views::channel_average(filtered)?,
        channel_summary: views::channel_summary(filtered)?,
        top_varieties: views::top_varieties(filtered, limits.top_varieties)?,
        top_seller_table: views::top_seller_table(&top_sellers, limits.top_seller_table),
        top_sellers,
        loyal_sellers: views::loyal_sellers(
            filtered,
            limits.loyalty_min_orders,
            limits.loyalty_top,
        )?,
        regional_revenue,
        selected_region,
        region_combos,
        visitor_mix: views::visitor_mix(filtered, &limits.detail_channels)?,
        membership_mix: views::membership_mix(filtered, &limits.detail_channels)?,
        raw_preview: views::raw_preview(filtered, limits.preview_rows)?,
    })
}

/// Filter then render. An empty group selection yields `EmptySelection` and no results.
pub fn build(
    base: &OrderTable,
    selections: &Selections,
    limits: &ViewLimits,
) -> Result<ViewResults> {
    let filtered = filter_by_groups(base, &selections.groups)?;
    tracing::debug!(
        rows = filtered.height(),
        groups = ?selections.groups.groups(),
        region = ?selections.region,
        "rendering dashboard"
    );
    render(&filtered, selections, limits)
}

/// The loaded base table together with the view limits, rebuilt on every selection change.
#[derive(Debug, Clone)]
pub struct Dashboard {
    base: Arc<OrderTable>,
    limits: ViewLimits,
}

impl Dashboard {
    pub fn new(base: Arc<OrderTable>, limits: ViewLimits) -> Self {
        Self { base, limits }
    }

    pub fn base(&self) -> &OrderTable {
        &self.base
    }

    pub fn limits(&self) -> &ViewLimits {
        &self.limits
    }

    /// Swap in a freshly loaded base table.
    pub fn replace_base(&mut self, base: Arc<OrderTable>) {
        self.base = base;
    }

    pub fn build(&self, selections: &Selections) -> Result<ViewResults> {
        build(&self.base, selections, &self.limits)
    }
}
