//! Non-interactive output: every dashboard section as aligned text, or the results as JSON.

use std::fmt::Write;

use crate::config::{AppConfig, GroupingConfig};
use crate::dashboard::{build, Selections, ViewResults};
use crate::format::{percent, thousands, won, won_opt};
use crate::loader::{load_orders, LoadOptions};
use crate::schema::VisitorType;
use crate::source::DatasetLocator;
use crate::validation::validate;
use crate::views::ViewLimits;
use crate::Section;

/// Left-aligned text columns padded to the widest cell.
fn text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "  (no data)\n".to_string();
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        format!("  {}", padded.join(" ")).trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.to_vec()));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title, "=".repeat(title.chars().count()));
}

fn subheading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
}

/// Plain-text report of every section, in dashboard order.
pub fn render_text(results: &ViewResults, grouping: &GroupingConfig) -> String {
    let mut out = String::new();
    let groups: Vec<&str> = results.groups.iter().map(|g| grouping.label(*g)).collect();
    let _ = writeln!(out, "Seller groups: {}", groups.join(", "));

    let m = &results.metrics;
    let _ = writeln!(out, "Total revenue:       {}", won(m.total_revenue));
    let _ = writeln!(out, "Orders:              {}", thousands(m.order_count));
    let _ = writeln!(
        out,
        "Average order value: {}",
        won_opt(m.average_order_value)
    );
    let _ = writeln!(out, "Repeat purchases:    {}", percent(m.repeat_share));

    heading(&mut out, Section::RevenueChannel.title());
    subheading(&mut out, "Daily revenue");
    let rows: Vec<Vec<String>> = results
        .daily_revenue
        .iter()
        .map(|d| {
            vec![
                d.date.to_string(),
                grouping.label(d.group).to_string(),
                won(d.revenue),
            ]
        })
        .collect();
    out.push_str(&text_table(&["Date", "Group", "Revenue"], &rows));

    subheading(&mut out, "Revenue share by channel");
    let rows: Vec<Vec<String>> = results
        .channel_share
        .iter()
        .map(|c| vec![c.channel.clone(), won(c.revenue), percent(c.share)])
        .collect();
    out.push_str(&text_table(&["Channel", "Revenue", "Share"], &rows));

    subheading(&mut out, "Average order value by channel");
    let rows: Vec<Vec<String>> = results
        .channel_average
        .iter()
        .map(|c| vec![c.channel.clone(), won_opt(c.average)])
        .collect();
    out.push_str(&text_table(&["Channel", "AOV"], &rows));

    subheading(&mut out, "Channel summary");
    let rows: Vec<Vec<String>> = results
        .channel_summary
        .iter()
        .map(|c| vec![c.channel.clone(), won(c.revenue), thousands(c.orders)])
        .collect();
    out.push_str(&text_table(&["Channel", "Revenue", "Orders"], &rows));

    heading(&mut out, Section::SellersLoyalty.title());
    subheading(&mut out, "Top varieties");
    let rows: Vec<Vec<String>> = results
        .top_varieties
        .iter()
        .map(|v| vec![v.variety.clone(), thousands(v.orders)])
        .collect();
    out.push_str(&text_table(&["Variety", "Orders"], &rows));

    subheading(&mut out, "Top sellers by revenue");
    let rows: Vec<Vec<String>> = results
        .top_seller_table
        .iter()
        .enumerate()
        .map(|(i, s)| vec![(i + 1).to_string(), s.seller.clone(), won(s.revenue)])
        .collect();
    out.push_str(&text_table(&["#", "Seller", "Revenue"], &rows));

    subheading(&mut out, "High-loyalty sellers");
    let rows: Vec<Vec<String>> = results
        .loyal_sellers
        .iter()
        .map(|s| {
            vec![
                s.seller.clone(),
                thousands(s.orders),
                thousands(s.repeat_orders),
                percent(s.repeat_rate),
            ]
        })
        .collect();
    out.push_str(&text_table(
        &["Seller", "Orders", "Repeat orders", "Repeat rate"],
        &rows,
    ));

    heading(&mut out, Section::Regions.title());
    let rows: Vec<Vec<String>> = results
        .regional_revenue
        .iter()
        .map(|r| vec![r.region.clone(), won(r.revenue)])
        .collect();
    out.push_str(&text_table(&["Region", "Revenue"], &rows));
    match &results.selected_region {
        Some(region) => {
            subheading(&mut out, &format!("Best channel x seller in {}", region));
            let rows: Vec<Vec<String>> = results
                .region_combos
                .iter()
                .map(|c| vec![c.channel.clone(), c.seller.clone(), won(c.revenue)])
                .collect();
            out.push_str(&text_table(&["Channel", "Seller", "Revenue"], &rows));
        }
        None => {
            subheading(&mut out, "Best channel x seller");
            out.push_str("  (no region)\n");
        }
    }

    heading(&mut out, Section::ChannelDetail.title());
    subheading(&mut out, "New vs returning");
    let rows: Vec<Vec<String>> = results
        .visitor_mix
        .iter()
        .map(|v| {
            vec![
                v.channel.clone(),
                thousands(v.count(VisitorType::New)),
                thousands(v.count(VisitorType::Returning)),
            ]
        })
        .collect();
    out.push_str(&text_table(&["Channel", "New", "Returning"], &rows));

    subheading(&mut out, "Membership mix");
    let rows: Vec<Vec<String>> = results
        .membership_mix
        .iter()
        .map(|m| vec![m.channel.clone(), m.membership.clone(), thousands(m.orders)])
        .collect();
    out.push_str(&text_table(&["Channel", "Membership", "Orders"], &rows));

    heading(&mut out, Section::RawData.title());
    let rows: Vec<Vec<String>> = results
        .raw_preview
        .iter()
        .map(|r| {
            vec![
                r.ordered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.order_id.clone(),
                r.seller.clone(),
                r.variety.clone(),
                r.channel.clone(),
                r.region.clone(),
                r.repeat_count.to_string(),
                r.membership.clone(),
                won_opt(r.settled_amount),
            ]
        })
        .collect();
    out.push_str(&text_table(
        &[
            "Ordered at",
            "Order",
            "Seller",
            "Variety",
            "Channel",
            "Region",
            "Repeat",
            "Membership",
            "Amount",
        ],
        &rows,
    ));

    out
}

/// Locate, load and validate the dataset once, then build the views for `selections`.
pub fn compute(
    config: &AppConfig,
    locator: &DatasetLocator,
    selections: &Selections,
) -> crate::error::Result<ViewResults> {
    let path = locator.resolve()?;
    let table = load_orders(&path, &LoadOptions::from_config(config))?;
    validate(&table, config.validation.mode)?;
    build(&table, selections, &ViewLimits::from(&config.views))
}

pub fn render_json(results: &ViewResults) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::orders_frame;

    fn results() -> ViewResults {
        let base = orders_frame(&[("1", "A", 10000.0, 0), ("2", "킹댕즈", 30000.0, 1)]);
        build(&base, &Selections::default(), &ViewLimits::default()).unwrap()
    }

    #[test]
    fn test_text_report_has_every_section() {
        let text = render_text(&results(), &GroupingConfig::default());
        for section in Section::ALL {
            assert!(text.contains(section.title()), "missing {}", section.title());
        }
        assert!(text.contains("₩40,000"));
        assert!(text.contains("₩20,000"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("킹댕즈, 일반 셀러"));
    }

    #[test]
    fn test_text_table_alignment() {
        let table = text_table(
            &["A", "B"],
            &[
                vec!["x".to_string(), "1".to_string()],
                vec!["long".to_string(), "2".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "  A    B");
        assert_eq!(lines[2], "  x    1");
        assert_eq!(lines[3], "  long 2");
        assert_eq!(text_table(&["A"], &[]), "  (no data)\n");
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&results()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metrics"]["order_count"], 2);
        assert_eq!(value["groups"][0], "reserved");
    }
}
