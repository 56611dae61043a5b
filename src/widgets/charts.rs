//! Chart widgets over view results: the daily trend line chart, bar charts, share gauges and
//! the grouped membership bars.

use std::collections::BTreeMap;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, LineGauge,
        Paragraph, Widget,
    },
};

use crate::config::{GroupingConfig, Theme};
use crate::format::{compact_won, percent};
use crate::table::{date_from_epoch_days, epoch_days};
use crate::views::{ChannelShare, DailyRevenue, MembershipCount};

fn titled_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("table_border")))
        .title(format!(" {} ", title))
}

fn render_empty(block: Block, message: &str, theme: &Theme, area: Rect, buf: &mut Buffer) {
    Paragraph::new(message)
        .style(Style::default().fg(theme.get("text_secondary")))
        .centered()
        .block(block)
        .render(area, buf);
}

/// Bar heights are whole numbers; negative amounts draw as empty bars.
fn bar_value(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.round() as u64
    } else {
        0
    }
}

/// Daily revenue, one line per seller group.
pub fn render_daily_trend(
    daily: &[DailyRevenue],
    grouping: &GroupingConfig,
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) {
    let block = titled_block("Daily revenue", theme);
    if daily.is_empty() {
        render_empty(block, "No orders", theme, area, buf);
        return;
    }

    let mut series: BTreeMap<_, Vec<(f64, f64)>> = BTreeMap::new();
    for point in daily {
        series
            .entry(point.group)
            .or_default()
            .push((epoch_days(point.date) as f64, point.revenue));
    }

    let (x_min, x_max) = daily
        .iter()
        .map(|d| epoch_days(d.date) as f64)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| {
            (a.min(x), b.max(x))
        });
    let y_max = daily.iter().map(|d| d.revenue).fold(0.0_f64, f64::max);
    let (x_min, x_max) = if x_max > x_min {
        (x_min, x_max)
    } else {
        (x_min - 0.5, x_min + 0.5)
    };
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(group, points)| {
            Dataset::default()
                .name(grouping.label(*group).to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.group_color(*group)))
                .data(points)
        })
        .collect();

    let label_style = Style::default().fg(theme.get("text_primary"));
    let format_x = |v: f64| {
        date_from_epoch_days(v.round() as i32)
            .map(|d| d.format("%m-%d").to_string())
            .unwrap_or_default()
    };
    let x_axis = Axis::default()
        .bounds([x_min, x_max])
        .style(label_style)
        .labels(vec![
            Span::styled(format_x(x_min), label_style),
            Span::styled(format_x((x_min + x_max) / 2.0), label_style),
            Span::styled(format_x(x_max), label_style),
        ]);
    let y_axis = Axis::default()
        .bounds([0.0, y_max])
        .style(label_style)
        .labels(vec![
            Span::styled(compact_won(0.0), label_style),
            Span::styled(compact_won(y_max / 2.0), label_style),
            Span::styled(compact_won(y_max), label_style),
        ]);

    Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(ratatui::widgets::LegendPosition::TopLeft))
        .render(area, buf);
}

/// Vertical or horizontal bars with a formatted value on each bar.
pub struct Bars<'a> {
    pub title: &'a str,
    pub items: Vec<(String, f64)>,
    pub format: fn(f64) -> String,
    pub color: Color,
    pub horizontal: bool,
}

impl Bars<'_> {
    pub fn render(self, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let block = titled_block(self.title, theme);
        if self.items.is_empty() {
            render_empty(block, "No data", theme, area, buf);
            return;
        }
        let value_style = Style::default().fg(theme.get("text_primary"));
        let bars: Vec<Bar> = self
            .items
            .iter()
            .map(|(label, value)| {
                Bar::default()
                    .value(bar_value(*value))
                    .label(Line::from(label.as_str()))
                    .text_value((self.format)(*value))
                    .value_style(value_style)
                    .style(Style::default().fg(self.color))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_gap(1);
        let chart = if self.horizontal {
            chart.direction(Direction::Horizontal).bar_width(1)
        } else {
            let inner_width = area.width.saturating_sub(2);
            let count = self.items.len() as u16;
            let width = (inner_width / count.max(1)).saturating_sub(1).clamp(3, 12);
            chart.bar_width(width)
        };
        chart.render(area, buf);
    }
}

/// Channel revenue shares as labelled gauges, one per line.
pub fn render_share_gauges(shares: &[ChannelShare], theme: &Theme, area: Rect, buf: &mut Buffer) {
    let block = titled_block("Revenue share by channel", theme);
    if shares.is_empty() {
        render_empty(block, "No data", theme, area, buf);
        return;
    }
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); shares.len()])
        .split(inner);
    let label_width = shares
        .iter()
        .map(|s| s.channel.chars().count() as u16)
        .max()
        .unwrap_or(0)
        .min(inner.width / 3)
        + 1;

    for (share, row) in shares.iter().zip(rows.iter()) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(label_width), Constraint::Fill(1)])
            .split(*row);
        Paragraph::new(share.channel.as_str())
            .style(Style::default().fg(theme.get("text_primary")))
            .render(cols[0], buf);
        LineGauge::default()
            .ratio((share.share / 100.0).clamp(0.0, 1.0))
            .label(percent(share.share))
            .filled_style(Style::default().fg(theme.get("bar")))
            .unfilled_style(Style::default().fg(theme.get("dimmed")))
            .render(cols[1], buf);
    }
}

/// Order counts per channel, one bar per membership status within each channel group.
pub fn render_membership_bars(
    mix: &[MembershipCount],
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) {
    let block = titled_block("Membership mix by channel", theme);
    if mix.is_empty() {
        render_empty(block, "No orders in the detail channels", theme, area, buf);
        return;
    }

    let palette = [
        theme.get("primary"),
        theme.get("secondary"),
        theme.get("success"),
        theme.get("warning"),
    ];
    let mut memberships: Vec<&str> = mix.iter().map(|m| m.membership.as_str()).collect();
    memberships.sort_unstable();
    memberships.dedup();
    let color_of = |membership: &str| {
        let idx = memberships
            .iter()
            .position(|m| *m == membership)
            .unwrap_or(0);
        palette[idx % palette.len()]
    };

    let mut by_channel: Vec<(&str, Vec<Bar>)> = Vec::new();
    for m in mix {
        let bar = Bar::default()
            .value(m.orders)
            .label(Line::from(m.membership.as_str()))
            .style(Style::default().fg(color_of(&m.membership)));
        match by_channel.last_mut() {
            Some((channel, bars)) if *channel == m.channel => bars.push(bar),
            _ => by_channel.push((m.channel.as_str(), vec![bar])),
        }
    }

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(6)
        .bar_gap(1)
        .group_gap(3);
    for (channel, bars) in &by_channel {
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(*channel).centered())
                .bars(bars),
        );
    }
    chart.render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::schema::SellerGroup;
    use chrono::NaiveDate;

    fn theme() -> Theme {
        Theme::from_config(&AppConfig::default().theme).unwrap()
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_bar_value_clamps() {
        assert_eq!(bar_value(-5.0), 0);
        assert_eq!(bar_value(f64::NAN), 0);
        assert_eq!(bar_value(2.6), 3);
    }

    #[test]
    fn test_empty_trend_shows_message() {
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        render_daily_trend(&[], &GroupingConfig::default(), &theme(), area, &mut buf);
        assert!(buffer_text(&buf).contains("No orders"));
    }

    #[test]
    fn test_single_day_trend_renders() {
        let area = Rect::new(0, 0, 60, 15);
        let mut buf = Buffer::empty(area);
        let daily = vec![DailyRevenue {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            group: SellerGroup::Reserved,
            revenue: 1000.0,
        }];
        render_daily_trend(&daily, &GroupingConfig::default(), &theme(), area, &mut buf);
        assert!(buffer_text(&buf).contains("Daily revenue"));
    }

    #[test]
    fn test_share_gauges_render_labels() {
        let area = Rect::new(0, 0, 50, 6);
        let mut buf = Buffer::empty(area);
        let shares = vec![ChannelShare {
            channel: "web".to_string(),
            revenue: 10.0,
            share: 100.0,
        }];
        render_share_gauges(&shares, &theme(), area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("web"));
        assert!(text.contains("100.0%"));
    }
}
