//! The body of each dashboard section, laid out from the current view results.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use crate::config::{GroupingConfig, Theme};
use crate::dashboard::ViewResults;
use crate::format::{compact_won, percent, thousands, won, won_opt};
use crate::schema::VisitorType;
use crate::widgets::charts::{self, Bars};
use crate::Section;

fn thousands_f64(v: f64) -> String {
    if v.is_finite() && v > 0.0 {
        thousands(v.round() as u64)
    } else {
        "0".to_string()
    }
}

/// Bordered table with a bold header row and right-aligned numeric columns.
struct SimpleTable<'a> {
    title: String,
    headers: &'a [&'a str],
    widths: Vec<Constraint>,
    /// Columns rendered right-aligned
    numeric: &'a [usize],
    rows: Vec<Vec<String>>,
}

impl SimpleTable<'_> {
    fn render(self, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.get("table_border")))
            .title(format!(" {} ", self.title));
        let header_style = Style::default()
            .fg(theme.get("table_header"))
            .add_modifier(Modifier::BOLD);
        let align = |i: usize, text: String| {
            if self.numeric.contains(&i) {
                Cell::from(Line::from(text).right_aligned())
            } else {
                Cell::from(text)
            }
        };

        let header = Row::new(
            self.headers
                .iter()
                .enumerate()
                .map(|(i, h)| align(i, h.to_string())),
        )
        .style(header_style);

        if self.rows.is_empty() {
            Table::new(
                vec![Row::new(vec![Cell::from("(no data)")])
                    .style(Style::default().fg(theme.get("text_secondary")))],
                [Constraint::Fill(1)],
            )
            .block(block)
            .render(area, buf);
            return;
        }

        let rows: Vec<Row> = self
            .rows
            .into_iter()
            .map(|cells| Row::new(cells.into_iter().enumerate().map(|(i, c)| align(i, c))))
            .collect();
        Table::new(rows, self.widths)
            .header(header)
            .style(Style::default().fg(theme.get("text_primary")))
            .column_spacing(1)
            .block(block)
            .render(area, buf);
    }
}

fn split(direction: Direction, area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    Layout::default()
        .direction(direction)
        .constraints(constraints.to_vec())
        .split(area)
        .to_vec()
}

fn halves(direction: Direction, area: Rect) -> Vec<Rect> {
    split(
        direction,
        area,
        &[Constraint::Percentage(50), Constraint::Percentage(50)],
    )
}

/// One section of the dashboard body.
pub struct SectionView<'a> {
    pub section: Section,
    pub results: &'a ViewResults,
    pub grouping: &'a GroupingConfig,
    pub theme: &'a Theme,
    /// First raw-preview row shown
    pub preview_scroll: usize,
}

impl Widget for SectionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.section {
            Section::RevenueChannel => self.revenue_channel(area, buf),
            Section::SellersLoyalty => self.sellers_loyalty(area, buf),
            Section::Regions => self.regions(area, buf),
            Section::ChannelDetail => self.channel_detail(area, buf),
            Section::RawData => self.raw_data(area, buf),
        }
    }
}

impl SectionView<'_> {
    fn revenue_channel(&self, area: Rect, buf: &mut Buffer) {
        let r = self.results;
        let rows = halves(Direction::Vertical, area);
        let top = split(
            Direction::Horizontal,
            rows[0],
            &[Constraint::Percentage(65), Constraint::Percentage(35)],
        );
        let bottom = halves(Direction::Horizontal, rows[1]);

        charts::render_daily_trend(&r.daily_revenue, self.grouping, self.theme, top[0], buf);
        charts::render_share_gauges(&r.channel_share, self.theme, top[1], buf);

        Bars {
            title: "Average order value by channel",
            items: r
                .channel_average
                .iter()
                .filter_map(|a| a.average.map(|v| (a.channel.clone(), v)))
                .collect(),
            format: compact_won,
            color: self.theme.get("bar"),
            horizontal: false,
        }
        .render(self.theme, bottom[0], buf);

        SimpleTable {
            title: "Channel summary".to_string(),
            headers: &["Channel", "Revenue", "Orders"],
            widths: vec![
                Constraint::Fill(1),
                Constraint::Length(16),
                Constraint::Length(8),
            ],
            numeric: &[1, 2],
            rows: r
                .channel_summary
                .iter()
                .map(|s| vec![s.channel.clone(), won(s.revenue), thousands(s.orders)])
                .collect(),
        }
        .render(self.theme, bottom[1], buf);
    }

    fn sellers_loyalty(&self, area: Rect, buf: &mut Buffer) {
        let r = self.results;
        let rows = halves(Direction::Vertical, area);
        let top = halves(Direction::Horizontal, rows[0]);
        let bottom = halves(Direction::Horizontal, rows[1]);

        Bars {
            title: "Top varieties by orders",
            items: r
                .top_varieties
                .iter()
                .map(|v| (v.variety.clone(), v.orders as f64))
                .collect(),
            format: thousands_f64,
            color: self.theme.get("bar"),
            horizontal: false,
        }
        .render(self.theme, top[0], buf);

        Bars {
            title: "Top sellers by revenue",
            items: r
                .top_sellers
                .iter()
                .map(|s| (s.seller.clone(), s.revenue))
                .collect(),
            format: compact_won,
            color: self.theme.get("secondary"),
            horizontal: true,
        }
        .render(self.theme, top[1], buf);

        SimpleTable {
            title: "Top sellers".to_string(),
            headers: &["#", "Seller", "Revenue"],
            widths: vec![
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Length(16),
            ],
            numeric: &[0, 2],
            rows: r
                .top_seller_table
                .iter()
                .enumerate()
                .map(|(i, s)| vec![(i + 1).to_string(), s.seller.clone(), won(s.revenue)])
                .collect(),
        }
        .render(self.theme, bottom[0], buf);

        SimpleTable {
            title: "Loyal sellers".to_string(),
            headers: &["Seller", "Orders", "Repeat", "Rate"],
            widths: vec![
                Constraint::Fill(1),
                Constraint::Length(7),
                Constraint::Length(7),
                Constraint::Length(7),
            ],
            numeric: &[1, 2, 3],
            rows: r
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
                .collect(),
        }
        .render(self.theme, bottom[1], buf);
    }

    fn regions(&self, area: Rect, buf: &mut Buffer) {
        let r = self.results;
        let rows = halves(Direction::Vertical, area);

        Bars {
            title: "Revenue by region",
            items: r
                .regional_revenue
                .iter()
                .map(|g| (g.region.clone(), g.revenue))
                .collect(),
            format: compact_won,
            color: self.theme.get("bar"),
            horizontal: false,
        }
        .render(self.theme, rows[0], buf);

        let title = match &r.selected_region {
            Some(region) => format!("Best channel × seller in {}", region),
            None => "Best channel × seller".to_string(),
        };
        SimpleTable {
            title,
            headers: &["Channel", "Seller", "Revenue"],
            widths: vec![
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Length(16),
            ],
            numeric: &[2],
            rows: r
                .region_combos
                .iter()
                .map(|c| vec![c.channel.clone(), c.seller.clone(), won(c.revenue)])
                .collect(),
        }
        .render(self.theme, rows[1], buf);
    }

    fn channel_detail(&self, area: Rect, buf: &mut Buffer) {
        let r = self.results;
        let cols = split(
            Direction::Horizontal,
            area,
            &[Constraint::Percentage(40), Constraint::Percentage(60)],
        );
        let new_label = VisitorType::New.label();
        let returning_label = VisitorType::Returning.label();
        SimpleTable {
            title: "Visitors by channel".to_string(),
            headers: &["Channel", new_label, returning_label],
            widths: vec![
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
            numeric: &[1, 2],
            rows: r
                .visitor_mix
                .iter()
                .map(|v| {
                    vec![
                        v.channel.clone(),
                        thousands(v.count(VisitorType::New)),
                        thousands(v.count(VisitorType::Returning)),
                    ]
                })
                .collect(),
        }
        .render(self.theme, cols[0], buf);

        charts::render_membership_bars(&r.membership_mix, self.theme, cols[1], buf);
    }

    fn raw_data(&self, area: Rect, buf: &mut Buffer) {
        let r = self.results;
        let visible = area.height.saturating_sub(3) as usize;
        let start = self.preview_scroll.min(r.raw_preview.len().saturating_sub(1));
        let rows: Vec<Vec<String>> = r
            .raw_preview
            .iter()
            .skip(start)
            .take(visible.max(1))
            .map(|o| {
                vec![
                    o.order_id.clone(),
                    o.ordered_at.format("%Y-%m-%d %H:%M").to_string(),
                    o.seller.clone(),
                    self.grouping.label(o.seller_group).to_string(),
                    o.variety.clone(),
                    o.channel.clone(),
                    o.region.clone(),
                    o.repeat_count.to_string(),
                    o.membership.clone(),
                    won_opt(o.settled_amount),
                ]
            })
            .collect();

        SimpleTable {
            title: format!(
                "First {} orders",
                thousands(r.raw_preview.len() as u64)
            ),
            headers: &[
                "Order", "Ordered at", "Seller", "Group", "Variety", "Channel", "Region",
                "Repeat", "Membership", "Settled",
            ],
            widths: vec![
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Fill(1),
                Constraint::Length(12),
            ],
            numeric: &[7, 9],
            rows,
        }
        .render(self.theme, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dashboard::{build, Selections};
    use crate::table::test_support::orders_frame;
    use crate::views::ViewLimits;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn results() -> ViewResults {
        let table = orders_frame(&[
            ("A1", "킹댕즈", 30000.0, 1),
            ("A2", "다른상점", 10000.0, 0),
        ]);
        build(&table, &Selections::default(), &ViewLimits::default()).unwrap()
    }

    #[test]
    fn test_every_section_renders() {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap();
        let results = results();
        for section in Section::ALL {
            let area = Rect::new(0, 0, 120, 40);
            let mut buf = Buffer::empty(area);
            SectionView {
                section,
                results: &results,
                grouping: &config.grouping,
                theme: &theme,
                preview_scroll: 0,
            }
            .render(area, &mut buf);
            assert!(!buffer_text(&buf).trim().is_empty(), "{:?}", section);
        }
    }

    #[test]
    fn test_raw_data_scroll_is_clamped() {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap();
        let results = results();
        let area = Rect::new(0, 0, 160, 12);
        let mut buf = Buffer::empty(area);
        SectionView {
            section: Section::RawData,
            results: &results,
            grouping: &config.grouping,
            theme: &theme,
            preview_scroll: 50,
        }
        .render(area, &mut buf);
        assert!(buffer_text(&buf).contains("First 2 orders"));
    }
}
