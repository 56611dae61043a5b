//! The four headline metrics as a row of bordered cards.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::config::Theme;
use crate::format::{percent, thousands, won, won_opt};
use crate::metrics::Metrics;

pub struct MetricStrip<'a> {
    metrics: &'a Metrics,
    theme: &'a Theme,
}

impl<'a> MetricStrip<'a> {
    pub fn new(metrics: &'a Metrics, theme: &'a Theme) -> Self {
        Self { metrics, theme }
    }

    fn cards(&self) -> [(&'static str, String); 4] {
        [
            ("Total revenue", won(self.metrics.total_revenue)),
            ("Orders", thousands(self.metrics.order_count)),
            ("Avg order value", won_opt(self.metrics.average_order_value)),
            ("Repeat purchases", percent(self.metrics.repeat_share)),
        ]
    }
}

impl Widget for MetricStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);
        let border = Style::default().fg(self.theme.get("table_border"));
        let value_style = Style::default()
            .fg(self.theme.get("primary"))
            .add_modifier(Modifier::BOLD);

        for ((title, value), cell) in self.cards().into_iter().zip(layout.iter()) {
            Paragraph::new(value)
                .style(value_style)
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(format!(" {} ", title)),
                )
                .render(*cell, buf);
        }
    }
}
