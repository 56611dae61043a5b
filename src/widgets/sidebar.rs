//! Left-hand controls: the seller-group multi-select and, in the Regions section, the region list.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::config::{GroupingConfig, Theme};
use crate::filter::GroupSelection;
use crate::schema::SellerGroup;
use crate::views::RegionRevenue;

pub const SIDEBAR_WIDTH: u16 = 30;

pub struct Sidebar<'a> {
    pub selection: &'a GroupSelection,
    pub grouping: &'a GroupingConfig,
    pub theme: &'a Theme,
    /// Regions to choose from; `None` outside the Regions section
    pub regions: Option<&'a [RegionRevenue]>,
    pub region_index: Option<usize>,
}

fn group_key(group: SellerGroup) -> &'static str {
    match group {
        SellerGroup::Reserved => "k",
        SellerGroup::Other => "o",
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = self.theme.get("table_border");
        let text_primary = self.theme.get("text_primary");
        let text_secondary = self.theme.get("text_secondary");

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Filters ");
        let inner = block.inner(area);
        block.render(area, buf);

        let content = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Seller group label
                Constraint::Length(2), // One checkbox per group
                Constraint::Length(1), // Padding
                Constraint::Length(1), // Region label
                Constraint::Fill(1),   // Region list
            ])
            .split(inner);

        Paragraph::new("Seller group:")
            .style(Style::default().fg(text_primary))
            .render(content[0], buf);

        let lines: Vec<Line> = SellerGroup::ALL
            .iter()
            .map(|&group| {
                let selected = self.selection.contains(group);
                let marker = if selected { "☑" } else { "☐" };
                let color = if selected {
                    self.theme.group_color(group)
                } else {
                    text_secondary
                };
                Line::from(vec![
                    Span::styled(
                        format!("{} {}", marker, self.grouping.label(group)),
                        Style::default().fg(color),
                    ),
                    Span::styled(
                        format!(" ({})", group_key(group)),
                        Style::default().fg(text_secondary),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(content[1], buf);

        let Some(regions) = self.regions else {
            return;
        };
        Paragraph::new("Region:")
            .style(Style::default().fg(text_primary))
            .render(content[3], buf);
        if regions.is_empty() {
            Paragraph::new("(no regions)")
                .style(Style::default().fg(text_secondary))
                .render(content[4], buf);
            return;
        }
        let items: Vec<ListItem> = regions
            .iter()
            .map(|r| ListItem::new(r.region.as_str()))
            .collect();
        let list = List::new(items)
            .style(Style::default().fg(text_secondary))
            .highlight_style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::REVERSED),
            )
            .highlight_symbol("▶ ");
        let mut state = ListState::default().with_selected(self.region_index);
        StatefulWidget::render(list, content[4], buf, &mut state);
    }
}
