use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Tabs, Wrap};

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod error_display;
pub mod filter;
pub mod format;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod schema;
pub mod source;
pub mod table;
pub mod validation;
pub mod views;
pub mod widgets;

pub use cache::{CacheManager, DatasetCache};
pub use config::{AppConfig, ConfigManager, Theme};
pub use dashboard::{Dashboard, Selections, ViewResults};
pub use error::DashboardError;
pub use filter::GroupSelection;
pub use loader::LoadOptions;
pub use orderdash_cli::Args;
pub use schema::SellerGroup;
pub use source::DatasetLocator;
pub use validation::ValidationMode;
pub use views::ViewLimits;

use error_display::user_message;
use widgets::controls::Controls;
use widgets::metric_strip::MetricStrip;
use widgets::sections::SectionView;
use widgets::sidebar::{Sidebar, SIDEBAR_WIDTH};

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "orderdash";

/// Top-level dashboard sections, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    RevenueChannel,
    SellersLoyalty,
    Regions,
    ChannelDetail,
    RawData,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::RevenueChannel,
        Section::SellersLoyalty,
        Section::Regions,
        Section::ChannelDetail,
        Section::RawData,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::RevenueChannel => "Revenue & Channel",
            Section::SellersLoyalty => "Sellers & Loyalty",
            Section::Regions => "Regions",
            Section::ChannelDetail => "Channel Detail",
            Section::RawData => "Raw Data",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// `'1'` is the first section.
    pub fn from_digit(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Resolve the dataset location, then load it
    Open(DatasetLocator),
    DoLoad(PathBuf), // Internal event to actually perform loading after UI update
    /// Drop the cached table and read the dataset again
    Reload,
    /// Recompute the views for the current selections
    Render,
    Resize(u16, u16), // resized (width, height)
    Exit,
    Crash(String),
}

#[derive(Clone, Debug, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading {
        file_path: PathBuf,
        current_phase: String,
        progress_percent: u16, // 0-100
    },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }
}

#[derive(Debug, Default)]
struct DebugState {
    enabled: bool,
    num_events: usize,
    num_frames: usize,
    last_build_ms: u128,
}

pub struct App {
    events: Sender<AppEvent>,
    config: AppConfig,
    theme: Theme,
    load_options: LoadOptions,
    validation: ValidationMode,
    datasets: DatasetCache,
    locator: Option<DatasetLocator>,
    path: Option<PathBuf>,
    dashboard: Option<Dashboard>,
    selections: Selections,
    results: Option<ViewResults>,
    notice: Option<String>,
    section: Section,
    preview_scroll: usize,
    loading_state: LoadingState,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>, config: AppConfig) -> Result<App> {
        let theme = Theme::from_config(&config.theme)?;
        Ok(App {
            events,
            theme,
            load_options: LoadOptions::from_config(&config),
            validation: config.validation.mode,
            config,
            datasets: DatasetCache::new(),
            locator: None,
            path: None,
            dashboard: None,
            selections: Selections::default(),
            results: None,
            notice: None,
            section: Section::default(),
            preview_scroll: 0,
            loading_state: LoadingState::Idle,
            debug: DebugState::default(),
        })
    }

    /// Start from these selections instead of every group and the top region.
    pub fn with_selections(mut self, selections: Selections) -> Self {
        self.selections = selections;
        self
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn results(&self) -> Option<&ViewResults> {
        self.results.as_ref()
    }

    /// Message shown in place of the section body, e.g. when no group is selected.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dataset_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn loading_state(&self) -> &LoadingState {
        &self.loading_state
    }

    pub fn dataset_loads(&self) -> usize {
        self.datasets.loads()
    }

    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(locator) => {
                self.locator = Some(locator.clone());
                match locator.resolve() {
                    Ok(path) => {
                        // Set loading state first, then trigger a render before actually loading
                        self.loading_state = LoadingState::Loading {
                            file_path: path.clone(),
                            current_phase: "Reading dataset".to_string(),
                            progress_percent: 30,
                        };
                        Some(AppEvent::DoLoad(path))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "dataset not found");
                        self.results = None;
                        self.notice = Some(user_message(&e));
                        None
                    }
                }
            }
            AppEvent::DoLoad(path) => {
                let loaded = self.load(path);
                self.loading_state = LoadingState::Idle;
                match loaded {
                    Ok(()) => Some(AppEvent::Render),
                    Err(e) if e.is_notice() => {
                        self.notice = Some(user_message(&e));
                        None
                    }
                    Err(e) => Some(AppEvent::Crash(user_message(&e))),
                }
            }
            AppEvent::Reload => {
                if let Some(path) = &self.path {
                    self.datasets.invalidate(path);
                }
                self.locator.clone().map(AppEvent::Open)
            }
            AppEvent::Render => self.rebuild(),
            AppEvent::Resize(_cols, _rows) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn load(&mut self, path: &Path) -> error::Result<()> {
        let table = self.datasets.get_or_load(path, &self.load_options)?;
        if let Err(e) = validation::validate(&table, self.validation) {
            self.datasets.invalidate(path);
            return Err(e);
        }
        tracing::info!(path = %path.display(), rows = table.height(), "dataset loaded");
        match &mut self.dashboard {
            Some(dashboard) => dashboard.replace_base(table),
            None => {
                self.dashboard = Some(Dashboard::new(
                    table,
                    ViewLimits::from(&self.config.views),
                ))
            }
        }
        self.path = Some(path.to_path_buf());
        self.notice = None;
        Ok(())
    }

    fn rebuild(&mut self) -> Option<AppEvent> {
        let dashboard = self.dashboard.as_ref()?;
        let started = std::time::Instant::now();
        let built = dashboard.build(&self.selections);
        self.debug.last_build_ms = started.elapsed().as_millis();
        match built {
            Ok(results) => {
                self.selections.region = results.selected_region.clone();
                let max_scroll = results.raw_preview.len().saturating_sub(1);
                self.preview_scroll = self.preview_scroll.min(max_scroll);
                self.results = Some(results);
                self.notice = None;
                None
            }
            Err(e) if e.is_notice() => {
                self.results = None;
                self.notice = Some(user_message(&e));
                None
            }
            Err(e) => Some(AppEvent::Crash(user_message(&e))),
        }
    }

    fn toggle_group(&mut self, group: SellerGroup) -> Option<AppEvent> {
        self.selections.groups.toggle(group);
        tracing::debug!(groups = ?self.selections.groups.groups(), "group selection changed");
        Some(AppEvent::Render)
    }

    /// Move the region selection by `delta` rows, clamped to the list.
    fn move_region(&mut self, delta: isize) -> Option<AppEvent> {
        let results = self.results.as_ref()?;
        let regions = &results.regional_revenue;
        if regions.is_empty() {
            return None;
        }
        let current = results.selected_region_index().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, regions.len() as isize - 1) as usize;
        if next as isize == current {
            return None;
        }
        self.selections.region = Some(regions[next].region.clone());
        Some(AppEvent::Render)
    }

    fn scroll_preview(&mut self, delta: isize) {
        let len = self
            .results
            .as_ref()
            .map(|r| r.raw_preview.len())
            .unwrap_or(0);
        let max = len.saturating_sub(1) as isize;
        self.preview_scroll = (self.preview_scroll as isize + delta).clamp(0, max.max(0)) as usize;
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Some(AppEvent::Exit);
        }
        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            _ => {}
        }
        if self.loading_state.is_loading() {
            return None;
        }

        match event.code {
            KeyCode::Tab => {
                self.section = self.section.next();
                None
            }
            KeyCode::BackTab => {
                self.section = self.section.prev();
                None
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(section) = Section::from_digit(c) {
                    self.section = section;
                }
                None
            }
            KeyCode::Char('k') => self.toggle_group(SellerGroup::Reserved),
            KeyCode::Char('o') => self.toggle_group(SellerGroup::Other),
            KeyCode::Char('R') => Some(AppEvent::Reload),
            KeyCode::Up => match self.section {
                Section::Regions => self.move_region(-1),
                Section::RawData => {
                    self.scroll_preview(-1);
                    None
                }
                _ => None,
            },
            KeyCode::Down => match self.section {
                Section::Regions => self.move_region(1),
                Section::RawData => {
                    self.scroll_preview(1);
                    None
                }
                _ => None,
            },
            KeyCode::PageUp if self.section == Section::RawData => {
                self.scroll_preview(-10);
                None
            }
            KeyCode::PageDown if self.section == Section::RawData => {
                self.scroll_preview(10);
                None
            }
            KeyCode::Home if self.section == Section::RawData => {
                self.preview_scroll = 0;
                None
            }
            _ => None,
        }
    }

    fn render_loading_gauge(loading_state: &LoadingState, area: Rect, buf: &mut Buffer) {
        if let LoadingState::Loading {
            current_phase,
            progress_percent,
            ..
        } = loading_state
        {
            // Center the gauge in the area
            let gauge_width = (area.width as f64 * 0.33) as u16; // 1/3 of available width
            let gauge_height = 5u16;

            let center_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Fill(1),
                    Constraint::Length(gauge_height),
                    Constraint::Fill(1),
                ])
                .split(area);

            let gauge_area = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Fill(1),
                    Constraint::Length(gauge_width),
                    Constraint::Fill(1),
                ])
                .split(center_layout[1])[1];

            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Loading"))
                .percent(*progress_percent)
                .label(current_phase.clone())
                .render(gauge_area, buf);
        }
    }

    fn render_notice(&self, message: &str, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(area, 70, 40);
        Clear.render(popup, buf);
        Paragraph::new(message)
            .style(Style::default().fg(self.color("warning")))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.color("warning")))
                    .title(" Notice "),
            )
            .render(popup, buf);
    }

    fn render_tabs(&self, area: Rect, buf: &mut Buffer) {
        let titles: Vec<Line> = Section::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| Line::from(format!("{} {}", i + 1, s.title())))
            .collect();
        let title = match &self.path {
            Some(path) => format!(
                " {} ─ {} ",
                APP_NAME,
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ),
            None => format!(" {} ", APP_NAME),
        };
        Tabs::new(titles)
            .select(self.section.index())
            .style(Style::default().fg(self.color("text_secondary")))
            .highlight_style(
                Style::default()
                    .fg(self.color("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.color("table_border")))
                    .title(title),
            )
            .render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![
            Constraint::Length(3), // Section tabs
            Constraint::Length(3), // Metric cards
            Constraint::Fill(1),
            Constraint::Length(1), // Controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_tabs(layout[0], buf);

        if let Some(results) = &self.results {
            MetricStrip::new(&results.metrics, &self.theme).render(layout[1], buf);
        }

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
            .split(layout[2]);

        let regions = match (&self.results, self.section) {
            (Some(results), Section::Regions) => Some(results.regional_revenue.as_slice()),
            _ => None,
        };
        Sidebar {
            selection: &self.selections.groups,
            grouping: &self.config.grouping,
            theme: &self.theme,
            regions,
            region_index: self.results.as_ref().and_then(|r| r.selected_region_index()),
        }
        .render(body[0], buf);

        if let Some(results) = &self.results {
            SectionView {
                section: self.section,
                results,
                grouping: &self.config.grouping,
                theme: &self.theme,
                preview_scroll: self.preview_scroll,
            }
            .render(body[1], buf);
        }

        if self.loading_state.is_loading() {
            App::render_loading_gauge(&self.loading_state, body[1], buf);
        } else if let Some(message) = &self.notice {
            self.render_notice(message, body[1], buf);
        }

        let mut controls = Controls::new()
            .with_section(self.section)
            .with_dimmed(self.loading_state.is_loading())
            .with_bg(self.color("controls_bg"));
        if let Some(results) = &self.results {
            controls = controls.with_row_count(results.metrics.order_count as usize);
        }
        (&controls).render(layout[3], buf);

        if self.debug.enabled {
            Paragraph::new(format!(
                "events: {} frames: {} loads: {} last build: {}ms groups: {:?} region: {}",
                self.debug.num_events,
                self.debug.num_frames,
                self.datasets.loads(),
                self.debug.last_build_ms,
                self.selections.groups.groups(),
                self.selections.region.as_deref().unwrap_or("-"),
            ))
            .style(Style::default().fg(self.color("dimmed")))
            .render(layout[4], buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_cycle() {
        assert_eq!(Section::RawData.next(), Section::RevenueChannel);
        assert_eq!(Section::RevenueChannel.prev(), Section::RawData);
        assert_eq!(Section::Regions.next(), Section::ChannelDetail);
    }

    #[test]
    fn test_section_from_digit() {
        assert_eq!(Section::from_digit('1'), Some(Section::RevenueChannel));
        assert_eq!(Section::from_digit('5'), Some(Section::RawData));
        assert_eq!(Section::from_digit('0'), None);
        assert_eq!(Section::from_digit('6'), None);
        assert_eq!(Section::from_digit('x'), None);
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(outer, 70, 40);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
    }
}
