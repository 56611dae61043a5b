use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::schema::{Field, SellerGroup};
use crate::validation::ValidationMode;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub data: DataConfig,
    pub columns: ColumnConfig,
    pub grouping: GroupingConfig,
    pub views: ViewConfig,
    pub validation: ValidationConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

/// Where the dataset lives and how to read it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// File name looked up in the current directory, then in each search path
    pub file_name: String,
    /// Fallback directories, checked in order after the current directory
    pub search_paths: Vec<PathBuf>,
    pub delimiter: Option<u8>,
    /// strftime format of the order timestamp column; inferred when unset
    pub timestamp_format: Option<String>,
}

/// Source header for every canonical field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    pub order_id: String,
    pub settled_amount: String,
    pub payment_amount: String,
    pub unit_price: String,
    pub supply_price: String,
    pub ordered_at: String,
    pub seller: String,
    pub variety: String,
    pub channel: String,
    pub region: String,
    pub repeat_count: String,
    pub membership: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupingConfig {
    /// Seller name that forms its own group
    pub reserved_seller: String,
    pub reserved_label: String,
    pub other_label: String,
}

/// Limits and thresholds of the aggregation views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub top_varieties: usize,
    pub top_sellers: usize,
    pub top_seller_table: usize,
    /// Minimum orders for a seller to appear in the loyalty ranking
    pub loyalty_min_orders: u64,
    pub loyalty_top: usize,
    pub region_combos: usize,
    pub preview_rows: usize,
    /// Channels broken down by visitor type and membership
    pub detail_channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    pub mode: ValidationMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_border: String,
    pub table_selected: String,
    pub reserved_series: String,
    pub other_series: String,
    pub bar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Log file for the TUI; defaults to orderdash.log in the cache directory
    pub file: Option<PathBuf>,
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            data: DataConfig::default(),
            columns: ColumnConfig::default(),
            grouping: GroupingConfig::default(),
            views: ViewConfig::default(),
            validation: ValidationConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file_name: "project1 - preprocessed_data.csv".to_string(),
            search_paths: dirs::data_dir()
                .map(|d| vec![d.join(crate::APP_NAME)])
                .unwrap_or_default(),
            delimiter: None,
            timestamp_format: None,
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            order_id: "주문번호".to_string(),
            settled_amount: "실결제 금액".to_string(),
            payment_amount: "결제금액".to_string(),
            unit_price: "판매단가".to_string(),
            supply_price: "공급단가".to_string(),
            ordered_at: "주문일".to_string(),
            seller: "셀러명".to_string(),
            variety: "품종".to_string(),
            channel: "주문경로".to_string(),
            region: "광역지역(정식)".to_string(),
            repeat_count: "재구매 횟수".to_string(),
            membership: "회원구분".to_string(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            reserved_seller: "킹댕즈".to_string(),
            reserved_label: "킹댕즈".to_string(),
            other_label: "일반 셀러".to_string(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            top_varieties: 10,
            top_sellers: 15,
            top_seller_table: 10,
            loyalty_min_orders: 30,
            loyalty_top: 10,
            region_combos: 5,
            preview_rows: 100,
            detail_channels: vec!["기타".to_string(), "크롬".to_string()],
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            table_selected: "reversed".to_string(),
            reserved_series: "#ff8c00".to_string(),
            other_series: "cyan".to_string(),
            bar: "green".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ColumnConfig {
    /// Source header for a field. Derived fields have no source header and map to their own name.
    pub fn header(&self, field: Field) -> &str {
        match field {
            Field::OrderId => &self.order_id,
            Field::SettledAmount => &self.settled_amount,
            Field::PaymentAmount => &self.payment_amount,
            Field::UnitPrice => &self.unit_price,
            Field::SupplyPrice => &self.supply_price,
            Field::OrderedAt => &self.ordered_at,
            Field::Seller => &self.seller,
            Field::Variety => &self.variety,
            Field::Channel => &self.channel,
            Field::Region => &self.region,
            Field::RepeatCount => &self.repeat_count,
            Field::Membership => &self.membership,
            Field::OrderDate | Field::SellerGroup => field.name(),
        }
    }
}

impl GroupingConfig {
    pub fn label(&self, group: SellerGroup) -> &str {
        match group {
            SellerGroup::Reserved => &self.reserved_label,
            SellerGroup::Other => &self.other_label,
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(user_config) = Self::load_user_config(app_name) {
            config.merge(user_config);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load defaults merged with an explicit config file. Errors in that file are reported.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(Self::read_file(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Load user configuration from ~/.config/orderdash/config.toml
    fn load_user_config(app_name: &str) -> Result<AppConfig> {
        let config_manager = ConfigManager::new(app_name)?;
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        Self::read_file(&config_path)
    }

    fn read_file(config_path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.data.merge(other.data);
        self.columns.merge(other.columns);
        self.grouping.merge(other.grouping);
        self.views.merge(other.views);
        self.validation.merge(other.validation);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.logging.merge(other.logging);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.data.file_name.trim().is_empty() {
            return Err(eyre!("data.file_name must not be empty"));
        }

        if let Some(delimiter) = self.data.delimiter {
            if delimiter == b'\n' || delimiter == b'\r' || delimiter == b'"' {
                return Err(eyre!("data.delimiter cannot be a newline or quote"));
            }
        }

        if self.grouping.reserved_seller.is_empty() {
            return Err(eyre!("grouping.reserved_seller must not be empty"));
        }

        if self.grouping.reserved_label == self.grouping.other_label {
            return Err(eyre!(
                "grouping.reserved_label and grouping.other_label must differ (both are '{}')",
                self.grouping.reserved_label
            ));
        }

        let limits = [
            ("top_varieties", self.views.top_varieties),
            ("top_sellers", self.views.top_sellers),
            ("top_seller_table", self.views.top_seller_table),
            ("loyalty_top", self.views.loyalty_top),
            ("region_combos", self.views.region_combos),
            ("preview_rows", self.views.preview_rows),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(eyre!("views.{} must be greater than 0", name));
            }
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(eyre!(
                    "Invalid logging level: {}. Must be one of trace, debug, info, warn, error",
                    self.logging.level
                ))
            }
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }
}

// Merge implementations for each config section
impl DataConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DataConfig::default();
        if other.file_name != default.file_name {
            self.file_name = other.file_name;
        }
        if other.search_paths != default.search_paths {
            self.search_paths = other.search_paths;
        }
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.timestamp_format.is_some() {
            self.timestamp_format = other.timestamp_format;
        }
    }
}

impl ColumnConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ColumnConfig::default();
        for field in Field::SOURCE {
            let theirs = other.header(field);
            if theirs != default.header(field) {
                let value = theirs.to_string();
                *self.header_mut(field) = value;
            }
        }
    }

    fn header_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::OrderId => &mut self.order_id,
            Field::SettledAmount => &mut self.settled_amount,
            Field::PaymentAmount => &mut self.payment_amount,
            Field::UnitPrice => &mut self.unit_price,
            Field::SupplyPrice => &mut self.supply_price,
            Field::OrderedAt | Field::OrderDate => &mut self.ordered_at,
            Field::Seller | Field::SellerGroup => &mut self.seller,
            Field::Variety => &mut self.variety,
            Field::Channel => &mut self.channel,
            Field::Region => &mut self.region,
            Field::RepeatCount => &mut self.repeat_count,
            Field::Membership => &mut self.membership,
        }
    }
}

impl GroupingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = GroupingConfig::default();
        if other.reserved_seller != default.reserved_seller {
            self.reserved_seller = other.reserved_seller;
        }
        if other.reserved_label != default.reserved_label {
            self.reserved_label = other.reserved_label;
        }
        if other.other_label != default.other_label {
            self.other_label = other.other_label;
        }
    }
}

impl ViewConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ViewConfig::default();
        if other.top_varieties != default.top_varieties {
            self.top_varieties = other.top_varieties;
        }
        if other.top_sellers != default.top_sellers {
            self.top_sellers = other.top_sellers;
        }
        if other.top_seller_table != default.top_seller_table {
            self.top_seller_table = other.top_seller_table;
        }
        if other.loyalty_min_orders != default.loyalty_min_orders {
            self.loyalty_min_orders = other.loyalty_min_orders;
        }
        if other.loyalty_top != default.loyalty_top {
            self.loyalty_top = other.loyalty_top;
        }
        if other.region_combos != default.region_combos {
            self.region_combos = other.region_combos;
        }
        if other.preview_rows != default.preview_rows {
            self.preview_rows = other.preview_rows;
        }
        if other.detail_channels != default.detail_channels {
            self.detail_channels = other.detail_channels;
        }
    }
}

impl ValidationConfig {
    pub fn merge(&mut self, other: Self) {
        if other.mode != ValidationMode::default() {
            self.mode = other.mode;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.level != default.level {
            self.level = other.level;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

impl ColorConfig {
    fn entries(&self) -> [(&'static str, &String); 15] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("success", &self.success),
            ("error", &self.error),
            ("warning", &self.warning),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("table_selected", &self.table_selected),
            ("reserved_series", &self.reserved_series),
            ("other_series", &self.other_series),
            ("bar", &self.bar),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();

        macro_rules! merge_color {
            ($($field:ident),+ $(,)?) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )+
            };
        }

        merge_color!(
            primary,
            secondary,
            success,
            error,
            warning,
            dimmed,
            controls_bg,
            text_primary,
            text_secondary,
            table_header,
            table_border,
            table_selected,
            reserved_series,
            other_series,
            bar,
        );
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex or named) and convert to appropriate terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        // Hex format: "#ff0000"
        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            // Special modifiers (handled specially in rendering)
            "reset" | "reversed" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Convert RGB values to appropriate terminal color based on capabilities
    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Color of a seller group's chart series
    pub fn group_color(&self, group: SellerGroup) -> Color {
        match group {
            SellerGroup::Reserved => self.get("reserved_series"),
            SellerGroup::Other => self.get("other_series"),
        }
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
