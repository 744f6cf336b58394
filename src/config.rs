/*
 *  config.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML + command line configuration, resolved once at startup
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::color_range::{ColorRanges, DEFAULT_POWER_COLORS, DEFAULT_POWER_RANGES};
use crate::fonts::{self, FontRef};
use crate::gauge::{self, GaugeStyle};
use crate::inverter::{HostPool, DEFAULT_REMOTE_PORT};
use crate::palette::NamedColor;

pub const DEFAULT_MOCK_VALUES: [f64; 6] = [0.0, 50.0, 100.0, 150.0, 200.0, 250.0];
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_DISPLAY_WIDTH: u32 = 240;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 240;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Config file layout; every field optional so layers can stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub debug: Option<bool>,
    /// replay `mock_values` instead of polling the gateway
    pub mock: Option<bool>,
    pub mock_values: Option<Vec<f64>>,
    pub remote_address: Option<String>,
    pub remote_port: Option<u16>,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    /// seconds between polls
    pub interval_secs: Option<u64>,
    /// watts at full scale
    pub power_max: Option<f64>,
    /// lower bound of each color bucket, ascending
    pub power_ranges: Option<Vec<f64>>,
    pub power_colors: Option<Vec<NamedColor>>,
    pub gauge: Option<GaugeConfig>,
    pub theme: Option<ThemeConfig>,
    pub fonts: Option<FontConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GaugeConfig {
    pub max_angle: Option<f64>,
    pub width: Option<u32>,
    pub segments: Option<u32>,
    pub margin: Option<u32>,
    pub padding: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThemeConfig {
    pub foreground: Option<NamedColor>,
    pub background: Option<NamedColor>,
    /// label color until the first reading
    pub label: Option<NamedColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FontConfig {
    pub large: Option<String>,
    pub small: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// write every presented frame to this PPM file
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Every defaulted field filled in
    pub fn defaults() -> Self {
        let pool = HostPool::default();
        Self {
            debug: Some(false),
            mock: Some(false),
            mock_values: Some(DEFAULT_MOCK_VALUES.to_vec()),
            remote_address: None,
            remote_port: Some(DEFAULT_REMOTE_PORT),
            connect_timeout_ms: Some(pool.connect_timeout.as_millis() as u64),
            read_timeout_ms: Some(pool.read_timeout.as_millis() as u64),
            interval_secs: Some(DEFAULT_INTERVAL_SECS),
            power_max: Some(gauge::DEFAULT_POWER_MAX),
            power_ranges: Some(DEFAULT_POWER_RANGES.to_vec()),
            power_colors: Some(DEFAULT_POWER_COLORS.to_vec()),
            gauge: Some(GaugeConfig {
                max_angle: Some(gauge::DEFAULT_MAX_ANGLE),
                width: Some(gauge::DEFAULT_ARC_WIDTH),
                segments: Some(gauge::DEFAULT_ARC_SEGMENTS),
                margin: Some(gauge::DEFAULT_MARGIN),
                padding: Some(gauge::DEFAULT_PADDING),
            }),
            theme: Some(ThemeConfig {
                foreground: Some(NamedColor::White),
                background: Some(NamedColor::Black),
                label: Some(NamedColor::Red),
            }),
            fonts: Some(FontConfig {
                large: Some(fonts::LARGE_DEFAULT.into()),
                small: Some(fonts::SMALL_DEFAULT.into()),
                error: Some(fonts::ERROR_DEFAULT.into()),
            }),
            display: Some(DisplayConfig {
                width: Some(DEFAULT_DISPLAY_WIDTH),
                height: Some(DEFAULT_DISPLAY_HEIGHT),
                snapshot: None,
            }),
        }
    }
}

/// CLI overrides. Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "solmon", about = "Solar inverter power gauge", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// debug logging and raw gateway dumps
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// replay the configured mock values instead of polling
    #[arg(long, action = ArgAction::SetTrue)]
    pub mock: bool,
    #[arg(long)]
    pub remote_address: Option<String>,
    #[arg(long)]
    pub remote_port: Option<u16>,
    #[arg(long)]
    pub interval_secs: Option<u64>,
    /// write every frame to this PPM file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Startup configuration, read-only once resolved
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub debug: bool,
    pub mock: bool,
    pub mock_values: Vec<f64>,
    pub remote_address: Option<String>,
    pub remote_port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub interval: Duration,
    pub display: DisplaySettings,
    pub gauge: GaugeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub snapshot: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let pool = HostPool::default();
        Self {
            debug: false,
            mock: false,
            mock_values: DEFAULT_MOCK_VALUES.to_vec(),
            remote_address: None,
            remote_port: DEFAULT_REMOTE_PORT,
            connect_timeout: pool.connect_timeout,
            read_timeout: pool.read_timeout,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            display: DisplaySettings {
                width: DEFAULT_DISPLAY_WIDTH,
                height: DEFAULT_DISPLAY_HEIGHT,
                snapshot: None,
            },
            gauge: GaugeStyle::default(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn font(name: &str) -> Result<FontRef, ConfigError> {
    fonts::by_name(name).ok_or_else(|| {
        let known: Vec<_> = fonts::names().collect();
        invalid(format!("unknown font '{}' (known: {})", name, known.join(", ")))
    })
}

impl AppConfig {
    /// Apply defaults to the merged layers and check every invariant
    pub fn resolve(cfg: &Config) -> Result<Self, ConfigError> {
        let d = AppConfig::default();
        let gauge_cfg = cfg.gauge.clone().unwrap_or_default();
        let theme = cfg.theme.clone().unwrap_or_default();
        let font_cfg = cfg.fonts.clone().unwrap_or_default();
        let display = cfg.display.clone().unwrap_or_default();

        let ranges = ColorRanges::new(
            cfg.power_ranges.clone().unwrap_or_else(|| DEFAULT_POWER_RANGES.to_vec()),
            cfg.power_colors.clone().unwrap_or_else(|| DEFAULT_POWER_COLORS.to_vec()),
        )
        .map_err(|e| invalid(e.to_string()))?;

        let power_max = cfg.power_max.unwrap_or(d.gauge.power_max);
        if !(power_max > 0.0 && power_max.is_finite()) {
            return Err(invalid(format!("power_max must be > 0 (got {})", power_max)));
        }
        let max_angle = gauge_cfg.max_angle.unwrap_or(d.gauge.max_angle);
        if !(max_angle > 0.0 && max_angle <= 360.0) {
            return Err(invalid(format!("gauge max_angle must be in (0, 360] (got {})", max_angle)));
        }
        let arc_segments = gauge_cfg.segments.unwrap_or(d.gauge.arc_segments);
        if arc_segments == 0 {
            return Err(invalid("gauge segments must be >= 1"));
        }
        let connect_timeout = cfg.connect_timeout_ms.map(Duration::from_millis).unwrap_or(d.connect_timeout);
        let read_timeout = cfg.read_timeout_ms.map(Duration::from_millis).unwrap_or(d.read_timeout);
        if connect_timeout.is_zero() || read_timeout.is_zero() {
            return Err(invalid("connect_timeout_ms and read_timeout_ms must be > 0"));
        }

        let width = display.width.unwrap_or(d.display.width);
        let height = display.height.unwrap_or(d.display.height);
        if width == 0 || height == 0 {
            return Err(invalid("display width/height must be > 0"));
        }

        let mock = cfg.mock.unwrap_or(d.mock);
        let mock_values = cfg.mock_values.clone().unwrap_or(d.mock_values);
        if mock && mock_values.is_empty() {
            return Err(invalid("mock mode needs at least one mock value"));
        }
        let remote_address = cfg.remote_address.clone().filter(|a| !a.trim().is_empty());
        if !mock && remote_address.is_none() {
            return Err(invalid("remote_address is required unless mock mode is on"));
        }

        let gauge = GaugeStyle {
            power_max,
            ranges,
            max_angle,
            arc_width: gauge_cfg.width.unwrap_or(d.gauge.arc_width),
            arc_segments,
            margin: gauge_cfg.margin.unwrap_or(d.gauge.margin),
            padding: gauge_cfg.padding.unwrap_or(d.gauge.padding),
            foreground: theme.foreground.unwrap_or(d.gauge.foreground),
            background: theme.background.unwrap_or(d.gauge.background),
            label_color: theme.label.unwrap_or(d.gauge.label_color),
            large_font: font_cfg.large.as_deref().map(font).transpose()?.unwrap_or(d.gauge.large_font),
            small_font: font_cfg.small.as_deref().map(font).transpose()?.unwrap_or(d.gauge.small_font),
            error_font: font_cfg.error.as_deref().map(font).transpose()?.unwrap_or(d.gauge.error_font),
        };

        Ok(Self {
            debug: cfg.debug.unwrap_or(d.debug),
            mock,
            mock_values,
            remote_address,
            remote_port: cfg.remote_port.unwrap_or(d.remote_port),
            connect_timeout,
            read_timeout,
            interval: cfg.interval_secs.map(Duration::from_secs).unwrap_or(d.interval),
            display: DisplaySettings {
                width,
                height,
                snapshot: display.snapshot,
            },
            gauge,
        })
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
///
/// `--dump-config` prints the merged YAML and exits here.
pub fn load() -> Result<(AppConfig, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = merged(&cli)?;
    let app = AppConfig::resolve(&cfg)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok((app, cli))
}

/// Defaults, then the YAML file, then the command line
pub fn merged(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = Config::defaults();

    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            merge(&mut cfg, read_yaml(p)?);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        merge(&mut cfg, read_yaml(&p)?);
    }

    apply_cli_overrides(&mut cfg, cli);
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/solmon/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/solmon.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["solmon.yaml", "config.yaml", "config/solmon.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.debug.is_some()              { dst.debug = src.debug; }
    if src.mock.is_some()               { dst.mock = src.mock; }
    if src.mock_values.is_some()        { dst.mock_values = src.mock_values; }
    if src.remote_address.is_some()     { dst.remote_address = src.remote_address; }
    if src.remote_port.is_some()        { dst.remote_port = src.remote_port; }
    if src.connect_timeout_ms.is_some() { dst.connect_timeout_ms = src.connect_timeout_ms; }
    if src.read_timeout_ms.is_some()    { dst.read_timeout_ms = src.read_timeout_ms; }
    if src.interval_secs.is_some()      { dst.interval_secs = src.interval_secs; }
    if src.power_max.is_some()          { dst.power_max = src.power_max; }
    if src.power_ranges.is_some()       { dst.power_ranges = src.power_ranges; }
    if src.power_colors.is_some()       { dst.power_colors = src.power_colors; }

    match (&mut dst.gauge, src.gauge) {
        (None, Some(c)) => dst.gauge = Some(c),
        (Some(d), Some(s)) => merge_gauge(d, s),
        _ => {}
    }
    match (&mut dst.theme, src.theme) {
        (None, Some(c)) => dst.theme = Some(c),
        (Some(d), Some(s)) => merge_theme(d, s),
        _ => {}
    }
    match (&mut dst.fonts, src.fonts) {
        (None, Some(c)) => dst.fonts = Some(c),
        (Some(d), Some(s)) => merge_fonts(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_gauge(dst: &mut GaugeConfig, src: GaugeConfig) {
    if src.max_angle.is_some() { dst.max_angle = src.max_angle; }
    if src.width.is_some()     { dst.width = src.width; }
    if src.segments.is_some()  { dst.segments = src.segments; }
    if src.margin.is_some()    { dst.margin = src.margin; }
    if src.padding.is_some()   { dst.padding = src.padding; }
}

fn merge_theme(dst: &mut ThemeConfig, src: ThemeConfig) {
    if src.foreground.is_some() { dst.foreground = src.foreground; }
    if src.background.is_some() { dst.background = src.background; }
    if src.label.is_some()      { dst.label = src.label; }
}

fn merge_fonts(dst: &mut FontConfig, src: FontConfig) {
    if src.large.is_some() { dst.large = src.large; }
    if src.small.is_some() { dst.small = src.small; }
    if src.error.is_some() { dst.error = src.error; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()    { dst.width = src.width; }
    if src.height.is_some()   { dst.height = src.height; }
    if src.snapshot.is_some() { dst.snapshot = src.snapshot; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug                     { cfg.debug = Some(true); }
    if cli.mock                      { cfg.mock = Some(true); }
    if cli.remote_address.is_some()  { cfg.remote_address = cli.remote_address.clone(); }
    if cli.remote_port.is_some()     { cfg.remote_port = cli.remote_port; }
    if cli.interval_secs.is_some()   { cfg.interval_secs = cli.interval_secs; }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.snapshot.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if cli.snapshot.is_some()       { display.snapshot = cli.snapshot.clone(); }
    }
}
