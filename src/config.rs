use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::event::KeyCode;
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use serde::{Deserialize, Deserializer};
use tracing::info;

use ui_behaviors::{BehaviorError, BehaviorResult};

// ─── Embedded Default ────────────────────────────────────────────────────
/// Baked into the binary; always available as the base layer.
const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

// ─── CLI Arguments (override layer) ─────────────────────────────────────
/// Interactive playground for the popup, sprite, rolling-number, switcher and
/// scroll-fixer behaviors
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ui-behaviors", version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log file path (overrides config file)
    #[arg(short = 'L', long)]
    pub log_file: Option<PathBuf>,

    /// Log level filter (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Target FPS for the render loop (overrides config file)
    #[arg(long)]
    pub fps: Option<u16>,

    /// Open popups and change counters without animation
    #[arg(long)]
    pub no_animations: bool,

    /// Disable mouse capture
    #[arg(long)]
    pub no_mouse: bool,

    /// Print the default config to stdout and exit
    #[arg(long)]
    pub print_default_config: bool,
}

// ─── TOML Structs ───────────────────────────────────────────────────────

/// Root configuration: parsed from TOML, then overridden by CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub popup: PopupConfig,
    #[serde(default)]
    pub sprite: SpriteConfig,
    #[serde(default)]
    pub rolling: RollingConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// Empty string = logging disabled
    pub log_file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub animations: bool,
    pub fps: u16,
    pub mouse: bool,
    #[serde(deserialize_with = "deserialize_border")]
    pub border_style: BorderType,
    #[serde(deserialize_with = "deserialize_color")]
    pub accent: Color,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// 0 = instant
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    pub interval_ms: i64,
    pub pause_frames: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    pub step: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub play_pause: String,
    pub rewind: String,
    pub reverse: String,
    pub increment: String,
    pub decrement: String,
    pub zero: String,
    pub help: String,
    pub quit: String,
}

// ─── Defaults ───────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_file: String::new(),
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            animations: true,
            fps: 30,
            mouse: true,
            border_style: BorderType::Rounded,
            accent: Color::Cyan,
        }
    }
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self { duration_ms: 200 }
    }
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            interval_ms: 80,
            pause_frames: Vec::new(),
        }
    }
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self { step: 137 }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            play_pause: "p".into(),
            rewind: "r".into(),
            reverse: "v".into(),
            increment: "+".into(),
            decrement: "-".into(),
            zero: "0".into(),
            help: "?".into(),
            quit: "q".into(),
        }
    }
}

// ─── Value Deserializers ────────────────────────────────────────────────

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: \"{s}\"")))
}

fn deserialize_border<'de, D>(deserializer: D) -> std::result::Result<BorderType, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_border(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid border style: \"{s}\"")))
}

/// Parse a color string into a ratatui Color.
/// Supports: named colors, "reset", "#RRGGBB" hex.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "reset" | "default" | "transparent" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" | "dark_gray" | "dark_grey" => Some(Color::DarkGray),
        "lightred" | "light_red" => Some(Color::LightRed),
        "lightgreen" | "light_green" => Some(Color::LightGreen),
        "lightyellow" | "light_yellow" => Some(Color::LightYellow),
        "lightblue" | "light_blue" => Some(Color::LightBlue),
        "lightmagenta" | "light_magenta" => Some(Color::LightMagenta),
        "lightcyan" | "light_cyan" => Some(Color::LightCyan),
        hex if hex.starts_with('#') && hex.len() == 7 => {
            let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
            let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
            let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

pub fn parse_border(s: &str) -> Option<BorderType> {
    match s.trim().to_lowercase().as_str() {
        "rounded" => Some(BorderType::Rounded),
        "plain" => Some(BorderType::Plain),
        "thick" => Some(BorderType::Thick),
        "double" => Some(BorderType::Double),
        _ => None,
    }
}

/// Parse a key binding: a single character or a named key.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let lower = s.trim().to_lowercase();
    match lower.as_str() {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        _ => {
            let mut chars = s.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

impl KeysConfig {
    /// Every binding with its config key name.
    pub fn bindings(&self) -> [(&'static str, &str); 8] {
        [
            ("play_pause", self.play_pause.as_str()),
            ("rewind", self.rewind.as_str()),
            ("reverse", self.reverse.as_str()),
            ("increment", self.increment.as_str()),
            ("decrement", self.decrement.as_str()),
            ("zero", self.zero.as_str()),
            ("help", self.help.as_str()),
            ("quit", self.quit.as_str()),
        ]
    }

    /// Whether `code` triggers `binding`. Unparseable bindings never match.
    pub fn matches(binding: &str, code: KeyCode) -> bool {
        parse_key(binding) == Some(code)
    }
}

// ─── Derived Values ─────────────────────────────────────────────────────

impl Config {
    /// Standard config file path: ~/.config/ui-behaviors/config.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ui-behaviors")
            .join("config.toml")
    }

    /// Log file, if logging is enabled
    pub fn log_file(&self) -> Option<PathBuf> {
        let path = self.general.log_file.trim();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    /// Tick interval from FPS
    pub fn tick_rate(&self) -> Duration {
        let fps = self.appearance.fps.max(1);
        Duration::from_millis(1000 / u64::from(fps))
    }

    /// Reject values the playground cannot run with.
    pub fn validate(&self) -> BehaviorResult<()> {
        if self.appearance.fps == 0 {
            return Err(BehaviorError::Config("appearance.fps must be at least 1".into()));
        }
        for (name, binding) in self.keys.bindings() {
            if parse_key(binding).is_none() {
                return Err(BehaviorError::Config(format!("keys.{name}: unknown key \"{binding}\"")));
            }
        }
        if let Some(frame) = self.sprite.pause_frames.iter().find(|&&f| f == 0) {
            return Err(BehaviorError::Config(format!("sprite.pause_frames: frame {frame} is out of range")));
        }
        Ok(())
    }

    /// Popup fade length; `None` = instant
    pub fn popup_duration(&self) -> Option<Duration> {
        (self.appearance.animations && self.popup.duration_ms > 0)
            .then(|| Duration::from_millis(self.popup.duration_ms))
    }
}

// ─── Bootloader ─────────────────────────────────────────────────────────

/// The single entry point for configuration. Called exactly once at startup.
///
/// 1. Resolve config file path (CLI override or default)
/// 2. If the file doesn't exist, create the directory tree and write defaults
/// 3. Parse TOML from disk into Config
/// 4. Apply CLI overrides on top
pub fn load(cli: &CliArgs) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG_TOML).wrap_err_with(|| {
            format!(
                "Failed to write default config to {}",
                config_path.display()
            )
        })?;
        info!("Created default config at {}", config_path.display());
    }

    let toml_str = std::fs::read_to_string(&config_path)
        .wrap_err_with(|| format!("Failed to read config from {}", config_path.display()))?;

    let mut config = parse(&toml_str).wrap_err_with(|| {
        format!(
            "Failed to parse config at {}.\n\
             Delete the file to regenerate defaults, or run:\n  \
             ui-behaviors --print-default-config > {:?}",
            config_path.display(),
            config_path
        )
    })?;

    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

pub fn parse(toml_str: &str) -> Result<Config> {
    Ok(toml::from_str(toml_str)?)
}

fn apply_overrides(config: &mut Config, cli: &CliArgs) {
    if let Some(ref path) = cli.log_file {
        config.general.log_file = path.display().to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(fps) = cli.fps {
        config.appearance.fps = fps;
    }
    if cli.no_animations {
        config.appearance.animations = false;
    }
    if cli.no_mouse {
        config.appearance.mouse = false;
    }
}

/// Returns the embedded default config TOML string.
pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}
