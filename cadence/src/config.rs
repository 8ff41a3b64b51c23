use crate::tasks::TaskEntry;
use crate::timer::{Durations, SkipPolicy, DEFAULT_PRESET_ID};
use anyhow::{Context, Result};
use cadence_ipc::SOCKET_PATH;
use directories::ProjectDirs;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub icons: Icons,
    pub timer: TimerConfig,
    /// Focus queue loaded at startup, in order
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimerConfig {
    /// Preset selected at startup
    pub preset: String,
    pub skip_policy: SkipPolicy,
    /// `false` runs the two-phase focus/short-break cycle
    pub long_breaks: bool,
    pub desktop_notifications: bool,
    pub socket_path: PathBuf,
    /// Initial values of the custom preset
    pub custom: Durations,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub selection: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub black: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub red: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub green: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub yellow: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub blue: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub magenta: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub cyan: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub gray: Color,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub timer: String,
    pub presets: String,
    pub task: String,
    pub play: String,
    pub pause: String,
    pub idle: String,
    pub cycle_done: String,
    pub cycle_pending: String,
    pub select: String,
    pub progress_filled: String,
    pub progress_empty: String,
    pub separator: String,
    pub header_left: String,
    pub header_right: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET_ID.to_string(),
            skip_policy: SkipPolicy::default(),
            long_breaks: true,
            desktop_notifications: true,
            socket_path: PathBuf::from(SOCKET_PATH),
            custom: Durations::new(50, 10).with_long_break(20, 4),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(9, 14, 19),
            foreground: Color::Rgb(197, 201, 199),
            selection: Color::Rgb(230, 195, 132),
            black: Color::Rgb(13, 12, 12),
            red: Color::Rgb(228, 104, 118),
            green: Color::Rgb(138, 154, 123),
            yellow: Color::Rgb(196, 178, 138),
            blue: Color::Rgb(127, 180, 202),
            magenta: Color::Rgb(162, 146, 163),
            cyan: Color::Rgb(122, 168, 159),
            gray: Color::Rgb(164, 167, 164),
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            timer: "◷".to_string(),
            presets: "⬢".to_string(),
            task: "◆".to_string(),
            play: "▶".to_string(),
            pause: "⏸".to_string(),
            idle: "■".to_string(),
            cycle_done: "●".to_string(),
            cycle_pending: "○".to_string(),
            select: "▸".to_string(),
            progress_filled: "█".to_string(),
            progress_empty: "░".to_string(),
            separator: "│".to_string(),
            header_left: "⟪ ".to_string(),
            header_right: " ⟫".to_string(),
        }
    }
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    if !s.is_ascii() || !s.starts_with('#') || s.len() != 7 {
        return Err(serde::de::Error::custom("invalid hex color format"));
    }
    let r = u8::from_str_radix(&s[1..3], 16).map_err(serde::de::Error::custom)?;
    let g = u8::from_str_radix(&s[3..5], 16).map_err(serde::de::Error::custom)?;
    let b = u8::from_str_radix(&s[5..7], 16).map_err(serde::de::Error::custom)?;
    Ok(Color::Rgb(r, g, b))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "cadence", "Cadence")
}

/// Directory for the log file; falls back to the system temp dir.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}

pub fn parse_config(source: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(source)?;
    let custom = config.timer.custom;
    config.timer.custom = if config.timer.long_breaks {
        custom.clamped()
    } else {
        custom.without_long_break()
    };
    Ok(config)
}

pub fn load_config() -> Result<Config> {
    match project_dirs() {
        Some(proj_dirs) => {
            let path = proj_dirs.config_dir().join("cadence.toml");
            if path.exists() {
                let config_str = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file at {:?}", path))?;
                parse_config(&config_str)
                    .with_context(|| format!("Failed to parse config file at {:?}", path))
            } else {
                Ok(Config::default())
            }
        }
        None => Ok(Config::default()),
    }
}
