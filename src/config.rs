use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use serde_yaml::Value;
use thiserror::Error;

use crate::sources::{HexColor, SourceDescriptor};

pub const DEFAULT_PATH: &str = "sat-o-sky.yaml";

const KNOWN_KEYS: &[&str] = &[
    "cache_dir",
    "bind",
    "seconds_per_step",
    "default_location",
    "color_outline",
    "color_alpha",
    "color_picked",
    "update_pause_ms",
    "pick_interval_ms",
    "window_size",
    "user_agent",
    "sources",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub bind: String,
    /// Simulated seconds per tick; 0 runs in real time.
    pub seconds_per_step: i64,
    pub default_location: String,
    pub color_outline: HexColor,
    pub color_alpha: f64,
    pub color_picked: HexColor,
    pub update_pause: Duration,
    pub pick_interval: Duration,
    pub window_size: (u32, u32),
    pub user_agent: String,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("tle-cache"),
            bind: "127.0.0.1:8080".to_string(),
            seconds_per_step: 0,
            default_location: "Abilene, TX".to_string(),
            color_outline: HexColor::parse("#000000").unwrap_or_else(HexColor::white),
            color_alpha: 0.5,
            color_picked: HexColor::parse("#ff00ff").unwrap_or_else(HexColor::white),
            update_pause: Duration::from_millis(250),
            pick_interval: Duration::from_millis(100),
            window_size: (800, 800),
            user_agent: format!("sat-o-sky/{}", env!("CARGO_PKG_VERSION")),
            sources: default_sources(),
        }
    }
}

pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "McCants classifieds",
            "https://www.prismnet.com/~mmccants/tles/classfd.zip",
            "classfd.zip",
            "#000000",
        ),
        SourceDescriptor::new(
            "AUS-CITY all",
            "http://www.tle.info/data/ALL_TLE.ZIP",
            "ALL_TLE.ZIP",
            "#ffffff",
        ),
        SourceDescriptor::new(
            "Celestrak visual",
            "https://celestrak.org/NORAD/elements/visual.txt",
            "visual.txt",
            "#00ff00",
        ),
        SourceDescriptor::new(
            "Celestrak BREEZE-M R/B",
            "https://celestrak.org/NORAD/elements/2012-044.txt",
            "2012-044.txt",
            "#ff0000",
        ),
    ]
}

impl Config {
    /// Reads the config file, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Cannot load {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(content)?;
        Ok(Self::from_value(&value))
    }

    /// Extracts each key on its own. A malformed key is reported and replaced
    /// by its default; the rest of the document still applies.
    pub fn from_value(value: &Value) -> Self {
        let mut config = Self::default();
        let map = match value {
            Value::Mapping(map) => map,
            Value::Null => return config,
            _ => {
                log::warn!("Config document is not a mapping, using defaults");
                return config;
            }
        };

        for key in map.keys() {
            match key.as_str() {
                Some(k) if KNOWN_KEYS.contains(&k) => {}
                _ => log::warn!("Ignoring unknown config key {:?}", key),
            }
        }

        if let Some(v) = field(value, "cache_dir", string) {
            config.cache_dir = PathBuf::from(v);
        }
        if let Some(v) = field(value, "bind", non_empty) {
            config.bind = v;
        }
        if let Some(v) = field(value, "seconds_per_step", |v| {
            let secs = v.as_i64().ok_or_else(|| "expected an integer".to_string())?;
            match TimeDelta::try_seconds(secs) {
                Some(_) => Ok(secs),
                None => Err(format!("{} seconds is out of range", secs)),
            }
        }) {
            config.seconds_per_step = v;
        }
        if let Some(v) = field(value, "default_location", non_empty) {
            config.default_location = v;
        }
        if let Some(v) = field(value, "color_outline", color) {
            config.color_outline = v;
        }
        if let Some(v) = field(value, "color_alpha", |v| {
            let alpha = v.as_f64().ok_or_else(|| "expected a number".to_string())?;
            if (0.0..=1.0).contains(&alpha) {
                Ok(alpha)
            } else {
                Err(format!("{} is outside 0.0..=1.0", alpha))
            }
        }) {
            config.color_alpha = v;
        }
        if let Some(v) = field(value, "color_picked", color) {
            config.color_picked = v;
        }
        if let Some(v) = field(value, "update_pause_ms", |v| match v.as_u64() {
            Some(0) => Err("must be greater than zero".to_string()),
            Some(ms) => Ok(ms),
            None => Err("expected a positive integer".to_string()),
        }) {
            config.update_pause = Duration::from_millis(v);
        }
        if let Some(v) = field(value, "pick_interval_ms", |v| {
            v.as_u64()
                .ok_or_else(|| "expected a non-negative integer".to_string())
        }) {
            config.pick_interval = Duration::from_millis(v);
        }
        if let Some(v) = field(value, "window_size", window_size) {
            config.window_size = v;
        }
        if let Some(v) = field(value, "user_agent", non_empty) {
            config.user_agent = v;
        }
        if let Some(v) = field(value, "sources", sources) {
            config.sources = v;
        }

        config
    }
}

fn field<T>(
    value: &Value,
    key: &str,
    extract: impl Fn(&Value) -> Result<T, String>,
) -> Option<T> {
    let raw = value.get(key)?;
    match extract(raw) {
        Ok(v) => Some(v),
        Err(reason) => {
            let err = ConfigError::Invalid {
                key: key.to_string(),
                reason,
            };
            log::warn!("{}; using the default", err);
            None
        }
    }
}

fn string(v: &Value) -> Result<String, String> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| "expected a string".to_string())
}

fn non_empty(v: &Value) -> Result<String, String> {
    let s = string(v)?;
    if s.trim().is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(s)
    }
}

fn color(v: &Value) -> Result<HexColor, String> {
    let s = string(v)?;
    HexColor::parse(&s).ok_or_else(|| format!("{:?} is not a #rgb or #rrggbb color", s))
}

fn window_size(v: &Value) -> Result<(u32, u32), String> {
    let dims: Vec<u32> = v
        .as_sequence()
        .ok_or_else(|| "expected [width, height]".to_string())?
        .iter()
        .map(|d| {
            d.as_u64()
                .and_then(|d| u32::try_from(d).ok())
                .filter(|d| *d > 0)
                .ok_or_else(|| format!("{:?} is not a positive size", d))
        })
        .collect::<Result<_, _>>()?;
    match dims[..] {
        [w, h] => Ok((w, h)),
        _ => Err(format!("expected two sizes, got {}", dims.len())),
    }
}

fn sources(v: &Value) -> Result<Vec<SourceDescriptor>, String> {
    let entries = v
        .as_sequence()
        .ok_or_else(|| "expected a list of sources".to_string())?;

    let mut sources = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::trim);
        let (Some(name), Some(url), Some(file)) = (text("name"), text("url"), text("file")) else {
            log::warn!("Skipping source #{}: needs name, url and file", i + 1);
            continue;
        };
        let mut source = SourceDescriptor::new(name, url, file, "#ffffff");
        match entry.get("color") {
            None => {}
            Some(raw) => match color(raw) {
                Ok(c) => source.color = c,
                Err(reason) => log::warn!("Source {}: {}; using white", name, reason),
            },
        }
        sources.push(source);
    }
    Ok(sources)
}
