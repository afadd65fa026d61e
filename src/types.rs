// Strong typing over strings. Newtypes for cue offsets, enums for format and display mode.
// Everything downstream of config resolution works with these, never with raw token values.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Cue offset from the start of the document, in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct CueTime(u64);

impl CueTime {
    pub fn from_millis(ms: u64) -> Self {
        CueTime(ms)
    }

    /// Saturates at `u64::MAX` milliseconds.
    pub fn from_secs(secs: u64) -> Self {
        CueTime(secs.saturating_mul(1000))
    }

    /// Fractional seconds, truncated (never rounded) to millisecond precision.
    /// Negative and non-finite inputs map to zero; offsets past `u64::MAX` ms saturate.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return CueTime(0);
        }
        let whole = secs.trunc();
        let millis = ((secs - whole) * 1000.0).floor();
        CueTime((whole as u64).saturating_mul(1000).saturating_add(millis as u64))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Renders as a WebVTT timestamp, `HH:MM:SS.mmm`.
impl fmt::Display for CueTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3_600_000;
        let minutes = (self.0 % 3_600_000) / 60_000;
        let seconds = (self.0 % 60_000) / 1000;
        let millis = self.0 % 1000;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

/// Clock display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeFormat {
    /// `HH:MM`, zero-padded.
    #[default]
    H24,
    /// `H:MM AM|PM`.
    H12,
}

impl TimeFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "24h" => Some(TimeFormat::H24),
            "12h" => Some(TimeFormat::H12),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::H24 => "24h",
            TimeFormat::H12 => "12h",
        }
    }
}

/// How often cues appear and how long each one stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    /// Visible for the flash duration once per repeat interval.
    #[default]
    Flash,
    /// A one-second cue for every second of the horizon.
    AlwaysOn,
    /// A 50ms cue every second; effectively only visible when paused.
    Subliminal,
}

impl DisplayMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flash" => Some(DisplayMode::Flash),
            "always-on" => Some(DisplayMode::AlwaysOn),
            "subliminal" => Some(DisplayMode::Subliminal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Flash => "flash",
            DisplayMode::AlwaysOn => "always-on",
            DisplayMode::Subliminal => "subliminal",
        }
    }
}

pub const DEFAULT_FLASH_DURATION_SECS: u32 = 10;
pub const DEFAULT_REPEAT_INTERVAL_SECS: u32 = 60;

impl Serialize for TimeFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for DisplayMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fully resolved clock configuration. Every field always holds a concrete value.
/// Serializes with the token's wire names, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClockConfig {
    #[serde(rename = "timeFormat")]
    pub time_format: TimeFormat,
    /// Seconds a flash-mode cue stays visible.
    #[serde(rename = "flashDurationSec")]
    pub flash_duration_secs: u32,
    /// Seconds between the starts of consecutive flash-mode cues.
    #[serde(rename = "repeatIntervalSec")]
    pub repeat_interval_secs: u32,
    pub mode: DisplayMode,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            time_format: TimeFormat::H24,
            flash_duration_secs: DEFAULT_FLASH_DURATION_SECS,
            repeat_interval_secs: DEFAULT_REPEAT_INTERVAL_SECS,
            mode: DisplayMode::Flash,
        }
    }
}

impl ClockConfig {
    /// Flash cues outlast the gap to the next one, so consecutive cues overlap.
    /// Permitted; callers only get told about it.
    pub fn has_overlapping_flashes(&self) -> bool {
        self.mode == DisplayMode::Flash && self.flash_duration_secs > self.repeat_interval_secs
    }

    /// Canonical JSON form with a fixed key order. Used for tokens and cache keys.
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Cue alignment relative to its position anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueAlign {
    Start,
    Center,
    End,
}

impl CueAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueAlign::Start => "start",
            CueAlign::Center => "center",
            CueAlign::End => "end",
        }
    }
}

/// WebVTT cue settings. Constant across a document, never computed per cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderHint {
    pub line_percent: u8,
    pub position_percent: u8,
    pub align: CueAlign,
}

impl RenderHint {
    /// Small offset from the top, anchored to the right edge.
    pub const TOP_RIGHT: RenderHint = RenderHint {
        line_percent: 5,
        position_percent: 95,
        align: CueAlign::End,
    };
}

impl fmt::Display for RenderHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line:{}% position:{}% align:{}",
            self.line_percent,
            self.position_percent,
            self.align.as_str()
        )
    }
}

/// One timed subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based, strictly increasing within a document.
    pub index: u32,
    pub start: CueTime,
    /// Not clipped to the horizon.
    pub end: CueTime,
    /// Clock text for the instant at `start`.
    pub text: String,
    pub render_hint: RenderHint,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {} {}", self.start, self.end, self.render_hint)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Host-side service settings, passed in as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Deployment hostname; wins over everything else when set.
    #[serde(default)]
    pub vercel_url: Option<String>,
    /// Explicit public base URL of the addon.
    #[serde(default)]
    pub addon_url: Option<String>,
    /// Local listening port, used for the fallback base URL.
    #[serde(default = "default_port")]
    pub port: u16,
    /// How long a generated document is reused (milliseconds).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_ms: u64,
    /// Entry count above which expired entries are swept.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_port() -> u16 {
    7000
}

fn default_cache_ttl() -> u64 {
    30_000 // 30s
}

fn default_cache_capacity() -> usize {
    100
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            vercel_url: None,
            addon_url: None,
            port: default_port(),
            cache_ttl_ms: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ServiceSettings {
    /// Public base URL the subtitle resource links point at.
    pub fn base_url(&self) -> String {
        let non_empty = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned);

        if let Some(host) = non_empty(&self.vercel_url) {
            return format!("https://{}", host);
        }
        non_empty(&self.addon_url)
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }

    /// Client cache hint in whole seconds, matching the document cache lifetime.
    pub fn max_age_secs(&self) -> u64 {
        self.cache_ttl_ms / 1000
    }
}
