// Addon protocol payloads: manifest and subtitle lookup.
// Lookup only hands back a URL; the document itself is generated when that URL is fetched.

use serde::Serialize;

use crate::config;
use crate::types::ClockConfig;

pub const ADDON_ID: &str = "community.flashclock";
pub const SUBTITLE_ID: &str = "flashclock-time";
pub const SUBTITLE_LABEL: &str = "🕒 Flash Clock (Top Right)";
/// Path of the document endpoint, relative to the base URL.
pub const VTT_PATH: &str = "/flashclock.vtt";

/// Media kinds the addon provides subtitles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Movie, MediaKind::Series];

    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "movie" => Some(MediaKind::Movie),
            "series" => Some(MediaKind::Series),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

/// One user-editable setting, rendered by the player as a select box.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigOption {
    pub key: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub options: Vec<&'static str>,
    pub default: &'static str,
}

impl ConfigOption {
    fn select(key: &'static str, title: &'static str, options: &[&'static str], default: &'static str) -> Self {
        ConfigOption {
            key,
            kind: "select",
            title,
            options: options.to_vec(),
            default,
        }
    }
}

/// Addon description advertised to the player.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub catalogs: Vec<String>,
    pub behavior_hints: BehaviorHints,
    pub config: Vec<ConfigOption>,
}

impl Manifest {
    pub fn new() -> Self {
        Manifest {
            id: ADDON_ID,
            version: env!("CARGO_PKG_VERSION"),
            name: SUBTITLE_LABEL,
            description: "Digital clock overlay via subtitles. Flashes the current time briefly, \
                          then disappears.",
            resources: vec!["subtitles"],
            types: MediaKind::ALL.iter().map(MediaKind::as_str).collect(),
            catalogs: Vec::new(),
            behavior_hints: BehaviorHints {
                configurable: true,
                configuration_required: false,
            },
            config: vec![
                ConfigOption::select("timeFormat", "Time Format", &["24h", "12h"], "24h"),
                ConfigOption::select(
                    "flashDurationSec",
                    "Flash Duration (seconds)",
                    &["3", "5", "10", "15", "30", "60"],
                    "10",
                ),
                ConfigOption::select(
                    "repeatIntervalSec",
                    "Repeat Interval (seconds)",
                    &["10", "20", "30", "60", "120", "300"],
                    "60",
                ),
                ConfigOption::select(
                    "mode",
                    "Display Mode",
                    &["flash", "always-on", "subliminal"],
                    "flash",
                ),
            ],
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to a fetchable subtitle track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleRef {
    pub id: String,
    pub lang: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SubtitlesResponse {
    pub subtitles: Vec<SubtitleRef>,
}

/// URL of the clock track for `config`, with the encoded token as the `cfg` query value.
pub fn subtitle_url(base_url: &str, config: &ClockConfig) -> serde_json::Result<String> {
    Ok(format!(
        "{}{}?cfg={}",
        base_url,
        VTT_PATH,
        urlencoding::encode(&config::encode(config)?)
    ))
}

/// Subtitle lookup. Unsupported media kinds get an empty list, not an error.
pub fn subtitles_for(
    kind: &str,
    config: &ClockConfig,
    base_url: &str,
) -> serde_json::Result<SubtitlesResponse> {
    if MediaKind::parse(kind).is_none() {
        return Ok(SubtitlesResponse::default());
    }

    Ok(SubtitlesResponse {
        subtitles: vec![SubtitleRef {
            id: SUBTITLE_ID.to_string(),
            lang: "eng".to_string(),
            label: SUBTITLE_LABEL.to_string(),
            url: subtitle_url(base_url, config)?,
        }],
    })
}
