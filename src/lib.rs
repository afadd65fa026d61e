// flashclock_core: Flash Clock Rust/WASM core.
// All cue logic lives here; the JS host only routes requests and serves the bytes.

mod addon;
mod cache;
mod clock;
mod config;
mod cues;
mod document;
mod error;
mod service;
mod types;

use chrono::{DateTime, Duration, FixedOffset};
use wasm_bindgen::prelude::*;

pub use addon::{subtitle_url, subtitles_for, Manifest, MediaKind, SubtitleRef, SubtitlesResponse};
pub use cache::{DocumentCache, NoCache, SystemClock, TimeSource, TtlCache};
pub use clock::{format_clock, format_timestamp, format_timestamp_secs};
pub use config::{decode_token, encode, from_fields, resolve, TokenDecoding};
pub use cues::{generate, CueGenerator, HORIZON_SECS};
pub use document::assemble;
pub use error::{ClockError, ConfigError};
pub use service::{ClockService, SubtitleDocument, VTT_CONTENT_TYPE};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Parse host settings JSON; missing fields take their defaults.
pub fn parse_settings(settings_json: &str) -> Result<ServiceSettings, ClockError> {
    serde_json::from_str(settings_json).map_err(|e| ClockError::InvalidSettings(e.to_string()))
}

/// Base instant for a document from host-supplied epoch milliseconds and an offset in
/// minutes east of UTC (JS hosts pass `-new Date().getTimezoneOffset()`).
/// The whole horizon after the instant must stay within chrono's date range.
pub fn instant_from_host(now_ms: i64, utc_offset_minutes: i32) -> Result<DateTime<FixedOffset>, ClockError> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ClockError::InvalidUtcOffset {
            minutes: utc_offset_minutes,
        })?;
    let invalid = || ClockError::InvalidTimestamp(now_ms as f64);
    let utc = DateTime::from_timestamp_millis(now_ms).ok_or_else(invalid)?;
    let now = utc.with_timezone(&offset);
    now.checked_add_signed(Duration::seconds(HORIZON_SECS as i64))
        .ok_or_else(invalid)?;
    Ok(now)
}

/// Epoch milliseconds as a JS number. NaN and infinities are rejected; fractions are truncated.
pub fn host_millis(now_ms: f64) -> Result<i64, ClockError> {
    if !now_ms.is_finite() {
        return Err(ClockError::InvalidTimestamp(now_ms));
    }
    Ok(now_ms.trunc() as i64)
}

/// Turn a configure-page selection (JSON object of raw field values) into a token.
pub fn encode_selection(selection_json: &str) -> Result<String, ClockError> {
    let value: serde_json::Value =
        serde_json::from_str(selection_json).map_err(|e| ClockError::InvalidSelection(e.to_string()))?;
    let fields = value
        .as_object()
        .ok_or_else(|| ClockError::InvalidSelection("expected a JSON object".to_string()))?;
    Ok(encode(&from_fields(fields))?)
}

fn to_js(err: ClockError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Main interface exposed to JavaScript. Constructed once per process.
#[wasm_bindgen]
pub struct FlashClock {
    service: ClockService,
}

#[wasm_bindgen]
impl FlashClock {
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<FlashClock, JsValue> {
        let settings = parse_settings(settings_json).map_err(to_js)?;
        Ok(FlashClock {
            service: ClockService::with_default_cache(settings),
        })
    }

    /// WebVTT body for a raw config token, anchored at `now_ms` (epoch milliseconds).
    #[wasm_bindgen(js_name = renderVtt)]
    pub fn render_vtt(&self, token: &str, now_ms: f64, utc_offset_minutes: i32) -> Result<String, JsValue> {
        let now = host_millis(now_ms)
            .and_then(|ms| instant_from_host(ms, utc_offset_minutes))
            .map_err(to_js)?;
        Ok(self.service.render(token, &now).body.to_string())
    }

    /// `Content-Type` header for rendered documents.
    #[wasm_bindgen(js_name = contentType)]
    pub fn content_type(&self) -> String {
        VTT_CONTENT_TYPE.to_string()
    }

    /// `Cache-Control` header for rendered documents.
    #[wasm_bindgen(js_name = cacheControl)]
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.service.settings().max_age_secs())
    }

    /// Subtitle lookup response as JSON.
    pub fn subtitles(&self, kind: &str, id: &str, token: &str) -> Result<String, JsValue> {
        let response = self.service.subtitles(kind, id, token).map_err(to_js)?;
        serde_json::to_string(&response).map_err(|e| to_js(e.into()))
    }

    /// Addon manifest as JSON.
    pub fn manifest(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.service.manifest()).map_err(|e| to_js(e.into()))
    }
}

/// Resolved configuration for a token, as canonical JSON (used to prefill the configure page).
#[wasm_bindgen(js_name = resolveConfig)]
pub fn resolve_config(token: &str) -> Result<String, JsValue> {
    resolve(token).canonical_json().map_err(|e| to_js(e.into()))
}

/// Token for a configure-page selection.
#[wasm_bindgen(js_name = encodeConfig)]
pub fn encode_config(selection_json: &str) -> Result<String, JsValue> {
    encode_selection(selection_json).map_err(to_js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_clock_creation_works() {
        let clock = FlashClock::new(r#"{"addon_url":"https://addon.example"}"#);
        assert!(clock.is_ok());
    }

    #[test]
    fn render_vtt_from_host_values() {
        let clock = FlashClock::new("{}").unwrap();
        // 2024-01-01T10:00:00Z shown at UTC+01:30
        let vtt = clock.render_vtt("", 1_704_103_200_000.0, 90).unwrap();
        assert!(vtt.starts_with("WEBVTT\n\n1\n00:00:00.000 --> 00:00:10.000 line:5% position:95% align:end\n11:30\n\n"));
        assert_eq!(clock.cache_control(), "public, max-age=30");
    }

    #[test]
    fn invalid_offsets_are_rejected() {
        assert!(matches!(
            instant_from_host(0, 24 * 60),
            Err(ClockError::InvalidUtcOffset { minutes: 1440 })
        ));
        assert!(matches!(
            instant_from_host(i64::MAX, 0),
            Err(ClockError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn instants_without_room_for_the_horizon_are_rejected() {
        let last_ms = DateTime::<chrono::Utc>::MAX_UTC.timestamp_millis();
        assert!(matches!(
            instant_from_host(last_ms - 1000, 0),
            Err(ClockError::InvalidTimestamp(_))
        ));
        let room = last_ms - (HORIZON_SECS as i64) * 1000;
        assert!(instant_from_host(room, 0).is_ok());
        assert!(instant_from_host(room + 1, 0).is_err());
    }

    #[test]
    fn non_finite_host_times_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(host_millis(bad), Err(ClockError::InvalidTimestamp(_))));
        }
        assert_eq!(host_millis(1_704_103_200_000.9).unwrap(), 1_704_103_200_000);
    }

    #[test]
    fn settings_errors_are_typed() {
        assert!(matches!(
            parse_settings("{\"port\": \"abc\"}"),
            Err(ClockError::InvalidSettings(_))
        ));
    }

    #[test]
    fn selection_round_trips_through_resolve() {
        let token = encode_selection(
            r#"{"timeFormat":"12h","flashDurationSec":"5","repeatIntervalSec":"20","mode":"flash"}"#,
        )
        .unwrap();
        assert_eq!(
            resolve_config(&token).unwrap(),
            r#"{"timeFormat":"12h","flashDurationSec":5,"repeatIntervalSec":20,"mode":"flash"}"#
        );
        assert!(matches!(
            encode_selection("[]"),
            Err(ClockError::InvalidSelection(_))
        ));
    }

    #[test]
    fn manifest_and_subtitles_serialize() {
        let clock = FlashClock::new("{}").unwrap();
        let manifest = clock.manifest().unwrap();
        assert!(manifest.contains("\"resources\":[\"subtitles\"]"));
        let subtitles = clock.subtitles("movie", "tt1", "").unwrap();
        assert!(subtitles.contains("http://localhost:7000/flashclock.vtt?cfg="));
        assert_eq!(clock.subtitles("podcast", "x", "").unwrap(), r#"{"subtitles":[]}"#);
    }
}
