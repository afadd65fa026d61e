// Configuration token decoding and per-field defaulting.
// Decode strategies run in a fixed order; the first success wins, and resolution itself never fails.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::types::{
    ClockConfig, DisplayMode, TimeFormat, DEFAULT_FLASH_DURATION_SECS,
    DEFAULT_REPEAT_INTERVAL_SECS,
};

/// Standard alphabet; padding written on encode, optional on decode.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const TIME_FORMAT_KEYS: &[&str] = &["timeFormat"];
const FLASH_DURATION_KEYS: &[&str] = &["flashDurationSec", "flashDurationSeconds"];
const REPEAT_INTERVAL_KEYS: &[&str] = &["repeatIntervalSec", "repeatIntervalSeconds"];
const MODE_KEYS: &[&str] = &["mode"];

/// One way of turning a token into a key/value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDecoding {
    /// Base64 of a JSON object.
    Base64Json,
    /// Percent-encoded JSON object (plain JSON passes through unchanged).
    PercentEncodedJson,
}

impl TokenDecoding {
    /// Order in which strategies are tried.
    pub const ORDER: [TokenDecoding; 2] = [TokenDecoding::Base64Json, TokenDecoding::PercentEncodedJson];

    pub fn decode(self, token: &str) -> Result<Map<String, Value>, ConfigError> {
        let json = match self {
            TokenDecoding::Base64Json => String::from_utf8(TOKEN_ENGINE.decode(token)?)?,
            TokenDecoding::PercentEncodedJson => urlencoding::decode(token)?.into_owned(),
        };

        match serde_json::from_str::<Value>(&json)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(ConfigError::NotAnObject),
        }
    }
}

/// Decode a raw token into its key/value object. Anything undecodable yields an empty object.
pub fn decode_token(token: &str) -> Map<String, Value> {
    if token.is_empty() {
        return Map::new();
    }

    TokenDecoding::ORDER
        .iter()
        .find_map(|strategy| match strategy.decode(token) {
            Ok(fields) => Some(fields),
            Err(err) => {
                debug!("Config token rejected by {:?}: {}", strategy, err);
                None
            }
        })
        .unwrap_or_default()
}

/// Resolve a raw token into a complete configuration.
pub fn resolve(token: &str) -> ClockConfig {
    from_fields(&decode_token(token))
}

/// Build a configuration from decoded fields, defaulting each field independently.
/// Unrecognized keys are ignored.
pub fn from_fields(fields: &Map<String, Value>) -> ClockConfig {
    let config = ClockConfig {
        time_format: first_usable(fields, TIME_FORMAT_KEYS, |v| {
            text_value(v).and_then(TimeFormat::from_name)
        })
        .unwrap_or_default(),
        flash_duration_secs: first_usable(fields, FLASH_DURATION_KEYS, seconds_value)
            .unwrap_or(DEFAULT_FLASH_DURATION_SECS),
        repeat_interval_secs: first_usable(fields, REPEAT_INTERVAL_KEYS, seconds_value)
            .unwrap_or(DEFAULT_REPEAT_INTERVAL_SECS),
        mode: first_usable(fields, MODE_KEYS, |v| {
            text_value(v).and_then(DisplayMode::from_name)
        })
        .unwrap_or_default(),
    };

    if config.has_overlapping_flashes() {
        warn!(
            "Flash duration {}s exceeds repeat interval {}s; cues will overlap",
            config.flash_duration_secs, config.repeat_interval_secs
        );
    }

    config
}

/// Encode a configuration as a token: canonical JSON, then standard base64.
pub fn encode(config: &ClockConfig) -> serde_json::Result<String> {
    Ok(TOKEN_ENGINE.encode(config.canonical_json()?))
}

fn first_usable<T>(
    fields: &Map<String, Value>,
    keys: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter().filter_map(|key| fields.get(*key)).find_map(parse)
}

fn text_value(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// A positive whole number of seconds, from a JSON number or a string with a leading integer.
/// Zero, negative, and non-numeric values are unusable.
fn seconds_value(value: &Value) -> Option<u32> {
    let secs = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f.trunc() as u64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }?;

    u32::try_from(secs).ok().filter(|secs| *secs > 0)
}

/// Leading decimal digits after optional whitespace, e.g. `" 15s"` -> 15.
fn leading_integer(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let digits = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    text[..digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn empty_token_resolves_to_defaults() {
        let config = resolve("");
        assert_eq!(config, ClockConfig::default());
        assert_eq!(config.time_format, TimeFormat::H24);
        assert_eq!(config.flash_duration_secs, 10);
        assert_eq!(config.repeat_interval_secs, 60);
        assert_eq!(config.mode, DisplayMode::Flash);
    }

    #[test]
    fn garbage_token_resolves_to_defaults() {
        assert_eq!(resolve("%%%not-a-token"), ClockConfig::default());
        assert_eq!(resolve("bnVsbA=="), ClockConfig::default()); // base64 of `null`
    }

    #[test]
    fn base64_token_is_decoded() {
        // {"timeFormat":"12h","mode":"always-on"}
        let token = "eyJ0aW1lRm9ybWF0IjoiMTJoIiwibW9kZSI6ImFsd2F5cy1vbiJ9";
        let config = resolve(token);
        assert_eq!(config.time_format, TimeFormat::H12);
        assert_eq!(config.mode, DisplayMode::AlwaysOn);
        assert_eq!(config.flash_duration_secs, 10);
    }

    #[test]
    fn unpadded_base64_is_accepted() {
        let token = encode(&ClockConfig {
            repeat_interval_secs: 300,
            ..ClockConfig::default()
        })
        .unwrap();
        let config = resolve(token.trim_end_matches('='));
        assert_eq!(config.repeat_interval_secs, 300);
    }

    #[test]
    fn percent_encoded_json_falls_back() {
        let token = "%7B%22mode%22%3A%22subliminal%22%2C%22repeatIntervalSec%22%3A%22120%22%7D";
        let config = resolve(token);
        assert_eq!(config.mode, DisplayMode::Subliminal);
        assert_eq!(config.repeat_interval_secs, 120);
    }

    #[test]
    fn plain_json_token_is_accepted() {
        let config = resolve(r#"{"flashDurationSec":3}"#);
        assert_eq!(config.flash_duration_secs, 3);
    }

    #[test]
    fn strategies_report_typed_failures() {
        assert!(matches!(
            TokenDecoding::Base64Json.decode("{}"),
            Err(ConfigError::Base64(_))
        ));
        assert!(matches!(
            TokenDecoding::PercentEncodedJson.decode("[1,2]"),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn falsy_and_unknown_values_take_defaults() {
        let config = from_fields(&fields(json!({
            "timeFormat": "",
            "flashDurationSec": 0,
            "repeatIntervalSec": null,
            "mode": "bogus",
            "opacity": 30
        })));
        assert_eq!(config, ClockConfig::default());
    }

    #[test]
    fn numeric_strings_and_fractions_are_accepted() {
        let config = from_fields(&fields(json!({
            "flashDurationSec": "15",
            "repeatIntervalSec": 120.7
        })));
        assert_eq!(config.flash_duration_secs, 15);
        assert_eq!(config.repeat_interval_secs, 120);

        let config = from_fields(&fields(json!({ "flashDurationSec": " 30s" })));
        assert_eq!(config.flash_duration_secs, 30);
    }

    #[test]
    fn unusable_numbers_take_defaults() {
        let config = from_fields(&fields(json!({
            "flashDurationSec": -5,
            "repeatIntervalSec": "soon"
        })));
        assert_eq!(config.flash_duration_secs, 10);
        assert_eq!(config.repeat_interval_secs, 60);

        let config = from_fields(&fields(json!({ "repeatIntervalSec": 1u64 << 40 })));
        assert_eq!(config.repeat_interval_secs, 60);
    }

    #[test]
    fn long_field_names_are_aliases() {
        let config = from_fields(&fields(json!({
            "flashDurationSeconds": 5,
            "repeatIntervalSeconds": 20
        })));
        assert_eq!(config.flash_duration_secs, 5);
        assert_eq!(config.repeat_interval_secs, 20);
    }

    #[test]
    fn overlapping_flashes_are_kept() {
        let config = from_fields(&fields(json!({
            "flashDurationSec": 60,
            "repeatIntervalSec": 10
        })));
        assert_eq!(config.flash_duration_secs, 60);
        assert_eq!(config.repeat_interval_secs, 10);
        assert!(config.has_overlapping_flashes());
    }

    #[test]
    fn encode_is_standard_base64_of_canonical_json() {
        assert_eq!(
            encode(&ClockConfig::default()).unwrap(),
            "eyJ0aW1lRm9ybWF0IjoiMjRoIiwiZmxhc2hEdXJhdGlvblNlYyI6MTAsInJlcGVhdEludGVydmFsU2VjIjo2MCwibW9kZSI6ImZsYXNoIn0="
        );
    }

    fn config_strategy() -> impl Strategy<Value = ClockConfig> {
        (
            prop_oneof![Just(TimeFormat::H24), Just(TimeFormat::H12)],
            1u32..=u32::MAX,
            1u32..=u32::MAX,
            prop_oneof![
                Just(DisplayMode::Flash),
                Just(DisplayMode::AlwaysOn),
                Just(DisplayMode::Subliminal)
            ],
        )
            .prop_map(|(time_format, flash, repeat, mode)| ClockConfig {
                time_format,
                flash_duration_secs: flash,
                repeat_interval_secs: repeat,
                mode,
            })
    }

    proptest! {
        /// resolve(encode(c)) == c for every valid configuration.
        #[test]
        fn encode_then_resolve_is_identity(config in config_strategy()) {
            prop_assert_eq!(resolve(&encode(&config).unwrap()), config);
        }

        /// Resolution is total: arbitrary input never panics and always yields positive numbers.
        #[test]
        fn resolve_is_total(token in ".*") {
            let config = resolve(&token);
            prop_assert!(config.flash_duration_secs > 0);
            prop_assert!(config.repeat_interval_secs > 0);
        }
    }
}
