// Cue sequence generation over a fixed 12-hour horizon.
// Loop bound is on cue start only; end times are never clipped, so flash cues may run past the horizon.

use chrono::{DateTime, Duration, TimeZone};
use log::warn;

use crate::clock::format_clock;
use crate::types::*;

/// Total span a generated document covers.
pub const HORIZON_SECS: u64 = 12 * 60 * 60;

const SUBLIMINAL_SPAN_MS: u64 = 50;

/// Generates the cue sequence for one resolved configuration.
pub struct CueGenerator {
    config: ClockConfig,
}

impl CueGenerator {
    pub fn new(config: ClockConfig) -> Self {
        CueGenerator { config }
    }

    /// Seconds between cue starts. Never zero.
    pub fn step_secs(&self) -> u64 {
        match self.config.mode {
            DisplayMode::AlwaysOn | DisplayMode::Subliminal => 1,
            DisplayMode::Flash => u64::from(self.config.repeat_interval_secs.max(1)),
        }
    }

    /// How long each cue stays visible, in milliseconds.
    pub fn span_ms(&self) -> u64 {
        match self.config.mode {
            DisplayMode::AlwaysOn => 1000,
            DisplayMode::Subliminal => SUBLIMINAL_SPAN_MS,
            DisplayMode::Flash => u64::from(self.config.flash_duration_secs) * 1000,
        }
    }

    /// Number of cues a document will hold: ceil(horizon / step).
    pub fn cue_count(&self) -> usize {
        HORIZON_SECS.div_ceil(self.step_secs()) as usize
    }

    /// Generate every cue for a document whose first cue shows `base`.
    /// Stops early if the clock would leave chrono's date range.
    pub fn generate<Tz: TimeZone>(&self, base: &DateTime<Tz>) -> Vec<Cue> {
        let step = self.step_secs();
        let span = self.span_ms();
        let mut cues = Vec::with_capacity(self.cue_count());

        let mut t = 0u64;
        while t < HORIZON_SECS {
            let Some(instant) = base.clone().checked_add_signed(Duration::seconds(t as i64)) else {
                warn!("Clock runs past the representable date range after {} cues", cues.len());
                break;
            };
            let start = CueTime::from_secs(t);

            cues.push(Cue {
                index: cues.len() as u32 + 1,
                start,
                end: CueTime::from_millis(start.as_millis() + span),
                text: format_clock(&instant, self.config.time_format),
                render_hint: RenderHint::TOP_RIGHT,
            });

            t += step;
        }

        cues
    }
}

/// Generate the cue sequence for `config` starting at `base`.
pub fn generate<Tz: TimeZone>(config: &ClockConfig, base: &DateTime<Tz>) -> Vec<Cue> {
    CueGenerator::new(*config).generate(base)
}
