// Request orchestration: resolve the token, reuse a cached document or generate a fresh one.
// The cache is injected so hosts and tests can swap or disable it.

use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use log::{debug, info};

use crate::addon::{self, Manifest, SubtitlesResponse};
use crate::cache::{DocumentCache, TtlCache};
use crate::config;
use crate::cues::CueGenerator;
use crate::document;
use crate::error::ClockError;
use crate::types::{ClockConfig, ServiceSettings};

pub const VTT_CONTENT_TYPE: &str = "text/vtt; charset=utf-8";

/// A rendered subtitle track plus the headers it should be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDocument {
    pub body: Arc<str>,
    pub content_type: &'static str,
    pub cache_control: String,
    /// Whether the body came from the cache.
    pub cached: bool,
}

/// Long-lived service, constructed once per process.
pub struct ClockService {
    settings: ServiceSettings,
    cache: Box<dyn DocumentCache>,
}

impl ClockService {
    pub fn new(settings: ServiceSettings, cache: Box<dyn DocumentCache>) -> Self {
        ClockService { settings, cache }
    }

    /// Service with a TTL cache sized from the settings.
    pub fn with_default_cache(settings: ServiceSettings) -> Self {
        let cache = TtlCache::new(settings.cache_ttl_ms, settings.cache_capacity);
        Self::new(settings, Box::new(cache))
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Render the clock track for a raw token, anchored at `now`.
    pub fn render<Tz: TimeZone>(&self, token: &str, now: &DateTime<Tz>) -> SubtitleDocument {
        let config = config::resolve(token);
        self.render_config(&config, now)
    }

    pub fn render_config<Tz: TimeZone>(&self, config: &ClockConfig, now: &DateTime<Tz>) -> SubtitleDocument {
        let cache_control = format!("public, max-age={}", self.settings.max_age_secs());

        if let Some(body) = self.cache.get(config) {
            debug!("Cache hit for {:?}", config);
            return SubtitleDocument {
                body,
                content_type: VTT_CONTENT_TYPE,
                cache_control,
                cached: true,
            };
        }

        debug!("Cache miss for {:?}", config);
        let cues = CueGenerator::new(*config).generate(now);
        let body: Arc<str> = Arc::from(document::assemble(&cues));
        info!(
            "Generated {} cues ({} bytes) in {} mode",
            cues.len(),
            body.len(),
            config.mode.as_str()
        );
        self.cache.put(config, Arc::clone(&body));

        SubtitleDocument {
            body,
            content_type: VTT_CONTENT_TYPE,
            cache_control,
            cached: false,
        }
    }

    /// Subtitle lookup for the addon protocol.
    pub fn subtitles(&self, kind: &str, id: &str, token: &str) -> Result<SubtitlesResponse, ClockError> {
        info!("Subtitles request: type={}, id={}", kind, id);
        let config = config::resolve(token);
        Ok(addon::subtitles_for(kind, &config, &self.settings.base_url())?)
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::new()
    }
}
