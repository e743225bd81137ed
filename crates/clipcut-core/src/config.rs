//! Editor configuration.

use std::time::Duration;

use tracing::debug;

use crate::editing;
use crate::error::{ClipCutError, Result};

/// Runtime settings for an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Base URL of the processing service (job submit/status/finalize, captions)
    pub service_url: String,
    /// Job status polling cadence
    pub poll_interval: Duration,
    /// Seek suppression window after a drag ends
    pub seek_debounce: Duration,
    /// Minimum clip length in seconds
    pub min_clip_length: f64,
    /// Width of the edge grab zone in pixels
    pub edge_handle_px: f64,
    /// Fixed source timeline duration; derived from the clips when unset
    pub timeline_duration: Option<f64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8000".to_string(),
            poll_interval: editing::POLL_INTERVAL,
            seek_debounce: editing::SEEK_DEBOUNCE,
            min_clip_length: editing::MIN_CLIP_LENGTH,
            edge_handle_px: editing::EDGE_HANDLE_PX,
            timeline_duration: None,
        }
    }
}

impl EditorConfig {
    /// Create config from environment variables.
    ///
    /// Recognized: `CLIPCUT_SERVICE_URL`, `CLIPCUT_POLL_INTERVAL_MS`,
    /// `CLIPCUT_SEEK_DEBOUNCE_MS`, `CLIPCUT_MIN_CLIP_LENGTH`,
    /// `CLIPCUT_TIMELINE_DURATION`. Unset variables keep their defaults;
    /// malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("CLIPCUT_SERVICE_URL") {
            config.service_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CLIPCUT_POLL_INTERVAL_MS")? {
            if ms == 0 {
                return Err(ClipCutError::Config(
                    "CLIPCUT_POLL_INTERVAL_MS must be greater than zero".into(),
                ));
            }
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CLIPCUT_SEEK_DEBOUNCE_MS")? {
            config.seek_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<f64>(&lookup, "CLIPCUT_MIN_CLIP_LENGTH")? {
            if secs.is_nan() || secs <= 0.0 {
                return Err(ClipCutError::Config(
                    "CLIPCUT_MIN_CLIP_LENGTH must be positive".into(),
                ));
            }
            config.min_clip_length = secs;
        }
        if let Some(secs) = parse_var::<f64>(&lookup, "CLIPCUT_TIMELINE_DURATION")? {
            config.timeline_duration = Some(secs);
        }

        debug!(?config, "Loaded editor configuration");
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClipCutError::Config(format!("{key} has an invalid value: {raw:?}"))),
    }
}
