//! Dashboard configuration

use std::path::Path;
use std::time::Duration;

use dashboard_dom::ObserveOptions;
use dashboard_page::{FilterTimings, ResponsiveSettings};
use dashboard_tabs::TransitionTimings;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::Result;

/// Tab panels the dashboard page is expected to ship
pub const EXPECTED_TABS: [&str; 7] = [
    "overview",
    "process",
    "matrix",
    "data",
    "architecture",
    "claims",
    "innovation",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Panel crossfade durations
    pub tabs: TransitionTimings,
    /// Tab ids checked at startup; missing ones are logged
    pub expected_tabs: Vec<String>,
    pub frame_interval_ms: u64,
    pub filter: FilterTimings,
    pub responsive: ResponsiveSettings,
    pub perf_resize_debounce_ms: u64,
    /// Observation options for scroll reveal
    pub reveal: ObserveOptions,
    /// Page URL that in-page anchors are resolved against
    pub base_url: String,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(CoreError::Config("frame_interval_ms must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(CoreError::Config(format!(
                "reveal threshold {} outside 0..=1",
                self.reveal.threshold
            )));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| CoreError::Config(format!("base_url {}: {}", self.base_url, e)))?;
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn perf_resize_debounce(&self) -> Duration {
        Duration::from_millis(self.perf_resize_debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tabs: TransitionTimings::default(),
            expected_tabs: EXPECTED_TABS.iter().map(|s| s.to_string()).collect(),
            frame_interval_ms: 16,
            filter: FilterTimings::default(),
            responsive: ResponsiveSettings::default(),
            perf_resize_debounce_ms: 100,
            reveal: ObserveOptions {
                threshold: 0.1,
                root_margin: "0px 0px -50px 0px".to_string(),
            },
            base_url: "http://localhost/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(r#"{ "tabs": { "fade_in_ms": 300 } }"#).unwrap();

        assert_eq!(config.tabs.fade_out_ms, 150);
        assert_eq!(config.tabs.fade_in_ms, 300);
        assert_eq!(config.expected_tabs.len(), 7);
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        assert_eq!(config.filter.cleanup_ms, 800);
        assert_eq!(config.responsive.mobile_breakpoint, 768);
        assert_eq!(config.reveal.root_margin, "0px 0px -50px 0px");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_json_str(r#"{ "frame_interval_ms": 0 }"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{ "base_url": "dashboard" }"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{ "reveal": { "threshold": 2.0 } }"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json_str("{ not json"),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("patent-dashboard-missing-config.json");
        assert!(matches!(Config::load(&path), Err(CoreError::Io(_))));
    }
}
