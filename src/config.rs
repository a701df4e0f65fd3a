//! Engine configuration
//!
//! [`LazyConfig`] holds the tunables for both connection classes. It is
//! resolved once at boot against the [`NetworkProfile`] into
//! [`EngineSettings`], which is what the engine receives; nothing downstream
//! reads network state again.

use crate::lazy::NetworkProfile;
use crate::utils::Result;
use serde::Deserialize;
use std::path::Path;

/// Loading engine tunables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LazyConfig {
    /// Intersection root margin on fast connections
    pub margin_fast_px: f32,
    /// Intersection root margin on constrained connections
    pub margin_slow_px: f32,
    /// Polling fallback buffer on fast connections
    pub buffer_fast_px: f32,
    /// Polling fallback buffer on constrained connections
    pub buffer_slow_px: f32,
    /// Intersection ratio threshold
    pub threshold: f32,
    /// Upper bound on how long engine setup waits for an idle period
    pub idle_timeout_ms: u64,
    /// Delay used when idle callbacks are unavailable
    pub fallback_delay_ms: u64,
    /// Frame interval of the host
    pub frame_interval_ms: u64,
    /// Inject the boot stylesheet
    pub inject_styles: bool,
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            margin_fast_px: 400.0,
            margin_slow_px: 150.0,
            buffer_fast_px: 300.0,
            buffer_slow_px: 100.0,
            threshold: 0.0,
            idle_timeout_ms: 2000,
            fallback_delay_ms: 1,
            frame_interval_ms: 16,
            inject_styles: true,
        }
    }
}

impl LazyConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Resolve the connection-dependent values for this profile
    pub fn tuning(&self, profile: &NetworkProfile) -> EngineSettings {
        let (root_margin, scan_buffer) = if profile.is_slow {
            (self.margin_slow_px, self.buffer_slow_px)
        } else {
            (self.margin_fast_px, self.buffer_fast_px)
        };
        EngineSettings {
            root_margin,
            scan_buffer,
            threshold: self.threshold,
        }
    }
}

/// Values the observation engine runs with, fixed for the page lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Margin around the viewport for the intersection strategy
    pub root_margin: f32,
    /// Margin around the viewport for the polling strategy
    pub scan_buffer: f32,
    pub threshold: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        LazyConfig::default().tuning(&NetworkProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::EffectiveType;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LazyConfig::from_toml("margin_fast_px = 600.0\ninject_styles = false").unwrap();
        assert_eq!(config.margin_fast_px, 600.0);
        assert!(!config.inject_styles);
        assert_eq!(config.buffer_slow_px, 100.0);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(LazyConfig::from_toml("margin_fast_px = \"wide\"").is_err());
    }

    #[test]
    fn test_tuning_by_profile() {
        let config = LazyConfig::default();
        let fast = config.tuning(&NetworkProfile::default());
        let slow = config.tuning(&NetworkProfile {
            effective_type: EffectiveType::TwoG,
            is_slow: true,
            ..NetworkProfile::default()
        });

        assert!(fast.root_margin > slow.root_margin);
        assert!(fast.scan_buffer > slow.scan_buffer);
        assert_eq!(slow.root_margin, 150.0);
        assert_eq!(slow.scan_buffer, 100.0);
    }
}
