use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seconds-before-end at which a warning is raised
pub const DEFAULT_WARNING_THRESHOLDS: [u64; 4] = [300, 120, 60, 30];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minutes used when neither a template nor a timed agenda gives a length
    pub default_meeting_minutes: u32,
    pub snooze_seconds: u64,
    pub warning_thresholds: Vec<u64>,
    pub tick_interval: Duration,
    /// Spawn the 1 Hz tick source on start/resume. Off when a caller drives `tick()` itself.
    pub auto_tick: bool,
    pub alert_check_interval: Duration,
    pub autosave_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_meeting_minutes: 30,
            snooze_seconds: 300,
            warning_thresholds: DEFAULT_WARNING_THRESHOLDS.to_vec(),
            tick_interval: Duration::from_secs(1),
            auto_tick: true,
            alert_check_interval: Duration::from_secs(60),
            autosave_interval: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snooze_seconds(mut self, seconds: u64) -> Self {
        self.snooze_seconds = seconds;
        self
    }

    pub fn with_warning_thresholds(mut self, thresholds: Vec<u64>) -> Self {
        self.warning_thresholds = thresholds;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_auto_tick(mut self, enabled: bool) -> Self {
        self.auto_tick = enabled;
        self
    }

    pub fn with_alert_check_interval(mut self, interval: Duration) -> Self {
        self.alert_check_interval = interval;
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }
}
