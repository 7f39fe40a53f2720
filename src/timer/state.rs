use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Idle,
    Countdown,
    Running,
    Stopped,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    /// Authoritative elapsed time, finalized once at stop. While running,
    /// display values come from the anchor instead.
    pub elapsed_seconds: f64,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Idle,
            elapsed_seconds: 0.0,
            started_at: None,
            running_anchor: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new measurement may start only from idle or a finished stop.
    pub fn can_start(&self) -> bool {
        matches!(self.status, TimerStatus::Idle | TimerStatus::Stopped)
    }

    pub fn begin_countdown(&mut self) {
        self.status = TimerStatus::Countdown;
        self.elapsed_seconds = 0.0;
        self.started_at = None;
        self.running_anchor = None;
    }

    pub fn begin_running(&mut self, start_at: DateTime<Utc>, now: Instant) {
        self.status = TimerStatus::Running;
        self.elapsed_seconds = 0.0;
        self.started_at = Some(start_at);
        self.running_anchor = Some(now);
    }

    /// Display elapsed: live from the anchor while running, otherwise the
    /// finalized value.
    pub fn current_elapsed_seconds(&self) -> f64 {
        if let (TimerStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            anchor.elapsed().as_secs_f64()
        } else {
            self.elapsed_seconds
        }
    }

    /// Finalize the measurement. Returns the authoritative elapsed value.
    pub fn stop(&mut self, now: Instant) -> f64 {
        if let Some(anchor) = self.running_anchor.take() {
            self.elapsed_seconds = now.saturating_duration_since(anchor).as_secs_f64();
        }
        self.status = TimerStatus::Stopped;
        self.elapsed_seconds
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
