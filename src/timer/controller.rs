use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::{screens::ScreenController, session::SessionController};

use super::{TimerState, TimerStatus};

const ENABLE_LOGS: bool = true;
use crate::log_info;

/// Countdown script shown before a measurement starts.
const COUNTDOWN_STEPS: [&str; 3] = ["3", "2", "1"];
const GO_STEP: &str = "GO";

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_seconds: f64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct TimerStateChangedEvent {
    state: TimerState,
    elapsed_seconds: f64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CountdownStepEvent {
    step: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct TimerHeartbeatEvent {
    elapsed_seconds: f64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct EntryRecordedEvent {
    entry: crate::session::entry::SessionEntry,
    total_units: u32,
}

/// Timing knobs. Production values match the original interaction;
/// tests run them at zero so nothing sleeps.
#[derive(Debug, Clone, Copy)]
pub struct TimerTuning {
    pub countdown_step: Duration,
    pub go_hold: Duration,
    pub display_hold: Duration,
    pub tick_interval: Duration,
}

impl Default for TimerTuning {
    fn default() -> Self {
        Self {
            countdown_step: Duration::from_millis(800),
            go_hold: Duration::from_millis(500),
            display_hold: Duration::from_millis(500),
            tick_interval: Duration::from_millis(100),
        }
    }
}

pub struct TimerController<R: Runtime> {
    state: Arc<Mutex<TimerState>>,
    session: SessionController<R>,
    screens: ScreenController<R>,
    app_handle: AppHandle<R>,
    countdown_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tuning: TimerTuning,
}

impl<R: Runtime> Clone for TimerController<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            session: self.session.clone(),
            screens: self.screens.clone(),
            app_handle: self.app_handle.clone(),
            countdown_task: self.countdown_task.clone(),
            ticker: self.ticker.clone(),
            tuning: self.tuning,
        }
    }
}

impl<R: Runtime> TimerController<R> {
    pub fn with_tuning(
        app_handle: AppHandle<R>,
        session: SessionController<R>,
        screens: ScreenController<R>,
        tuning: TimerTuning,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            session,
            screens,
            app_handle,
            countdown_task: Arc::new(Mutex::new(None)),
            ticker: Arc::new(Mutex::new(None)),
            tuning,
        }
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        let guard = self.state.lock().await;
        TimerSnapshot {
            elapsed_seconds: guard.current_elapsed_seconds(),
            state: guard.clone(),
        }
    }

    /// Start a measurement, optionally via the 3-2-1-GO pre-roll. Taps
    /// during countdown or while running are ignored.
    pub async fn request_start(&self, countdown_enabled: bool) -> Result<TimerSnapshot> {
        {
            let mut state = self.state.lock().await;
            if !state.can_start() {
                return Ok(TimerSnapshot {
                    elapsed_seconds: state.current_elapsed_seconds(),
                    state: state.clone(),
                });
            }
            if countdown_enabled {
                state.begin_countdown();
            } else {
                state.begin_running(Utc::now(), Instant::now());
            }
        }

        if countdown_enabled {
            self.spawn_countdown().await;
        } else {
            self.spawn_ticker().await;
        }

        self.emit_state_changed().await;
        Ok(self.get_snapshot().await)
    }

    /// Finalize the measurement. Only meaningful while running; a second
    /// stop is a no-op and just returns the current snapshot.
    pub async fn stop(&self) -> Result<TimerSnapshot> {
        let elapsed = {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Running {
                return Ok(TimerSnapshot {
                    elapsed_seconds: state.current_elapsed_seconds(),
                    state: state.clone(),
                });
            }
            state.stop(Instant::now())
        };

        self.cancel_ticker().await;
        self.emit_state_changed().await;
        log_info!("timer stopped at {:.3}s", elapsed);

        // Hold the final time on screen briefly, then append the entry and
        // return to the session editor. Pure user feedback, not correctness.
        let controller = self.clone();
        tokio::spawn(async move {
            time::sleep(controller.tuning.display_hold).await;
            controller.finalize_entry(elapsed).await;
        });

        Ok(self.get_snapshot().await)
    }

    /// Valid from any state: back to idle, elapsed zeroed, pending
    /// countdown and display loops cancelled.
    pub async fn reset(&self) -> Result<TimerSnapshot> {
        self.cancel_countdown().await;
        self.cancel_ticker().await;
        self.state.lock().await.reset();
        self.emit_state_changed().await;
        Ok(self.get_snapshot().await)
    }

    async fn finalize_entry(&self, elapsed: f64) {
        let entry = self.session.record_timed(elapsed).await;
        let total_units = self.session.total_units().await;
        let _ = self.app_handle.emit(
            "entry-recorded",
            EntryRecordedEvent { entry, total_units },
        );
        self.screens.show_session_editor().await;
    }

    async fn spawn_countdown(&self) {
        let mut guard = self.countdown_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let controller = self.clone();
        *guard = Some(tokio::spawn(async move {
            for step in COUNTDOWN_STEPS {
                controller.emit_countdown_step(step);
                time::sleep(controller.tuning.countdown_step).await;
            }
            controller.emit_countdown_step(GO_STEP);
            time::sleep(controller.tuning.go_hold).await;

            {
                let mut state = controller.state.lock().await;
                // A reset may have intervened while we slept.
                if state.status != TimerStatus::Countdown {
                    return;
                }
                state.begin_running(Utc::now(), Instant::now());
            }

            controller.spawn_ticker().await;
            controller.emit_state_changed().await;
        }));
    }

    async fn spawn_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let app_handle = self.app_handle.clone();
        let tick_interval = self.tuning.tick_interval;

        *guard = Some(tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;
                let elapsed_seconds = {
                    let guard = state.lock().await;
                    if guard.status != TimerStatus::Running {
                        break;
                    }
                    guard.current_elapsed_seconds()
                };
                let _ = app_handle.emit("timer-heartbeat", TimerHeartbeatEvent { elapsed_seconds });
            }
        }));
    }

    async fn cancel_countdown(&self) {
        if let Some(handle) = self.countdown_task.lock().await.take() {
            handle.abort();
        }
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn emit_countdown_step(&self, step: &str) {
        let _ = self.app_handle.emit(
            "countdown-step",
            CountdownStepEvent {
                step: step.to_string(),
            },
        );
    }

    async fn emit_state_changed(&self) {
        let guard = self.state.lock().await;
        let payload = TimerStateChangedEvent {
            elapsed_seconds: guard.current_elapsed_seconds(),
            state: guard.clone(),
        };
        drop(guard);
        let _ = self.app_handle.emit("timer-state-changed", payload);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use tauri::{
        test::{mock_app, MockRuntime},
        Listener,
    };

    use super::*;
    use crate::screens::Screen;

    fn zero_delay_controllers(
        handle: &AppHandle<MockRuntime>,
    ) -> (
        TimerController<MockRuntime>,
        SessionController<MockRuntime>,
        ScreenController<MockRuntime>,
    ) {
        let session = SessionController::new(handle.clone());
        let screens = ScreenController::new(handle.clone());
        let tuning = TimerTuning {
            countdown_step: Duration::ZERO,
            go_hold: Duration::ZERO,
            display_hold: Duration::ZERO,
            tick_interval: Duration::from_millis(100),
        };
        let timer = TimerController::with_tuning(
            handle.clone(),
            session.clone(),
            screens.clone(),
            tuning,
        );
        (timer, session, screens)
    }

    /// Let the zero-delay background tasks run to completion under the
    /// paused clock.
    async fn drain() {
        time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_runs_three_steps_and_go_before_running() {
        let app = mock_app();
        let handle = app.handle().clone();
        let steps = Arc::new(StdMutex::new(Vec::new()));
        {
            let steps = steps.clone();
            handle.listen("countdown-step", move |event| {
                steps.lock().unwrap().push(event.payload().to_string());
            });
        }

        let (timer, _session, _screens) = zero_delay_controllers(&handle);
        let snapshot = timer.request_start(true).await.unwrap();
        assert_eq!(snapshot.state.status, TimerStatus::Countdown);

        drain().await;
        assert_eq!(timer.get_snapshot().await.state.status, TimerStatus::Running);

        let expected: Vec<String> = ["3", "2", "1", "GO"]
            .iter()
            .map(|step| format!(r#"{{"step":"{step}"}}"#))
            .collect();
        assert_eq!(*steps.lock().unwrap(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn start_without_countdown_is_immediately_running() {
        let app = mock_app();
        let handle = app.handle().clone();
        let (timer, _session, _screens) = zero_delay_controllers(&handle);

        let snapshot = timer.request_start(false).await.unwrap();
        assert_eq!(snapshot.state.status, TimerStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn tap_during_countdown_is_ignored() {
        let app = mock_app();
        let handle = app.handle().clone();
        let (timer, _session, _screens) = zero_delay_controllers(&handle);

        timer.request_start(true).await.unwrap();
        let repeat = timer.request_start(true).await.unwrap();
        assert_eq!(repeat.state.status, TimerStatus::Countdown);
    }

    #[tokio::test(start_paused = true)]
    async fn second_stop_is_a_no_op_and_records_one_entry() {
        let app = mock_app();
        let handle = app.handle().clone();
        let (timer, session, screens) = zero_delay_controllers(&handle);
        screens.show_timer().await;

        timer.request_start(false).await.unwrap();
        let first = timer.stop().await.unwrap();
        assert_eq!(first.state.status, TimerStatus::Stopped);

        let second = timer.stop().await.unwrap();
        assert_eq!(second.state.status, TimerStatus::Stopped);
        assert_eq!(second.state.elapsed_seconds, first.state.elapsed_seconds);

        drain().await;
        assert_eq!(session.snapshot().await.entries.len(), 1);
        assert_eq!(screens.active().await, Screen::SessionEditor);
    }
}
