use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter, Runtime};
use thiserror::Error;
use tokio::sync::Mutex;

/// The four screens of the post-creation flow. Exactly one is visible at
/// a time; `PostSection` is the legacy composition root kept for the old
/// single-beer form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Timer,
    SessionEditor,
    Preview,
    PostSection,
}

impl Default for Screen {
    fn default() -> Self {
        Screen::SessionEditor
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("Add at least one bier to your session first.")]
    EmptyLedger,
}

/// Pure transition rules, kept separate from the event-emitting controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenState {
    active: Screen,
}

impl ScreenState {
    pub fn active(&self) -> Screen {
        self.active
    }

    pub fn show_timer(&mut self) -> Screen {
        self.active = Screen::Timer;
        self.active
    }

    pub fn show_session_editor(&mut self) -> Screen {
        self.active = Screen::SessionEditor;
        self.active
    }

    /// The preview is only reachable with at least one entry in the ledger.
    pub fn show_preview(&mut self, has_entries: bool) -> Result<Screen, ScreenError> {
        if !has_entries {
            return Err(ScreenError::EmptyLedger);
        }
        self.active = Screen::Preview;
        Ok(self.active)
    }
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ScreenChangedEvent {
    screen: Screen,
    scroll_to_top: bool,
}

pub struct ScreenController<R: Runtime> {
    state: Arc<Mutex<ScreenState>>,
    app_handle: AppHandle<R>,
}

impl<R: Runtime> Clone for ScreenController<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            app_handle: self.app_handle.clone(),
        }
    }
}

impl<R: Runtime> ScreenController<R> {
    pub fn new(app_handle: AppHandle<R>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState::default())),
            app_handle,
        }
    }

    pub async fn active(&self) -> Screen {
        self.state.lock().await.active()
    }

    pub async fn show_timer(&self) -> Screen {
        let screen = self.state.lock().await.show_timer();
        self.emit_changed(screen);
        screen
    }

    pub async fn show_session_editor(&self) -> Screen {
        let screen = self.state.lock().await.show_session_editor();
        self.emit_changed(screen);
        screen
    }

    pub async fn show_preview(&self, has_entries: bool) -> Result<Screen, ScreenError> {
        let screen = self.state.lock().await.show_preview(has_entries)?;
        self.emit_changed(screen);
        Ok(screen)
    }

    fn emit_changed(&self, screen: Screen) {
        // Every transition scrolls the viewport back to the top.
        let _ = self.app_handle.emit(
            "screen-changed",
            ScreenChangedEvent {
                screen,
                scroll_to_top: true,
            },
        );
    }
}
