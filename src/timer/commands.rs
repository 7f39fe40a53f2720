use tauri::State;

use crate::{
    timer::{TimerController, TimerSnapshot},
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> TimerController<tauri::Wry> {
    state.timer.clone()
}

#[tauri::command]
pub async fn get_timer_state(state: State<'_, AppState>) -> Result<TimerSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.get_snapshot().await)
}

#[tauri::command]
pub async fn start_timer(state: State<'_, AppState>) -> Result<TimerSnapshot, String> {
    let countdown_enabled = state.settings.timer().countdown_enabled;
    let controller = controller_from_state(&state);
    controller
        .request_start(countdown_enabled)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn stop_timer(state: State<'_, AppState>) -> Result<TimerSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.stop().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn reset_timer(state: State<'_, AppState>) -> Result<TimerSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.reset().await.map_err(|e| e.to_string())
}
