use std::collections::HashMap;

use tauri::State;

use crate::{
    session::{entry::PendingSelection, SessionSnapshot},
    AppState,
};

#[tauri::command]
pub async fn begin_session_flow(
    state: State<'_, AppState>,
    top_times: HashMap<String, Vec<f64>>,
) -> Result<SessionSnapshot, String> {
    Ok(state.session.begin_flow(top_times).await)
}

#[tauri::command]
pub async fn get_session_state(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.session.snapshot().await)
}

/// Category selection: stash the pending selection, reset the timer, and
/// switch to the timer screen. `unit_count` 1 is a plain beer; anything
/// larger is a named challenge.
#[tauri::command]
pub async fn open_timed_entry(
    state: State<'_, AppState>,
    unit_count: u32,
) -> Result<(), String> {
    let selection = if unit_count > 1 {
        PendingSelection::challenge(unit_count)
    } else {
        PendingSelection::default()
    };
    state.session.set_pending(selection).await;
    state.timer.reset().await.map_err(|e| e.to_string())?;
    state.screens.show_timer().await;
    Ok(())
}

#[tauri::command]
pub async fn add_free_pour_entry(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    state.session.add_free_pour().await;
    Ok(state.session.snapshot().await)
}

#[tauri::command]
pub async fn remove_session_entry(
    state: State<'_, AppState>,
    index: usize,
) -> Result<SessionSnapshot, String> {
    state
        .session
        .remove_entry(index)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_entry_note(
    state: State<'_, AppState>,
    index: usize,
    note: String,
) -> Result<SessionSnapshot, String> {
    state
        .session
        .set_note(index, &note)
        .await
        .map_err(|e| e.to_string())
}
