mod api;
mod mentions;
mod preview;
mod screens;
mod session;
mod settings;
mod timer;
mod utils;

use std::sync::Arc;

use api::{
    models::{ConnectResponse, FeedPage, JoinResponse, LikeResponse, ReactionResponse, SearchResponse},
    ApiClient, FeedPager, PostSubmission, TypeaheadSearcher,
};
use mentions::MentionCandidate;
use preview::PreviewModel;
use screens::{Screen, ScreenController};
use serde::Serialize;
use session::{
    commands::{
        add_free_pour_entry, begin_session_flow, get_session_state, open_timed_entry,
        remove_session_entry, set_entry_note,
    },
    SessionController,
};
use settings::{SettingsStore, UserSettings};
use tauri::{Emitter, Manager, State, Wry};
use timer::{
    commands::{get_timer_state, reset_timer, start_timer, stop_timer},
    TimerController, TimerTuning,
};
use tokio::sync::Mutex;

pub(crate) struct AppState {
    pub(crate) session: SessionController<Wry>,
    pub(crate) timer: TimerController<Wry>,
    pub(crate) screens: ScreenController<Wry>,
    pub(crate) settings: SettingsStore,
    pub(crate) api: ApiClient,
    pub(crate) typeahead: TypeaheadSearcher,
    pub(crate) feed: Arc<Mutex<Option<FeedPager>>>,
}

// ── Screens & preview ──

#[tauri::command]
async fn get_active_screen(state: State<'_, AppState>) -> Result<Screen, String> {
    Ok(state.screens.active().await)
}

#[tauri::command]
async fn show_session_editor(state: State<'_, AppState>) -> Result<Screen, String> {
    Ok(state.screens.show_session_editor().await)
}

#[tauri::command]
async fn show_preview(state: State<'_, AppState>) -> Result<Screen, String> {
    let has_entries = !state.session.is_empty().await;
    state
        .screens
        .show_preview(has_entries)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn get_preview(
    state: State<'_, AppState>,
    caption: String,
    photo_attached: bool,
    share_to_connections: bool,
    group_names: Vec<String>,
) -> Result<PreviewModel, String> {
    Ok(state
        .session
        .with_ledger(|ledger| {
            preview::render_preview(
                ledger,
                &caption,
                photo_attached,
                share_to_connections,
                &group_names,
            )
        })
        .await)
}

// ── Submission ──

#[tauri::command]
async fn submit_session(
    state: State<'_, AppState>,
    caption: String,
    is_public: bool,
    groups: Vec<i64>,
) -> Result<(), String> {
    let submission = state
        .session
        .with_ledger(|ledger| PostSubmission::from_ledger(ledger, &caption, is_public, groups))
        .await
        .map_err(|e| e.to_string())?;
    state
        .api
        .submit_session(&submission)
        .await
        .map_err(|e| e.to_string())
}

// ── Backend API surface ──

#[tauri::command]
fn set_csrf_token(state: State<'_, AppState>, token: String) {
    state.api.set_csrf_token(token);
}

#[tauri::command]
async fn search_directory(
    state: State<'_, AppState>,
    query: Option<String>,
) -> Result<SearchResponse, String> {
    state
        .api
        .search(query.as_deref())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn typeahead_search(
    state: State<'_, AppState>,
    query: String,
) -> Result<Option<SearchResponse>, String> {
    state
        .typeahead
        .search(query)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn cancel_typeahead(state: State<'_, AppState>) {
    state.typeahead.cancel();
}

#[tauri::command]
async fn toggle_like(state: State<'_, AppState>, post_id: i64) -> Result<LikeResponse, String> {
    state
        .api
        .toggle_like(post_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn toggle_reaction(
    state: State<'_, AppState>,
    post_id: i64,
    emoji: String,
) -> Result<ReactionResponse, String> {
    state
        .api
        .toggle_reaction(post_id, &emoji)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn request_connection(
    state: State<'_, AppState>,
    username: String,
) -> Result<ConnectResponse, String> {
    state
        .api
        .request_connection(&username)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn request_group_join(
    state: State<'_, AppState>,
    group_id: i64,
) -> Result<JoinResponse, String> {
    state
        .api
        .request_group_join(group_id)
        .await
        .map_err(|e| e.to_string())
}

// ── Feed pagination ──

#[tauri::command]
async fn setup_feed(
    state: State<'_, AppState>,
    feed_path: String,
    page_param: String,
) -> Result<(), String> {
    let pager = FeedPager::new(state.api.clone(), feed_path, page_param);
    *state.feed.lock().await = Some(pager);
    Ok(())
}

#[tauri::command]
async fn load_feed_page(state: State<'_, AppState>) -> Result<Option<FeedPage>, String> {
    let mut guard = state.feed.lock().await;
    match guard.as_mut() {
        Some(pager) => pager.next_page().await.map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

// ── Mentions ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MentionSuggestions {
    start: usize,
    query: String,
    candidates: Vec<MentionCandidate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextEdit {
    text: String,
    cursor: usize,
}

/// Look up completion candidates for the token under the cursor. Returns
/// `None` when there is no active token, when the debounced search was
/// superseded, or when nothing matches.
#[tauri::command]
async fn mention_lookup(
    state: State<'_, AppState>,
    text: String,
    cursor: usize,
) -> Result<Option<MentionSuggestions>, String> {
    let Some(span) = mentions::mention_query(&text, cursor) else {
        state.typeahead.cancel();
        return Ok(None);
    };

    let response = state
        .typeahead
        .search(span.query.clone())
        .await
        .map_err(|e| e.to_string())?;

    Ok(response.and_then(|response| {
        let candidates = mentions::candidates(&response);
        (!candidates.is_empty()).then_some(MentionSuggestions {
            start: span.start,
            query: span.query,
            candidates,
        })
    }))
}

/// Splice the chosen candidate over the active token. Echoes the input back
/// unchanged when the token has disappeared in the meantime.
#[tauri::command]
fn insert_mention(text: String, cursor: usize, value: String) -> TextEdit {
    match mentions::mention_query(&text, cursor) {
        Some(span) => {
            let (text, cursor) = mentions::apply_mention(&text, &span, cursor, &value);
            TextEdit { text, cursor }
        }
        None => TextEdit { text, cursor },
    }
}

// ── Settings ──

#[tauri::command]
fn get_user_settings(state: State<'_, AppState>) -> Result<UserSettings, String> {
    Ok(state.settings.settings())
}

/// Persist and broadcast the new settings. The display-hold and debounce
/// durations are read once at startup, so those two take effect on the
/// next launch; the countdown toggle applies to the very next start.
#[tauri::command]
fn set_user_settings(
    settings: UserSettings,
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update(settings.clone())
        .map_err(|e| e.to_string())?;

    app_handle
        .emit("settings-updated", &settings)
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Proost starting up...");

    tauri::Builder::default()
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;

                let api_client = ApiClient::new(settings_store.server_url());
                let typeahead =
                    TypeaheadSearcher::with_debounce(api_client.clone(), settings_store.debounce());

                let tuning = TimerTuning {
                    display_hold: settings_store.display_hold(),
                    ..TimerTuning::default()
                };
                let session_controller = SessionController::new(app.handle().clone());
                let screen_controller = ScreenController::new(app.handle().clone());
                let timer_controller = TimerController::with_tuning(
                    app.handle().clone(),
                    session_controller.clone(),
                    screen_controller.clone(),
                    tuning,
                );

                app.manage(AppState {
                    session: session_controller,
                    timer: timer_controller,
                    screens: screen_controller,
                    settings: settings_store,
                    api: api_client,
                    typeahead,
                    feed: Arc::new(Mutex::new(None)),
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            // session builder
            begin_session_flow,
            get_session_state,
            open_timed_entry,
            add_free_pour_entry,
            remove_session_entry,
            set_entry_note,
            // timer
            get_timer_state,
            start_timer,
            stop_timer,
            reset_timer,
            // screens & preview
            get_active_screen,
            show_session_editor,
            show_preview,
            get_preview,
            submit_session,
            // backend api
            set_csrf_token,
            search_directory,
            typeahead_search,
            cancel_typeahead,
            toggle_like,
            toggle_reaction,
            request_connection,
            request_group_join,
            setup_feed,
            load_feed_page,
            // mentions
            mention_lookup,
            insert_mention,
            // settings
            get_user_settings,
            set_user_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
