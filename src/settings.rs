use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerPreferences {
    /// Run the 3-2-1-GO pre-roll before the stopwatch starts.
    pub countdown_enabled: bool,
}

impl Default for TimerPreferences {
    fn default() -> Self {
        Self {
            countdown_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub timer: TimerPreferences,
    pub server_url: String,
    /// How long the final time stays on screen before the entry lands in
    /// the editor, in milliseconds.
    #[serde(default = "default_display_hold_ms")]
    pub display_hold_ms: u64,
    /// Debounce window for typeahead and mention lookups, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_display_hold_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            timer: TimerPreferences::default(),
            server_url: "http://localhost:5000".into(),
            display_hold_ms: default_display_hold_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> UserSettings {
        self.data.read().unwrap().clone()
    }

    pub fn timer(&self) -> TimerPreferences {
        self.data.read().unwrap().timer.clone()
    }

    pub fn server_url(&self) -> String {
        self.data.read().unwrap().server_url.clone()
    }

    pub fn display_hold(&self) -> Duration {
        Duration::from_millis(self.data.read().unwrap().display_hold_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.data.read().unwrap().debounce_ms)
    }

    pub fn update(&self, settings: UserSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

impl SettingsStore {
    #[allow(dead_code)]
    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("proost-settings-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(scratch_path()).unwrap();
        let settings = store.settings();
        assert!(!settings.timer.countdown_enabled);
        assert_eq!(settings.display_hold_ms, 500);
        assert_eq!(settings.debounce_ms, 200);
        assert_eq!(store.display_hold(), Duration::from_millis(500));
        assert_eq!(store.debounce(), Duration::from_millis(200));
    }

    #[test]
    fn updated_settings_survive_a_reopen() {
        let path = scratch_path();
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.settings();
        settings.timer.countdown_enabled = true;
        settings.display_hold_ms = 750;
        settings.debounce_ms = 150;
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.settings(), settings);
        assert_eq!(reopened.debounce(), Duration::from_millis(150));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn settings_written_before_the_durations_existed_still_parse() {
        let path = scratch_path();
        fs::write(
            &path,
            r#"{"timer":{"countdownEnabled":true},"serverUrl":"http://localhost:5000"}"#,
        )
        .unwrap();

        let store = SettingsStore::new(path.clone()).unwrap();
        let settings = store.settings();
        assert!(settings.timer.countdown_enabled);
        assert_eq!(settings.display_hold_ms, 500);
        assert_eq!(settings.debounce_ms, 200);

        let _ = fs::remove_file(path);
    }
}
