use serde::{Deserialize, Serialize};

/// Longest note the UI accepts; anything longer is clamped on write.
pub const MAX_NOTE_LEN: usize = 200;

/// Named multi-beer formats selectable from the session screen.
const CHALLENGES: &[(u32, &str)] = &[
    (2, "Spies"),
    (4, "Golden Triangle"),
    (6, "Kan"),
    (10, "Platinum Triangle"),
    (12, "1/2 Krat"),
    (24, "Krat"),
];

pub fn challenge_label(unit_count: u32) -> String {
    CHALLENGES
        .iter()
        .find(|(units, _)| *units == unit_count)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("{unit_count} biers"))
}

pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}")
}

/// One recorded unit of a session: a timed beer, a free-pour ("VDL"),
/// or a timed multi-beer challenge.
///
/// `elapsed_seconds` is present iff the entry is not free-pour.
/// `personal_best_rank` is fixed at creation time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub elapsed_seconds: Option<f64>,
    pub is_free_pour: bool,
    pub unit_count: u32,
    pub category_label: Option<String>,
    pub note: String,
    pub personal_best_rank: Option<u8>,
}

impl SessionEntry {
    pub fn timed(
        elapsed_seconds: f64,
        selection: &PendingSelection,
        personal_best_rank: Option<u8>,
    ) -> Self {
        Self {
            elapsed_seconds: Some(elapsed_seconds),
            is_free_pour: false,
            unit_count: selection.unit_count.max(1),
            category_label: selection.category_label.clone(),
            note: String::new(),
            personal_best_rank,
        }
    }

    pub fn free_pour() -> Self {
        Self {
            elapsed_seconds: None,
            is_free_pour: true,
            unit_count: 1,
            category_label: None,
            note: String::new(),
            personal_best_rank: None,
        }
    }

    /// Label shown next to the entry: challenge name, "VDL", or plain "Bier".
    pub fn display_label(&self) -> &str {
        if self.is_free_pour {
            "VDL"
        } else {
            self.category_label.as_deref().unwrap_or("Bier")
        }
    }
}

/// Wire form handed to the backend on submission. Field names match the
/// server's `session_beers` schema, ordering is fixed by declaration order
/// so a decode/encode round trip is byte-stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireEntry {
    pub time: Option<f64>,
    pub is_vdl: bool,
    pub beer_count: u32,
    pub label: Option<String>,
    pub note: String,
    /// Only present on ranked timed entries; free pours never carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pb_rank: Option<u8>,
}

impl From<&SessionEntry> for WireEntry {
    fn from(entry: &SessionEntry) -> Self {
        Self {
            time: entry.elapsed_seconds,
            is_vdl: entry.is_free_pour,
            beer_count: entry.unit_count,
            label: entry.category_label.clone(),
            note: entry.note.clone(),
            pb_rank: entry.personal_best_rank,
        }
    }
}

impl From<WireEntry> for SessionEntry {
    fn from(wire: WireEntry) -> Self {
        Self {
            elapsed_seconds: wire.time,
            is_free_pour: wire.is_vdl,
            unit_count: wire.beer_count.max(1),
            category_label: wire.label,
            note: wire.note,
            personal_best_rank: wire.pb_rank,
        }
    }
}

/// Category chosen before the timer runs; consumed exactly once when the
/// timer stops, then reset to a plain beer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingSelection {
    pub unit_count: u32,
    pub category_label: Option<String>,
}

impl Default for PendingSelection {
    fn default() -> Self {
        Self {
            unit_count: 1,
            category_label: None,
        }
    }
}

impl PendingSelection {
    pub fn challenge(unit_count: u32) -> Self {
        Self {
            unit_count,
            category_label: Some(challenge_label(unit_count)),
        }
    }

    /// Consume the selection, leaving the plain-beer default behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}
