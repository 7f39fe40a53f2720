use serde::Serialize;

use crate::session::{
    entry::format_seconds,
    SessionLedger,
};

/// One line item of the preview: label, badges, note, and the time text.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub label: String,
    pub personal_best_rank: Option<u8>,
    pub unit_count: u32,
    pub note: Option<String>,
    /// "8.200s" for timed entries, `None` for free-pour (rendered as a VDL
    /// badge instead).
    pub time_text: Option<String>,
    pub is_free_pour: bool,
    pub is_fastest: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewModel {
    pub entries: Vec<PreviewEntry>,
    pub total_units: u32,
    pub total_text: String,
    pub caption: Option<String>,
    pub photo_attached: bool,
    pub share_summary: String,
}

pub fn unit_total_text(total: u32) -> String {
    if total == 1 {
        "1 bier".to_string()
    } else {
        format!("{total} biers")
    }
}

/// Project the ledger plus the form selections into the read-only preview.
/// Pure: borrows everything immutably, identical output for identical input.
pub fn render_preview(
    ledger: &SessionLedger,
    caption: &str,
    photo_attached: bool,
    share_to_connections: bool,
    group_names: &[String],
) -> PreviewModel {
    let entries = ledger
        .entries()
        .iter()
        .map(|entry| PreviewEntry {
            label: entry.display_label().to_string(),
            personal_best_rank: entry.personal_best_rank,
            unit_count: entry.unit_count,
            note: (!entry.note.is_empty()).then(|| entry.note.clone()),
            time_text: entry
                .elapsed_seconds
                .map(|seconds| format!("{}s", format_seconds(seconds))),
            is_free_pour: entry.is_free_pour,
            is_fastest: ledger.is_fastest(entry),
        })
        .collect();

    let total_units = ledger.total_units();

    let caption = caption.trim();
    let caption = (!caption.is_empty()).then(|| caption.to_string());

    let mut shares: Vec<String> = Vec::new();
    if share_to_connections {
        shares.push("Your connections".to_string());
    }
    shares.extend(group_names.iter().cloned());
    let share_summary = if shares.is_empty() {
        "No one (private)".to_string()
    } else {
        shares.join(", ")
    };

    PreviewModel {
        entries,
        total_units,
        total_text: unit_total_text(total_units),
        caption,
        photo_attached,
        share_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entry::{PendingSelection, SessionEntry};

    fn sample_ledger() -> SessionLedger {
        let mut ledger = SessionLedger::new();
        ledger.append(SessionEntry::timed(8.2, &PendingSelection::default(), Some(1)));
        ledger.append(SessionEntry::free_pour());
        let mut kan = SessionEntry::timed(42.0, &PendingSelection::challenge(6), None);
        kan.note = "met @piet".to_string();
        ledger.append(kan);
        ledger
    }

    #[test]
    fn projects_line_items_and_footer() {
        let ledger = sample_ledger();
        let model = render_preview(&ledger, "", false, false, &[]);

        assert_eq!(model.entries.len(), 3);
        assert_eq!(model.total_units, 8);
        assert_eq!(model.total_text, "8 biers");

        let first = &model.entries[0];
        assert_eq!(first.label, "Bier");
        assert_eq!(first.time_text.as_deref(), Some("8.200s"));
        assert_eq!(first.personal_best_rank, Some(1));
        assert!(first.is_fastest);

        let vdl = &model.entries[1];
        assert!(vdl.is_free_pour);
        assert_eq!(vdl.time_text, None);
        assert_eq!(vdl.label, "VDL");

        let kan = &model.entries[2];
        assert_eq!(kan.label, "Kan");
        assert_eq!(kan.unit_count, 6);
        assert_eq!(kan.note.as_deref(), Some("met @piet"));
        assert!(!kan.is_fastest);
    }

    #[test]
    fn singular_footer_for_one_unit() {
        let mut ledger = SessionLedger::new();
        ledger.append(SessionEntry::free_pour());
        let model = render_preview(&ledger, "", false, false, &[]);
        assert_eq!(model.total_text, "1 bier");
    }

    #[test]
    fn blank_caption_is_dropped_and_shares_default_to_private() {
        let ledger = sample_ledger();
        let model = render_preview(&ledger, "   ", false, false, &[]);
        assert_eq!(model.caption, None);
        assert_eq!(model.share_summary, "No one (private)");

        let groups = vec!["Zaterdagclub".to_string()];
        let model = render_preview(&ledger, " proost! ", true, true, &groups);
        assert_eq!(model.caption.as_deref(), Some("proost!"));
        assert!(model.photo_attached);
        assert_eq!(model.share_summary, "Your connections, Zaterdagclub");
    }

    #[test]
    fn rendering_is_idempotent_and_leaves_the_ledger_alone() {
        let ledger = sample_ledger();
        let before = ledger.clone();
        let first = render_preview(&ledger, "x", true, false, &[]);
        let second = render_preview(&ledger, "x", true, false, &[]);
        assert_eq!(first, second);
        assert_eq!(ledger, before);
    }
}
