use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::{SessionEntry, WireEntry, MAX_NOTE_LEN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("entry index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// Ordered list of entries accumulated during one post-creation flow.
/// Owned exclusively by that flow and discarded with it; nothing here is
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLedger {
    entries: Vec<SessionEntry>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: SessionEntry) {
        self.entries.push(entry);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<SessionEntry, LedgerError> {
        if index >= self.entries.len() {
            return Err(LedgerError::IndexOutOfRange(index));
        }
        Ok(self.entries.remove(index))
    }

    /// Replace one entry's note in place. Does not touch ordering or the
    /// entry's personal-best rank. Notes longer than [`MAX_NOTE_LEN`]
    /// characters are clamped.
    pub fn set_note(&mut self, index: usize, note: &str) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange(index))?;
        entry.note = note.chars().take(MAX_NOTE_LEN).collect();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn total_units(&self) -> u32 {
        self.entries.iter().map(|entry| entry.unit_count).sum()
    }

    /// Minimum elapsed time among timed entries, if any.
    pub fn fastest_time(&self) -> Option<f64> {
        self.entries
            .iter()
            .filter_map(|entry| entry.elapsed_seconds)
            .fold(None, |fastest, time| match fastest {
                Some(best) if best <= time => Some(best),
                _ => Some(time),
            })
    }

    /// Fastest highlight uses an equality check against the minimum, so
    /// tied entries are all marked fastest.
    pub fn is_fastest(&self, entry: &SessionEntry) -> bool {
        match (entry.elapsed_seconds, self.fastest_time()) {
            (Some(time), Some(best)) => time == best,
            _ => false,
        }
    }

    /// Canonical wire representation for the submission endpoint.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        let wire: Vec<WireEntry> = self.entries.iter().map(WireEntry::from).collect();
        serde_json::to_string(&wire)
    }

    pub fn deserialize(json: &str) -> Result<Self, serde_json::Error> {
        let wire: Vec<WireEntry> = serde_json::from_str(json)?;
        Ok(Self {
            entries: wire.into_iter().map(SessionEntry::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entry::PendingSelection;

    fn timed(seconds: f64) -> SessionEntry {
        SessionEntry::timed(seconds, &PendingSelection::default(), None)
    }

    #[test]
    fn total_units_tracks_appends_and_removals() {
        let mut ledger = SessionLedger::new();
        ledger.append(timed(8.2));
        ledger.append(SessionEntry::timed(21.0, &PendingSelection::challenge(6), None));
        ledger.append(SessionEntry::free_pour());
        assert_eq!(ledger.total_units(), 8);

        ledger.remove_at(1).unwrap();
        assert_eq!(ledger.total_units(), 2);
        ledger.remove_at(0).unwrap();
        ledger.remove_at(0).unwrap();
        assert_eq!(ledger.total_units(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn remove_out_of_range_is_a_typed_error() {
        let mut ledger = SessionLedger::new();
        ledger.append(timed(5.0));
        assert_eq!(ledger.remove_at(3), Err(LedgerError::IndexOutOfRange(3)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn set_note_clamps_and_keeps_rank() {
        let mut ledger = SessionLedger::new();
        ledger.append(SessionEntry::timed(5.0, &PendingSelection::default(), Some(2)));

        let long = "a".repeat(MAX_NOTE_LEN + 50);
        ledger.set_note(0, &long).unwrap();
        assert_eq!(ledger.entries()[0].note.chars().count(), MAX_NOTE_LEN);
        assert_eq!(ledger.entries()[0].personal_best_rank, Some(2));

        assert_eq!(ledger.set_note(9, "x"), Err(LedgerError::IndexOutOfRange(9)));
    }

    #[test]
    fn fastest_marks_all_tied_entries() {
        let mut ledger = SessionLedger::new();
        ledger.append(timed(6.5));
        ledger.append(timed(6.5));
        ledger.append(timed(9.0));
        ledger.append(SessionEntry::free_pour());

        assert_eq!(ledger.fastest_time(), Some(6.5));
        let flags: Vec<bool> = ledger
            .entries()
            .iter()
            .map(|entry| ledger.is_fastest(entry))
            .collect();
        assert_eq!(flags, vec![true, true, false, false]);
    }

    #[test]
    fn serialize_round_trips_byte_identically() {
        let mut ledger = SessionLedger::new();
        ledger.append(SessionEntry::timed(8.2, &PendingSelection::default(), Some(1)));
        ledger.append(SessionEntry::timed(19.75, &PendingSelection::challenge(2), None));
        ledger.append(SessionEntry::free_pour());
        ledger.set_note(0, "with @jan").unwrap();
        ledger.remove_at(1).unwrap();

        let first = ledger.serialize().unwrap();
        let decoded = SessionLedger::deserialize(&first).unwrap();
        assert_eq!(decoded, ledger);
        assert_eq!(decoded.serialize().unwrap(), first);
    }
}
