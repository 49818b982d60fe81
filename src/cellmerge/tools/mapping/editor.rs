use std::collections::VecDeque;

use crate::cellmerge::tools::model::{HeaderEntry, HeaderMapping};

/// Maximum number of snapshots kept for undo.
pub const HISTORY_LIMIT: usize = 50;

/// In-memory editing session over a [`HeaderMapping`].
///
/// Every mutation first records a full snapshot of the entries, so `undo`
/// restores an exact previous state. Once [`HISTORY_LIMIT`] snapshots are
/// held, the oldest is discarded.
#[derive(Debug, Clone)]
pub struct MappingEditor {
    mapping: HeaderMapping,
    history: VecDeque<Vec<HeaderEntry>>,
}

impl MappingEditor {
    pub fn new(mapping: HeaderMapping) -> Self {
        Self {
            mapping,
            history: VecDeque::new(),
        }
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn into_mapping(self) -> HeaderMapping {
        self.mapping
    }

    /// Number of undo steps currently available.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn push_entry(&mut self, entry: HeaderEntry) {
        self.snapshot();
        self.mapping.headers.push(entry);
    }

    /// Removes the last entry. Nothing is recorded when the mapping is empty.
    pub fn remove_last(&mut self) -> Option<HeaderEntry> {
        if self.mapping.is_empty() {
            return None;
        }
        self.snapshot();
        self.mapping.headers.pop()
    }

    /// Replaces the entry at `index`. Returns `false` when out of bounds.
    pub fn set_entry(&mut self, index: usize, entry: HeaderEntry) -> bool {
        if index >= self.mapping.len() {
            return false;
        }
        self.snapshot();
        self.mapping.headers[index] = entry;
        true
    }

    /// Restores the state preceding the latest mutation.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(headers) => {
                self.mapping.headers = headers;
                true
            }
            None => false,
        }
    }

    fn snapshot(&mut self) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(self.mapping.headers.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, cell: &str) -> HeaderEntry {
        HeaderEntry::new(name, cell)
    }

    #[test]
    fn undo_restores_previous_states_in_reverse_order() {
        let mut editor = MappingEditor::new(HeaderMapping::from_entries(vec![entry("A", "A1")]));
        editor.push_entry(entry("B", "B1"));
        assert!(editor.set_entry(0, entry("Region", "C2")));
        assert_eq!(editor.remove_last(), Some(entry("B", "B1")));

        assert!(editor.undo());
        assert_eq!(
            editor.mapping().headers,
            vec![entry("Region", "C2"), entry("B", "B1")]
        );
        assert!(editor.undo());
        assert_eq!(editor.mapping().headers, vec![entry("A", "A1"), entry("B", "B1")]);
        assert!(editor.undo());
        assert_eq!(editor.mapping().headers, vec![entry("A", "A1")]);
        assert!(!editor.undo());
    }

    #[test]
    fn noop_edits_do_not_record_history() {
        let mut editor = MappingEditor::new(HeaderMapping::new());
        assert_eq!(editor.remove_last(), None);
        assert!(!editor.set_entry(3, entry("X", "A1")));
        assert_eq!(editor.history_len(), 0);
    }

    #[test]
    fn history_is_capped() {
        let mut editor = MappingEditor::new(HeaderMapping::new());
        for idx in 0..(HISTORY_LIMIT + 10) {
            editor.push_entry(entry(&format!("col{idx}"), "A1"));
        }
        assert_eq!(editor.history_len(), HISTORY_LIMIT);

        while editor.undo() {}
        // The ten oldest snapshots were dropped.
        assert_eq!(editor.mapping().len(), 10);
    }
}
