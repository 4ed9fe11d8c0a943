use std::collections::VecDeque;

use crate::editing::Snapshot;

/// Default number of undo steps kept by a session
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Bounded undo/redo stacks of snapshots.
///
/// Recording a new state discards anything that could have been redone.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Remember `previous` as the state before a new edit
    pub fn record(&mut self, previous: Snapshot) {
        self.redo.clear();
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
    }

    /// Step back from `current`, returning the state to restore
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward from `current`, returning the state to restore
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Cmd, Document};

    fn typed(base: &Snapshot, text: &str) -> Snapshot {
        base.apply(&Cmd::InsertText(text.to_string()))
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::default();
        let first = Snapshot::new(Document::new());
        let second = typed(&first, "a");

        history.record(first.clone());
        let restored = history.undo(second.clone()).unwrap();
        assert!(restored.same_state(&first));
        assert_eq!(history.redo_depth(), 1);

        let again = history.redo(restored).unwrap();
        assert!(again.same_state(&second));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::default();
        let first = Snapshot::new(Document::new());
        history.record(first.clone());
        history.undo(typed(&first, "a"));
        assert_eq!(history.redo_depth(), 1);

        history.record(first);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(2);
        let mut current = Snapshot::new(Document::new());
        for ch in ["a", "b", "c"] {
            let next = typed(&current, ch);
            history.record(std::mem::replace(&mut current, next));
        }
        assert_eq!(history.undo_depth(), 2);

        let back = history.undo(current.clone()).unwrap();
        assert_eq!(back.document().plain_text(), "ab");
        let back = history.undo(back).unwrap();
        assert_eq!(back.document().plain_text(), "a");
        assert!(history.undo(back).is_none());
    }

    #[test]
    fn test_empty_history_has_nothing_to_undo() {
        let mut history = History::default();
        assert!(history.undo(Snapshot::default()).is_none());
        assert!(history.redo(Snapshot::default()).is_none());
    }
}
