//! Editing session: the boundary a rendering surface talks to.
//!
//! A session owns the current [`Snapshot`] and its undo history. The surface
//! forwards input events; the session either handles them (and the surface
//! re-renders from [`EditorSession::snapshot`]) or reports them as not handled,
//! in which case the surface performs its default insertion, usually by
//! calling [`EditorSession::insert_text`].
//!
//! Storage is never owned here. The host passes a [`PersistenceAdapter`] to
//! [`EditorSession::restore`] at startup and to [`EditorSession::save`] on
//! demand.

use crate::editing::commands::Draft;
use crate::editing::{ChangeKind, Cmd, Document, InlineStyle, Selection, Snapshot};
use crate::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::persistence::{self, PersistenceAdapter, PersistenceError};
use crate::transitions::{apply_split, apply_trigger};
use crate::triggers::detect_in;

/// Whether the engine consumed an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// The session produced a new snapshot; re-render
    Handled,
    /// Fall through to default text insertion
    NotHandled,
}

/// Single-document editing session
#[derive(Debug, Clone)]
pub struct EditorSession {
    current: Snapshot,
    history: History,
    saved: Document,
}

impl EditorSession {
    /// Session over a fresh, empty document
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(document: Document) -> Self {
        let current = Snapshot::new(document);
        let saved = current.document().clone();
        Self {
            current,
            history: History::new(DEFAULT_HISTORY_LIMIT),
            saved,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = History::new(limit);
        self
    }

    /// Load the stored document, or start empty when nothing is stored
    pub fn restore(adapter: &dyn PersistenceAdapter) -> Result<Self, PersistenceError> {
        let document = match adapter.load()? {
            Some(form) => persistence::deserialize(form)?,
            None => {
                log::info!("No stored document, starting empty");
                Document::new()
            }
        };
        log::info!("Restored document with {} blocks", document.len());
        Ok(Self::with_document(document))
    }

    /// Store the current document. The in-memory state is unaffected by a
    /// failure.
    pub fn save(&mut self, adapter: &mut dyn PersistenceAdapter) -> Result<(), PersistenceError> {
        let form = persistence::serialize(self.current.document());
        if let Err(err) = adapter.save(&form) {
            log::warn!("Failed to save document: {err}");
            return Err(err);
        }
        self.saved = self.current.document().clone();
        log::info!("Saved document with {} blocks", form.blocks.len());
        Ok(())
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    pub fn document(&self) -> &Document {
        self.current.document()
    }

    pub fn selection(&self) -> Selection {
        self.current.selection()
    }

    /// Whether the document differs from the last saved or restored one
    pub fn is_dirty(&self) -> bool {
        &self.saved != self.current.document()
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_depth() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_depth() > 0
    }

    /// Text is about to be inserted at the selection.
    ///
    /// Returns [`HandleResult::Handled`] only when the text completes a
    /// trigger and the resulting transition changed something.
    pub fn on_before_insert_text(&mut self, chars: &str) -> HandleResult {
        let Some(kind) = detect_in(&self.current, chars) else {
            return HandleResult::NotHandled;
        };
        match apply_trigger(&self.current, kind, kind.consumed_len()) {
            Some(next) => {
                self.commit(next);
                HandleResult::Handled
            }
            None => HandleResult::NotHandled,
        }
    }

    /// Enter was pressed
    pub fn on_request_line_break(&mut self) -> HandleResult {
        let next = apply_split(&self.current);
        self.commit(next);
        HandleResult::Handled
    }

    /// The surface moved the selection.
    ///
    /// Out-of-range offsets are clamped; a selection in an unknown block is
    /// ignored.
    pub fn on_selection_change(&mut self, selection: Selection) {
        if selection == self.current.selection() {
            return;
        }
        let document = self.current.document();
        let selection = match selection.validate(document) {
            Ok(()) => selection,
            Err(err) => {
                log::warn!("Recovering from invalid selection: {err}");
                match selection.clamp_to(document) {
                    Some(clamped) => clamped,
                    None => return,
                }
            }
        };

        let mut draft = Draft::from_snapshot(&self.current);
        draft.selection = selection;
        draft.style_override = None;
        self.current = self.current.derive(draft, ChangeKind::None);
    }

    /// The surface produced a snapshot of its own and wants it shown
    pub fn on_change_request(&mut self, snapshot: Snapshot) {
        self.commit(snapshot);
    }

    /// Default insertion for text the engine did not handle
    pub fn insert_text(&mut self, text: &str) {
        let next = self.current.apply(&Cmd::InsertText(text.to_string()));
        self.commit(next);
    }

    /// Feed keystrokes through the full pipeline: triggers first, then plain
    /// insertion; `\n` requests a line break
    pub fn type_text(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            if ch == '\n' {
                self.on_request_line_break();
                continue;
            }
            let chars = ch.encode_utf8(&mut buf);
            if self.on_before_insert_text(chars) == HandleResult::NotHandled {
                self.insert_text(chars);
            }
        }
    }

    pub fn delete_backward(&mut self) {
        let next = self.current.apply(&Cmd::DeleteBackward);
        self.commit(next);
    }

    pub fn toggle_style(&mut self, style: InlineStyle) {
        let next = self.current.apply(&Cmd::ToggleStyle(style));
        self.commit(next);
    }

    pub fn move_left(&mut self) {
        let sel = self.current.selection();
        let index = self.current.active_index();
        let target = if !sel.is_collapsed() {
            Selection::caret(sel.block_id, sel.start())
        } else if sel.focus_offset > 0 {
            Selection::caret(sel.block_id, sel.focus_offset - 1)
        } else if index > 0 {
            let previous = &self.document().blocks()[index - 1];
            Selection::caret(previous.id(), previous.len())
        } else {
            return;
        };
        self.on_selection_change(target);
    }

    pub fn move_right(&mut self) {
        let sel = self.current.selection();
        let index = self.current.active_index();
        let len = self.current.active_block().len();
        let target = if !sel.is_collapsed() {
            Selection::caret(sel.block_id, sel.end())
        } else if sel.focus_offset < len {
            Selection::caret(sel.block_id, sel.focus_offset + 1)
        } else if let Some(next) = self.document().blocks().get(index + 1) {
            Selection::caret(next.id(), 0)
        } else {
            return;
        };
        self.on_selection_change(target);
    }

    pub fn move_up(&mut self) {
        let index = self.current.active_index();
        if index == 0 {
            return;
        }
        let block = &self.document().blocks()[index - 1];
        let target = Selection::caret(block.id(), self.selection().focus_offset.min(block.len()));
        self.on_selection_change(target);
    }

    pub fn move_down(&mut self) {
        let index = self.current.active_index();
        let Some(block) = self.document().blocks().get(index + 1) else {
            return;
        };
        let target = Selection::caret(block.id(), self.selection().focus_offset.min(block.len()));
        self.on_selection_change(target);
    }

    pub fn move_to_line_start(&mut self) {
        let id = self.current.active_block().id();
        self.on_selection_change(Selection::caret(id, 0));
    }

    pub fn move_to_line_end(&mut self) {
        let block = self.current.active_block();
        let target = Selection::caret(block.id(), block.len());
        self.on_selection_change(target);
    }

    /// Step back one edit; returns false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        let version = self.current.version() + 1;
        match self.history.undo(self.current.clone()) {
            Some(previous) => {
                self.current = previous.relabel(ChangeKind::Undo, version);
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone edit; returns false when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        let version = self.current.version() + 1;
        match self.history.redo(self.current.clone()) {
            Some(next) => {
                self.current = next.relabel(ChangeKind::Redo, version);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, next: Snapshot) {
        if next.same_state(&self.current) {
            return;
        }
        let previous = std::mem::replace(&mut self.current, next);
        self.history.record(previous);
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
