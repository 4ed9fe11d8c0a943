//! Edit primitives.
//!
//! Each [`Cmd`] runs against a [`Draft`], a private working copy of a
//! snapshot. Several commands can run against the same draft before it is
//! turned into a single new [`Snapshot`](crate::editing::Snapshot), which is
//! how multi-step transitions stay atomic.

use crate::editing::{
    Block, BlockType, ChangeKind, Document, InlineStyle, Selection, Snapshot, StyleSet,
};

/// A single edit against the active block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Split the active block at the caret; a range selection is removed first
    SplitBlock,
    /// Remove the characters `start..end` of the active block
    RemoveRange { start: usize, end: usize },
    /// Change the active block's type
    SetBlockType(BlockType),
    /// Toggle a style over the selected range, or for upcoming typing at a caret
    ToggleStyle(InlineStyle),
    /// Insert text at the caret, replacing any selected range
    InsertText(String),
    /// Backspace: remove the selection or the previous character, or join
    /// with the previous block at offset zero
    DeleteBackward,
}

/// Mutable working state that commands operate on
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub document: Document,
    pub selection: Selection,
    pub style_override: Option<StyleSet>,
}

impl Draft {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            document: snapshot.document().clone(),
            selection: snapshot.selection(),
            style_override: snapshot.style_override().cloned(),
        }
    }

    pub fn active_index(&self) -> usize {
        self.document
            .index_of(self.selection.block_id)
            .unwrap_or(0)
    }

    pub fn active_block(&self) -> &Block {
        &self.document.blocks()[self.active_index()]
    }

    pub fn active_block_mut(&mut self) -> &mut Block {
        let index = self.active_index();
        self.document.block_mut(index)
    }

    fn typing_styles(&self) -> StyleSet {
        if let Some(styles) = &self.style_override {
            return styles.clone();
        }
        match self.selection.start() {
            0 => StyleSet::new(),
            offset => self.active_block().styles_at(offset - 1),
        }
    }
}

pub(crate) fn execute(draft: &mut Draft, cmd: &Cmd) -> ChangeKind {
    match cmd {
        Cmd::SplitBlock => {
            split_block(draft);
            ChangeKind::SplitBlock
        }
        Cmd::RemoveRange { start, end } => {
            remove_range(draft, *start, *end);
            ChangeKind::RemoveRange
        }
        Cmd::SetBlockType(block_type) => {
            draft.active_block_mut().set_block_type(*block_type);
            ChangeKind::ChangeBlockType
        }
        Cmd::ToggleStyle(style) => {
            toggle_style(draft, *style);
            ChangeKind::StyleToggle
        }
        Cmd::InsertText(text) => {
            insert_text(draft, text);
            ChangeKind::InsertCharacters
        }
        Cmd::DeleteBackward => delete_backward(draft),
    }
}

/// Remove `start..end` from the active block and pull the selection along
pub(crate) fn remove_range(draft: &mut Draft, start: usize, end: usize) {
    let len = draft.active_block().len();
    let (start, end) = (start.min(end).min(len), start.max(end).min(len));
    if start == end {
        return;
    }
    draft.active_block_mut().remove_text(start, end);

    let removed = end - start;
    let shift = |offset: usize| {
        if offset <= start {
            offset
        } else if offset >= end {
            offset - removed
        } else {
            start
        }
    };
    draft.selection.anchor_offset = shift(draft.selection.anchor_offset);
    draft.selection.focus_offset = shift(draft.selection.focus_offset);
}

fn delete_selection(draft: &mut Draft) {
    let (start, end) = (draft.selection.start(), draft.selection.end());
    remove_range(draft, start, end);
    draft.selection = Selection::caret(draft.selection.block_id, start);
}

pub(crate) fn split_block(draft: &mut Draft) {
    if !draft.selection.is_collapsed() {
        delete_selection(draft);
    }
    let index = draft.active_index();
    let offset = draft.selection.focus_offset;
    let tail = draft.document.block_mut(index).split_off(offset);

    // The new block starts plain: no styles, default type.
    let block = Block::new(tail);
    let id = block.id();
    draft.document.insert_block(index + 1, block);
    draft.selection = Selection::caret(id, 0);
    draft.style_override = None;
}

fn toggle_style(draft: &mut Draft, style: InlineStyle) {
    if draft.selection.is_collapsed() {
        let mut styles = draft.typing_styles();
        if !styles.remove(&style) {
            styles.insert(style);
        }
        draft.style_override = Some(styles);
        return;
    }

    let (start, end) = (draft.selection.start(), draft.selection.end());
    let block = draft.active_block_mut();
    let fully_styled = (start..end).all(|offset| block.styles_at(offset).contains(&style));
    if fully_styled {
        block.remove_style(style, start, end);
    } else {
        block.add_style(style, start, end);
    }
}

fn insert_text(draft: &mut Draft, text: &str) {
    if !draft.selection.is_collapsed() {
        delete_selection(draft);
    }
    for (line_number, line) in text.split('\n').enumerate() {
        if line_number > 0 {
            split_block(draft);
        }
        if line.is_empty() {
            continue;
        }
        let offset = draft.selection.focus_offset;
        let styles = draft.style_override.take();
        draft.active_block_mut().insert_text(offset, line, styles.as_ref());
        let caret = offset + line.chars().count();
        draft.selection = Selection::caret(draft.selection.block_id, caret);
    }
}

fn delete_backward(draft: &mut Draft) -> ChangeKind {
    draft.style_override = None;
    if !draft.selection.is_collapsed() {
        delete_selection(draft);
        return ChangeKind::RemoveRange;
    }

    let caret = draft.selection.focus_offset;
    if caret > 0 {
        remove_range(draft, caret - 1, caret);
        return ChangeKind::BackspaceCharacter;
    }

    if draft.active_block().block_type() != BlockType::Default {
        draft.active_block_mut().set_block_type(BlockType::Default);
        return ChangeKind::ChangeBlockType;
    }

    let index = draft.active_index();
    if index == 0 {
        return ChangeKind::None;
    }
    let Some(current) = draft.document.remove_block(index) else {
        return ChangeKind::None;
    };
    let previous = draft.document.block_mut(index - 1);
    let join_at = previous.len();
    previous.append(current);
    draft.selection = Selection::caret(previous.id(), join_at);
    ChangeKind::BackspaceCharacter
}
