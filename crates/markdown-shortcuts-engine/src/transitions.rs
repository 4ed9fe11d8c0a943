//! Formatting transitions fired by triggers and by line breaks.
//!
//! Each transition runs its steps against one working copy and commits a
//! single snapshot, so no intermediate state is ever observable.

use crate::editing::commands::{self, Draft};
use crate::editing::{BlockType, ChangeKind, InlineStyle, Snapshot, StyleSet};
use crate::triggers::TriggerKind;

/// Apply a detected trigger to the active block.
///
/// Clears every inline style and resets the block type, strips the first
/// `consumed_len` characters, then applies the trigger's formatting. Inline
/// triggers style the remaining text and become the typing style at the
/// caret.
///
/// Returns `None` when the result would be identical to `snapshot`, which the
/// caller treats as "not handled".
pub fn apply_trigger(
    snapshot: &Snapshot,
    kind: TriggerKind,
    consumed_len: usize,
) -> Option<Snapshot> {
    let mut draft = Draft::from_snapshot(snapshot);

    let block = draft.active_block_mut();
    block.clear_styles(&InlineStyle::ALL);
    block.set_block_type(BlockType::Default);
    draft.style_override = None;

    let consumed = consumed_len.min(draft.active_block().len());
    if consumed != consumed_len {
        log::debug!("Trigger consumes {consumed_len} chars but block has {consumed}, clamping");
    }
    commands::remove_range(&mut draft, 0, consumed);

    let change = match kind.inline_style() {
        None => {
            draft.active_block_mut().set_block_type(BlockType::Heading);
            ChangeKind::ChangeBlockType
        }
        Some(style) => {
            let block = draft.active_block_mut();
            let len = block.len();
            block.add_style(style, 0, len);
            draft.style_override = Some(StyleSet::from([style]));
            ChangeKind::StyleToggle
        }
    };

    let next = snapshot.derive(draft, change);
    if next.same_state(snapshot) {
        return None;
    }
    log::debug!(
        "Applied {kind:?} trigger to block {} ({change})",
        next.active_block().id()
    );
    Some(next)
}

/// Split the active block at the caret.
///
/// The new block never inherits inline styles or the block type, so
/// formatting does not bleed across a manual line break.
pub fn apply_split(snapshot: &Snapshot) -> Snapshot {
    let mut draft = Draft::from_snapshot(snapshot);
    commands::split_block(&mut draft);
    snapshot.derive(draft, ChangeKind::SplitBlock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Block, Document, Selection, StyleRange};
    use pretty_assertions::assert_eq;

    fn caret_at_end(text: &str) -> Snapshot {
        let doc = Document::from_text(text);
        let id = doc.blocks()[0].id();
        Snapshot::with_selection(doc, Selection::caret(id, text.chars().count()))
    }

    #[test]
    fn test_heading_trigger() {
        let next = apply_trigger(&caret_at_end("#"), TriggerKind::Heading, 1).unwrap();

        assert_eq!(next.active_block().text(), "");
        assert_eq!(next.active_block().block_type(), BlockType::Heading);
        assert!(next.active_block().style_ranges().is_empty());
        assert!(next.active_styles().is_empty());
        assert_eq!(next.change_kind(), ChangeKind::ChangeBlockType);
        assert_eq!(next.selection().focus_offset, 0);
    }

    #[test]
    fn test_bold_trigger_sets_typing_style() {
        let next = apply_trigger(&caret_at_end("*"), TriggerKind::Bold, 1).unwrap();

        assert_eq!(next.active_block().text(), "");
        assert_eq!(next.active_block().block_type(), BlockType::Default);
        assert_eq!(next.active_styles(), StyleSet::from([InlineStyle::Bold]));
        assert_eq!(next.change_kind(), ChangeKind::StyleToggle);
    }

    #[test]
    fn test_colored_trigger_styles_remaining_text() {
        let doc = Document::from_text("**hello");
        let id = doc.blocks()[0].id();
        let snapshot = Snapshot::with_selection(doc, Selection::caret(id, 2));

        let next = apply_trigger(&snapshot, TriggerKind::Colored, 2).unwrap();

        assert_eq!(next.active_block().text(), "hello");
        assert_eq!(
            next.active_block().style_ranges().to_vec(),
            vec![StyleRange::new(InlineStyle::Colored, 0, 5)]
        );
        assert_eq!(next.active_styles(), StyleSet::from([InlineStyle::Colored]));
    }

    #[test]
    fn test_trigger_clears_previous_formatting() {
        let block = Block::heading("***")
            .with_style(InlineStyle::Bold, 0..3)
            .with_style(InlineStyle::Colored, 1..2);
        let id = block.id();
        let snapshot =
            Snapshot::with_selection(Document::from_blocks([block]), Selection::caret(id, 3));

        let next = apply_trigger(&snapshot, TriggerKind::Underline, 3).unwrap();

        assert_eq!(next.active_block().block_type(), BlockType::Default);
        assert!(!next.active_block().has_style(InlineStyle::Bold));
        assert!(!next.active_block().has_style(InlineStyle::Colored));
        assert_eq!(next.active_styles(), StyleSet::from([InlineStyle::Underline]));
    }

    #[test]
    fn test_trigger_only_touches_active_block() {
        let other = Block::new("*").with_style(InlineStyle::Bold, 0..1);
        let active = Block::new("#");
        let id = active.id();
        let doc = Document::from_blocks([other.clone(), active]);
        let snapshot = Snapshot::with_selection(doc, Selection::caret(id, 1));

        let next = apply_trigger(&snapshot, TriggerKind::Heading, 1).unwrap();

        assert!(next.document().blocks()[0].content_eq(&other));
        assert_eq!(next.active_index(), 1);
    }

    #[test]
    fn test_consumed_len_is_clamped_to_text() {
        let next = apply_trigger(&caret_at_end("#"), TriggerKind::Heading, 5).unwrap();
        assert_eq!(next.active_block().text(), "");
        assert_eq!(next.active_block().block_type(), BlockType::Heading);
    }

    #[test]
    fn test_no_net_change_is_not_handled() {
        let heading = Block::heading("");
        let id = heading.id();
        let snapshot =
            Snapshot::with_selection(Document::from_blocks([heading]), Selection::caret(id, 0));

        assert!(apply_trigger(&snapshot, TriggerKind::Heading, 0).is_none());
    }

    #[test]
    fn test_split_drops_styles_from_new_block() {
        let block = Block::new("bold text").with_style(InlineStyle::Bold, 0..9);
        let id = block.id();
        let snapshot =
            Snapshot::with_selection(Document::from_blocks([block]), Selection::caret(id, 4));

        let next = apply_split(&snapshot);
        let blocks = next.document().blocks();

        assert_eq!(blocks.len(), 2);
        assert_eq!(format!("{}{}", blocks[0].text(), blocks[1].text()), "bold text");
        assert_eq!(
            blocks[0].style_ranges().to_vec(),
            vec![StyleRange::new(InlineStyle::Bold, 0, 4)]
        );
        assert!(blocks[1].style_ranges().is_empty());
        assert_eq!(next.change_kind(), ChangeKind::SplitBlock);
        assert!(next.active_styles().is_empty());
    }

    #[test]
    fn test_split_does_not_carry_heading_type() {
        let block = Block::heading("Title");
        let id = block.id();
        let snapshot =
            Snapshot::with_selection(Document::from_blocks([block]), Selection::caret(id, 5));

        let next = apply_split(&snapshot);

        assert_eq!(next.document().blocks()[0].block_type(), BlockType::Heading);
        assert_eq!(next.document().blocks()[1].block_type(), BlockType::Default);
        assert_eq!(next.active_block().text(), "");
    }
}
