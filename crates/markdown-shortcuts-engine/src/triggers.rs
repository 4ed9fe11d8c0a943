//! Markdown-style line-start shortcuts.
//!
//! A trigger is one of a handful of exact prefixes typed at the start of a
//! block and completed by a space. Matching is on the whole prefix before the
//! caret, so `#*` or `a*` never fire.

use crate::editing::{InlineStyle, Snapshot};

/// Character that completes a trigger
pub const TRIGGER_CHAR: char = ' ';

/// Longest prefix that can fire a trigger
pub const MAX_PREFIX_LEN: usize = 3;

/// Formatting requested by a recognised prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// `#`
    Heading,
    /// `*`
    Bold,
    /// `**`
    Colored,
    /// `***`
    Underline,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 4] = [
        TriggerKind::Heading,
        TriggerKind::Bold,
        TriggerKind::Colored,
        TriggerKind::Underline,
    ];

    /// The prefix that fires this trigger
    pub fn marker(&self) -> &'static str {
        match self {
            TriggerKind::Heading => "#",
            TriggerKind::Bold => "*",
            TriggerKind::Colored => "**",
            TriggerKind::Underline => "***",
        }
    }

    /// Number of characters stripped from the block when this fires
    pub fn consumed_len(&self) -> usize {
        self.marker().len()
    }

    /// Inline style applied by this trigger, `None` for block-level triggers
    pub fn inline_style(&self) -> Option<InlineStyle> {
        match self {
            TriggerKind::Heading => None,
            TriggerKind::Bold => Some(InlineStyle::Bold),
            TriggerKind::Colored => Some(InlineStyle::Colored),
            TriggerKind::Underline => Some(InlineStyle::Underline),
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == prefix)
    }
}

/// Decide whether typing `inserted` at `caret_offset` completes a trigger.
///
/// Only the text before the caret in this one block is considered. The caret
/// offset is in characters and must be between 1 and [`MAX_PREFIX_LEN`].
pub fn detect(block_text: &str, caret_offset: usize, inserted: char) -> Option<TriggerKind> {
    if inserted != TRIGGER_CHAR || !(1..=MAX_PREFIX_LEN).contains(&caret_offset) {
        return None;
    }
    let end = block_text.char_indices().nth(caret_offset).map(|(index, _)| index);
    let prefix = match end {
        Some(end) => &block_text[..end],
        None if block_text.chars().count() == caret_offset => block_text,
        None => return None,
    };
    TriggerKind::from_prefix(prefix)
}

/// Run [`detect`] against the active block of a snapshot.
///
/// Fires only for a single inserted space at a zero-width caret.
pub fn detect_in(snapshot: &Snapshot, inserted: &str) -> Option<TriggerKind> {
    let selection = snapshot.selection();
    if !selection.is_collapsed() {
        return None;
    }
    let mut chars = inserted.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return None;
    };
    detect(snapshot.active_block().text(), selection.focus_offset, ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Document, Selection};
    use rstest::rstest;

    #[rstest]
    #[case("#", 1, TriggerKind::Heading)]
    #[case("*", 1, TriggerKind::Bold)]
    #[case("**", 2, TriggerKind::Colored)]
    #[case("***", 3, TriggerKind::Underline)]
    #[case("#rest of line", 1, TriggerKind::Heading)]
    #[case("**text", 2, TriggerKind::Colored)]
    fn test_detects_exact_prefixes(
        #[case] text: &str,
        #[case] caret: usize,
        #[case] expected: TriggerKind,
    ) {
        assert_eq!(detect(text, caret, ' '), Some(expected));
    }

    #[rstest]
    #[case("#*", 2)]
    #[case("*#", 2)]
    #[case("##", 2)]
    #[case("a", 1)]
    #[case("a*", 2)]
    #[case(" *", 2)]
    #[case("*a*", 3)]
    #[case("#a", 2)]
    fn test_other_prefixes_never_fire(#[case] text: &str, #[case] caret: usize) {
        assert_eq!(detect(text, caret, ' '), None);
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(5)]
    #[case(12)]
    fn test_caret_outside_one_to_three_never_fires(#[case] caret: usize) {
        assert_eq!(detect("************", caret, ' '), None);
        assert_eq!(detect("####", caret, ' '), None);
    }

    #[test]
    fn test_only_space_completes_a_trigger() {
        assert_eq!(detect("#", 1, 'a'), None);
        assert_eq!(detect("*", 1, '\t'), None);
        assert_eq!(detect("*", 1, '*'), None);
    }

    #[test]
    fn test_caret_past_end_of_text_never_fires() {
        assert_eq!(detect("*", 2, ' '), None);
        assert_eq!(detect("", 1, ' '), None);
    }

    #[test]
    fn test_caret_counts_characters() {
        assert_eq!(detect("*é", 1, ' '), Some(TriggerKind::Bold));
        assert_eq!(detect("é*", 2, ' '), None);
    }

    #[test]
    fn test_consumed_len_matches_marker() {
        let lens: Vec<_> = TriggerKind::ALL.iter().map(TriggerKind::consumed_len).collect();
        assert_eq!(lens, vec![1, 1, 2, 3]);
    }

    #[test]
    fn test_detect_in_requires_collapsed_caret() {
        let doc = Document::from_text("**");
        let id = doc.blocks()[0].id();

        let caret = Snapshot::with_selection(doc.clone(), Selection::caret(id, 2));
        assert_eq!(detect_in(&caret, " "), Some(TriggerKind::Colored));
        assert_eq!(detect_in(&caret, "  "), None);
        assert_eq!(detect_in(&caret, ""), None);

        let range = Snapshot::with_selection(doc, Selection::range(id, 0, 2));
        assert_eq!(detect_in(&range, " "), None);
    }
}
