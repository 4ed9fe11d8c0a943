use std::fmt;

use crate::editing::commands::{self, Cmd, Draft};
use crate::editing::{Block, Document, Selection, StyleSet};

/// What produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChangeKind {
    /// Initial or externally supplied state
    #[default]
    None,
    SplitBlock,
    RemoveRange,
    ChangeBlockType,
    StyleToggle,
    InsertCharacters,
    BackspaceCharacter,
    Undo,
    Redo,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::None => "none",
            ChangeKind::SplitBlock => "split-block",
            ChangeKind::RemoveRange => "remove-range",
            ChangeKind::ChangeBlockType => "change-block-type",
            ChangeKind::StyleToggle => "style-toggle",
            ChangeKind::InsertCharacters => "insert-characters",
            ChangeKind::BackspaceCharacter => "backspace-character",
            ChangeKind::Undo => "undo",
            ChangeKind::Redo => "redo",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable editor state: a document, the selection inside it, and the
/// change that produced it.
///
/// Every edit derives a new snapshot from the previous one, so holding on to
/// an old snapshot is all undo needs. The selection always refers to a block
/// of the document and stays inside that block's text; constructors repair
/// anything that would break this.
///
/// ```rust
/// # use markdown_shortcuts_engine::editing::{Cmd, Document, Snapshot, BlockType};
/// let snapshot = Snapshot::new(Document::from_text("Title"));
/// let next = snapshot.apply(&Cmd::SetBlockType(BlockType::Heading));
///
/// assert_eq!(next.active_block().block_type(), BlockType::Heading);
/// assert_eq!(snapshot.active_block().block_type(), BlockType::Default);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    document: Document,
    selection: Selection,
    active: usize,
    style_override: Option<StyleSet>,
    change: ChangeKind,
    version: u64,
}

impl Snapshot {
    /// Caret at the start of the first block
    pub fn new(document: Document) -> Self {
        let document = non_empty(document);
        let selection = Selection::caret(document.blocks()[0].id(), 0);
        Self::with_selection(document, selection)
    }

    /// Pair a document with a selection, clamping the selection into the
    /// document. An unknown block falls back to the start of the first block.
    pub fn with_selection(document: Document, selection: Selection) -> Self {
        let document = non_empty(document);
        let (selection, active) = settle(&document, selection);
        Self {
            document,
            selection,
            active,
            style_override: None,
            change: ChangeKind::None,
            version: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn change_kind(&self) -> ChangeKind {
        self.change
    }

    /// Incremented on every derived snapshot
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Styles the next typed characters will receive, when set explicitly
    pub fn style_override(&self) -> Option<&StyleSet> {
        self.style_override.as_ref()
    }

    /// The block holding the selection
    pub fn active_block(&self) -> &Block {
        &self.document.blocks()[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Styles that typing at the caret would apply: the override if one is
    /// set, otherwise whatever the preceding character carries.
    pub fn active_styles(&self) -> StyleSet {
        if let Some(styles) = &self.style_override {
            return styles.clone();
        }
        match self.selection.start() {
            0 => StyleSet::new(),
            offset => self.active_block().styles_at(offset - 1),
        }
    }

    /// Whether the document, selection and override match, ignoring how each
    /// snapshot was produced
    pub fn same_state(&self, other: &Snapshot) -> bool {
        self.document == other.document
            && self.selection == other.selection
            && self.style_override == other.style_override
    }

    /// Run a single command and return the resulting snapshot
    pub fn apply(&self, cmd: &Cmd) -> Snapshot {
        let mut draft = Draft::from_snapshot(self);
        let change = commands::execute(&mut draft, cmd);
        self.derive(draft, change)
    }

    /// The same state re-labelled as the result of `change` at `version`
    pub(crate) fn relabel(&self, change: ChangeKind, version: u64) -> Snapshot {
        Snapshot {
            change,
            version,
            ..self.clone()
        }
    }

    pub(crate) fn derive(&self, draft: Draft, change: ChangeKind) -> Snapshot {
        let Draft {
            document,
            selection,
            style_override,
        } = draft;
        let document = non_empty(document);
        let (selection, active) = settle(&document, selection);
        Snapshot {
            document,
            selection,
            active,
            style_override,
            change,
            version: self.version + 1,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

fn non_empty(document: Document) -> Document {
    if document.is_empty() {
        log::debug!("Document has no blocks, starting from a single empty block");
        Document::new()
    } else {
        document
    }
}

fn settle(document: &Document, selection: Selection) -> (Selection, usize) {
    match (
        selection.clamp_to(document),
        document.index_of(selection.block_id),
    ) {
        (Some(clamped), Some(index)) => (clamped, index),
        _ => (Selection::caret(document.blocks()[0].id(), 0), 0),
    }
}
