use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Accent colour used to render [`InlineStyle::Colored`] text
pub const ACCENT_COLOR: &str = "#FF0000";

/// Stable identifier for a block, unique within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block-level formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Plain paragraph
    #[default]
    Default,
    /// Heading line
    Heading,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Default => "default",
            BlockType::Heading => "heading",
        }
    }
}

/// Inline formatting attribute applied to a range of characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineStyle {
    /// Bold weight
    Bold,
    /// Rendered in [`ACCENT_COLOR`]
    Colored,
    /// Underline decoration
    Underline,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 3] = [
        InlineStyle::Bold,
        InlineStyle::Colored,
        InlineStyle::Underline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InlineStyle::Bold => "bold",
            InlineStyle::Colored => "colored",
            InlineStyle::Underline => "underline",
        }
    }
}

/// Set of inline styles active at a position
pub type StyleSet = BTreeSet<InlineStyle>;

/// A style applied over the half-open character range `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRange {
    pub style: InlineStyle,
    pub start: usize,
    pub end: usize,
}

impl StyleRange {
    pub fn new(style: InlineStyle, start: usize, end: usize) -> Self {
        Self { style, start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the character at `offset` carries this style
    pub fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// One paragraph-like unit of text with its own type and styles.
///
/// All offsets are measured in characters. Style ranges are kept normalized:
/// never empty, never past the end of the text, and ranges of the same style
/// never overlap or touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    text: String,
    block_type: BlockType,
    styles: Vec<StyleRange>,
}

impl Block {
    /// Create a default block with a fresh id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            text: text.into(),
            block_type: BlockType::Default,
            styles: Vec::new(),
        }
    }

    /// Create a heading block with a fresh id
    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(text).with_type(BlockType::Heading)
    }

    pub fn with_id(mut self, id: BlockId) -> Self {
        self.id = id;
        self
    }

    pub fn with_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    /// Apply `style` over `range`, clamped to the text
    pub fn with_style(mut self, style: InlineStyle, range: Range<usize>) -> Self {
        self.add_style(style, range.start, range.end);
        self
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn style_ranges(&self) -> &[StyleRange] {
        &self.styles
    }

    /// Length of the text in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Styles carried by the character at `offset`
    pub fn styles_at(&self, offset: usize) -> StyleSet {
        self.styles
            .iter()
            .filter(|range| range.covers(offset))
            .map(|range| range.style)
            .collect()
    }

    /// Whether any part of the block carries `style`
    pub fn has_style(&self, style: InlineStyle) -> bool {
        self.styles.iter().any(|range| range.style == style)
    }

    /// Compare text, type and styles, ignoring the id
    pub fn content_eq(&self, other: &Block) -> bool {
        self.text == other.text
            && self.block_type == other.block_type
            && self.styles == other.styles
    }

    pub(crate) fn set_id(&mut self, id: BlockId) {
        self.id = id;
    }

    pub(crate) fn set_block_type(&mut self, block_type: BlockType) {
        self.block_type = block_type;
    }

    /// Drop every range of the given styles
    pub(crate) fn clear_styles(&mut self, styles: &[InlineStyle]) {
        self.styles.retain(|range| !styles.contains(&range.style));
    }

    pub(crate) fn add_style(&mut self, style: InlineStyle, start: usize, end: usize) {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        self.styles.push(StyleRange::new(style, start, end));
        self.normalize();
    }

    /// Subtract `start..end` from every range of `style`
    pub(crate) fn remove_style(&mut self, style: InlineStyle, start: usize, end: usize) {
        let mut kept = Vec::with_capacity(self.styles.len() + 1);
        for range in self.styles.drain(..) {
            if range.style != style || range.end <= start || range.start >= end {
                kept.push(range);
                continue;
            }
            if range.start < start {
                kept.push(StyleRange::new(style, range.start, start));
            }
            if range.end > end {
                kept.push(StyleRange::new(style, end, range.end));
            }
        }
        self.styles = kept;
        self.normalize();
    }

    /// Insert `text` at `offset`.
    ///
    /// Without an override the new characters inherit the styles of the
    /// character before them. With an override they carry exactly that set.
    pub(crate) fn insert_text(&mut self, offset: usize, text: &str, styles: Option<&StyleSet>) {
        let inserted = text.chars().count();
        if inserted == 0 {
            return;
        }
        let offset = offset.min(self.len());
        let at = byte_index(&self.text, offset);
        self.text.insert_str(at, text);

        for range in &mut self.styles {
            if range.start >= offset {
                range.start += inserted;
                range.end += inserted;
            } else if range.end >= offset {
                range.end += inserted;
            }
        }

        if let Some(styles) = styles {
            for style in InlineStyle::ALL {
                if styles.contains(&style) {
                    self.styles.push(StyleRange::new(style, offset, offset + inserted));
                } else {
                    self.remove_style(style, offset, offset + inserted);
                }
            }
        }
        self.normalize();
    }

    /// Remove the characters in `start..end`, clamped to the text
    pub(crate) fn remove_text(&mut self, start: usize, end: usize) {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        if start == end {
            return;
        }
        let removed = end - start;
        let (from, to) = (byte_index(&self.text, start), byte_index(&self.text, end));
        self.text.replace_range(from..to, "");

        let shift = |offset: usize| {
            if offset <= start {
                offset
            } else if offset >= end {
                offset - removed
            } else {
                start
            }
        };
        for range in &mut self.styles {
            range.start = shift(range.start);
            range.end = shift(range.end);
        }
        self.normalize();
    }

    /// Cut the text at `offset`, keeping the head and returning the tail
    pub(crate) fn split_off(&mut self, offset: usize) -> String {
        let offset = offset.min(self.len());
        let tail = self.text.split_off(byte_index(&self.text, offset));
        for range in &mut self.styles {
            range.start = range.start.min(offset);
            range.end = range.end.min(offset);
        }
        self.normalize();
        tail
    }

    /// Append another block's text and styles to this one
    pub(crate) fn append(&mut self, other: Block) {
        let shift = self.len();
        self.text.push_str(&other.text);
        self.styles.extend(
            other
                .styles
                .into_iter()
                .map(|range| StyleRange::new(range.style, range.start + shift, range.end + shift)),
        );
        self.normalize();
    }

    fn normalize(&mut self) {
        self.styles.retain(|range| !range.is_empty());
        self.styles.sort_by_key(|range| (range.style, range.start, range.end));

        let mut merged: Vec<StyleRange> = Vec::with_capacity(self.styles.len());
        for range in self.styles.drain(..) {
            match merged.last_mut() {
                Some(last) if last.style == range.style && range.start <= last.end => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        self.styles = merged;
    }
}

/// Ordered sequence of blocks.
///
/// Block ids are unique; constructors regenerate any duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// A fresh document holding a single empty block
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::new("")],
        }
    }

    /// Build a document from blocks, which may be empty
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut seen = BTreeSet::new();
        let blocks = blocks
            .into_iter()
            .map(|mut block| {
                if !seen.insert(block.id()) {
                    log::warn!("Duplicate block id {}, assigning a new one", block.id());
                    block.set_id(BlockId::new());
                    seen.insert(block.id());
                }
                block
            })
            .collect();
        Self { blocks }
    }

    /// One default block per line of `text`
    pub fn from_text(text: &str) -> Self {
        Self::from_blocks(text.split('\n').map(Block::new))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id() == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id() == id)
    }

    /// Block texts joined by newlines
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compare block texts, types and styles in order, ignoring ids
    pub fn content_eq(&self, other: &Document) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.content_eq(b))
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> &mut Block {
        &mut self.blocks[index]
    }

    pub(crate) fn insert_block(&mut self, index: usize, block: Block) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
    }

    pub(crate) fn remove_block(&mut self, index: usize) -> Option<Block> {
        (index < self.blocks.len()).then(|| self.blocks.remove(index))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte index of the character at `char_offset`, or the text length past the end
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
