//! Converting documents to and from their stored form.
//!
//! [`serialize`] and [`deserialize`] define the contract; where the stored
//! form lives is up to a [`PersistenceAdapter`] supplied by the host.

pub mod form;
pub mod store;

pub use form::{PersistedForm, RawBlock, RawStyleRange};
pub use store::{DEFAULT_STORAGE_KEY, FileStore, MemoryStore, PersistenceAdapter};

use std::collections::HashSet;

use uuid::Uuid;

use crate::editing::{Block, BlockId, Document};
use crate::io::IoError;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to decode stored document: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Block {block} has an inverted style range {start}..{end}")]
    InvertedStyleRange {
        block: usize,
        start: usize,
        end: usize,
    },
    #[error("Block {block} has a style range ending at {end} past its text length {len}")]
    StyleRangeOutOfBounds { block: usize, end: usize, len: usize },
    #[error("Storage error: {0}")]
    Storage(#[from] IoError),
}

/// Describe every block of `document` in order
pub fn serialize(document: &Document) -> PersistedForm {
    PersistedForm {
        blocks: document
            .blocks()
            .iter()
            .map(|block| RawBlock {
                key: Some(block.id().to_string()),
                text: block.text().to_string(),
                block_type: block.block_type(),
                inline_style_ranges: block
                    .style_ranges()
                    .iter()
                    .map(|range| RawStyleRange {
                        style: range.style,
                        start: range.start,
                        end: range.end,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Rebuild a document from its stored form.
///
/// Style ranges must lie inside their block's text. Keys that are missing,
/// malformed or repeated are replaced with fresh ids.
pub fn deserialize(form: PersistedForm) -> Result<Document, PersistenceError> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::with_capacity(form.blocks.len());

    for (index, raw) in form.blocks.into_iter().enumerate() {
        let id = raw
            .key
            .as_deref()
            .and_then(|key| Uuid::parse_str(key).ok())
            .map(BlockId)
            .filter(|id| seen.insert(*id))
            .unwrap_or_else(|| {
                let id = BlockId::new();
                seen.insert(id);
                id
            });

        let mut block = Block::new(raw.text).with_id(id).with_type(raw.block_type);
        let len = block.len();
        for range in raw.inline_style_ranges {
            if range.start > range.end {
                return Err(PersistenceError::InvertedStyleRange {
                    block: index,
                    start: range.start,
                    end: range.end,
                });
            }
            if range.end > len {
                return Err(PersistenceError::StyleRangeOutOfBounds {
                    block: index,
                    end: range.end,
                    len,
                });
            }
            block = block.with_style(range.style, range.start..range.end);
        }
        blocks.push(block);
    }

    Ok(Document::from_blocks(blocks))
}
