use crate::editing::{BlockId, Document};

/// Caret or range inside a single block, in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub block_id: BlockId,
    pub anchor_offset: usize,
    pub focus_offset: usize,
}

/// Reasons a selection cannot be used as-is against a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Block {0} is not part of the document")]
    UnknownBlock(BlockId),
    #[error("Offset {offset} is outside block {block_id} of length {len}")]
    OffsetOutOfBounds {
        block_id: BlockId,
        offset: usize,
        len: usize,
    },
}

impl Selection {
    /// Zero-width caret at `offset`
    pub fn caret(block_id: BlockId, offset: usize) -> Self {
        Self {
            block_id,
            anchor_offset: offset,
            focus_offset: offset,
        }
    }

    pub fn range(block_id: BlockId, anchor_offset: usize, focus_offset: usize) -> Self {
        Self {
            block_id,
            anchor_offset,
            focus_offset,
        }
    }

    /// Whether this is a caret rather than a range
    pub fn is_collapsed(&self) -> bool {
        self.anchor_offset == self.focus_offset
    }

    pub fn start(&self) -> usize {
        self.anchor_offset.min(self.focus_offset)
    }

    pub fn end(&self) -> usize {
        self.anchor_offset.max(self.focus_offset)
    }

    pub fn validate(&self, document: &Document) -> Result<(), SelectionError> {
        let block = document
            .block(self.block_id)
            .ok_or(SelectionError::UnknownBlock(self.block_id))?;
        let len = block.len();
        let offset = self.end();
        if offset > len {
            return Err(SelectionError::OffsetOutOfBounds {
                block_id: self.block_id,
                offset,
                len,
            });
        }
        Ok(())
    }

    /// Pull both offsets back inside the referenced block.
    ///
    /// Returns `None` when the block is not in the document.
    pub fn clamp_to(&self, document: &Document) -> Option<Self> {
        let len = document.block(self.block_id)?.len();
        Some(Self {
            block_id: self.block_id,
            anchor_offset: self.anchor_offset.min(len),
            focus_offset: self.focus_offset.min(len),
        })
    }
}
