use serde::{Deserialize, Serialize};

use crate::editing::{BlockType, InlineStyle};
use crate::persistence::PersistenceError;

/// Self-describing stored form of a document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedForm {
    pub blocks: Vec<RawBlock>,
}

/// One stored block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Block id; regenerated on load when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub text: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
}

/// One stored style range, in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub style: InlineStyle,
    pub start: usize,
    pub end: usize,
}

impl PersistedForm {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(PersistenceError::Encode)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(json).map_err(PersistenceError::Decode)
    }
}
