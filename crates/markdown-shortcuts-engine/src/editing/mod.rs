/*!
 * # Editing Core Module
 *
 * The document model the shortcut engine edits, and the primitives it edits
 * it with.
 *
 * ## Architecture Overview
 *
 * ### 1. Explicit Document Model
 * - A [`Document`] is an ordered list of [`Block`]s
 * - Each block carries plain text, a [`BlockType`] and [`StyleRange`]s of
 *   [`InlineStyle`]s over its characters
 * - Offsets are character offsets, never bytes
 *
 * ### 2. Immutable Snapshots
 * - A [`Snapshot`] pairs a document with a [`Selection`] and the
 *   [`ChangeKind`] that produced it
 * - Edits never mutate a snapshot; they derive the next one
 * - Keeping old snapshots around is enough for undo/redo
 *
 * ### 3. Command-Based Editing
 * - All edits are expressed as [`Cmd`]s: split, remove range, set block
 *   type, toggle style, plus the plain typing commands a host needs
 * - Commands run on a private working copy, so a transition made of several
 *   commands still produces exactly one new snapshot
 *
 * ## Usage Pattern
 *
 * ```rust
 * use markdown_shortcuts_engine::editing::*;
 *
 * let snapshot = Snapshot::new(Document::from_text("Hello world"));
 * let snapshot = snapshot.apply(&Cmd::InsertText("> ".to_string()));
 * let snapshot = snapshot.apply(&Cmd::SplitBlock);
 *
 * assert_eq!(snapshot.document().len(), 2);
 * assert_eq!(snapshot.change_kind(), ChangeKind::SplitBlock);
 * ```
 */

// Module exports
pub mod commands;
pub mod document;
pub mod selection;
pub mod snapshot;

// Public API re-exports
pub use commands::Cmd;
pub use document::{
    ACCENT_COLOR, Block, BlockId, BlockType, Document, InlineStyle, StyleRange, StyleSet,
};
pub use selection::{Selection, SelectionError};
pub use snapshot::{ChangeKind, Snapshot};
