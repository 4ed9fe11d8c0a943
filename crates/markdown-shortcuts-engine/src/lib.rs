pub mod editing;
pub mod history;
pub mod io;
pub mod persistence;
pub mod session;
pub mod transitions;
pub mod triggers;

// Re-export key types for easier usage
pub use editing::{commands::*, document::*, selection::*, snapshot::*};
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use persistence::{
    FileStore, MemoryStore, PersistedForm, PersistenceAdapter, PersistenceError, deserialize,
    serialize,
};
pub use session::{EditorSession, HandleResult};
pub use transitions::{apply_split, apply_trigger};
pub use triggers::{TriggerKind, detect};
