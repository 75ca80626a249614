//! Index record store.
//!
//! The index is the persisted list of files for a directory tree. Each
//! [`FileRecord`] starts with a path and size; hashes are filled in by the
//! selective hasher and saved back so later runs only hash what is new.
//!
//! * [`record`]: the record type, pruning of vanished files, hash clearing.
//! * [`io`]: JSON load/save with atomic replacement.

pub mod io;
pub mod record;

pub use io::{Index, IndexError, INDEX_VERSION};
pub use record::{clear_hashes, prune_missing, FileRecord, PruneStats};
