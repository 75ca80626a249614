//! Path handling for index records.
//!
//! Index paths are plain strings holding exactly the name the filesystem
//! returned, with `/` as separator, so every record can be reopened. Unicode
//! normalization is applied only when comparing names, never to a stored
//! path.
//!
//! # Example
//!
//! ```
//! use dirdupes::scanner::path_utils::{parent_dir, names_match};
//!
//! assert!(names_match("cafe\u{0301}.txt", "café.txt"));
//! assert_eq!(parent_dir("backup/photos/a.jpg"), "backup/photos");
//! ```

use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Compare two names after NFC normalization.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.nfc().eq(b.nfc())
}

/// Whether `name` ends with `.{ext}`, comparing in NFC form.
#[must_use]
pub fn has_extension(name: &str, ext: &str) -> bool {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rsplit_once('.') {
        Some((_, found)) => names_match(found, ext),
        None => false,
    }
}

/// Convert a filesystem path to an index path.
///
/// The name is kept byte for byte; only the platform separator becomes `/`.
/// Returns `None` for paths that are not valid UTF-8, since a lossy
/// conversion could not be opened again.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use dirdupes::scanner::path_utils::to_index_path;
///
/// assert_eq!(to_index_path(Path::new("a/b/c.txt")).as_deref(), Some("a/b/c.txt"));
/// ```
#[must_use]
pub fn to_index_path(path: &Path) -> Option<String> {
    let s = path.to_str()?;
    if std::path::MAIN_SEPARATOR == '/' {
        Some(s.to_owned())
    } else {
        Some(s.replace(std::path::MAIN_SEPARATOR, "/"))
    }
}

/// Directory part of a forward-slash path, like POSIX `dirname`.
///
/// - no separator: `""`
/// - only a leading separator: `"/"`
/// - repeated separators before the file name are trimmed
///
/// # Example
///
/// ```
/// use dirdupes::scanner::path_utils::parent_dir;
///
/// assert_eq!(parent_dir("a/b/c"), "a/b");
/// assert_eq!(parent_dir("c"), "");
/// assert_eq!(parent_dir("/c"), "/");
/// ```
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        None => "",
        Some(idx) => {
            let head = &path[..=idx];
            let trimmed = head.trim_end_matches('/');
            if trimmed.is_empty() {
                head
            } else {
                trimmed
            }
        }
    }
}
