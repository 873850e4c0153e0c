//! Relative path rewriting against the document location.
//!
//! Pure lexical path arithmetic, no filesystem I/O: the rewritten path is
//! typically used to locate another file at runtime, so the segment walk
//! must not normalize or canonicalize beyond what the expression says.

use std::path::{Path, PathBuf};

/// Rewrite a slash-separated relative expression against the directory
/// containing `base_path`.
///
/// Each segment is applied in order: `..` moves to the parent directory,
/// any other segment is appended as a path component. No existence check
/// is performed.
///
/// ```
/// use std::path::Path;
/// use pyproject_settings::settings::rewrite_path;
///
/// let base = Path::new("/a/b/pyproject.toml");
/// assert_eq!(rewrite_path("../c/d", base), "/a/c/d");
/// assert_eq!(rewrite_path("x/y", base), "/a/b/x/y");
/// ```
pub fn rewrite_path(expr: &str, base_path: &Path) -> String {
    let mut dir: PathBuf = base_path.parent().map(Path::to_path_buf).unwrap_or_default();
    for segment in expr.split('/') {
        if segment == ".." {
            dir.pop();
        } else if !segment.is_empty() {
            dir.push(segment);
        }
    }
    dir.to_string_lossy().into_owned()
}
