//! Blob path validation.
//!
//! Valid blob paths:
//! - Must be non-empty
//! - Must be relative (no leading `/`)
//! - Components must be non-empty and must not be `.` or `..`
//! - Must not contain `\` or NUL

use crate::error::{BlobError, BlobResult};

/// Validate a blob path, returning `Ok(())` if it is safe to use as a key
/// and as a filesystem path under a store root.
pub fn validate_blob_path(path: &str) -> BlobResult<()> {
    let invalid = |reason: &str| BlobError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("path must not be empty"));
    }
    if path.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(invalid("path contains a forbidden character"));
    }
    for component in path.split('/') {
        match component {
            "" => return Err(invalid("path has an empty component")),
            "." | ".." => return Err(invalid("path must not contain '.' or '..' components")),
            _ => {}
        }
    }
    Ok(())
}
