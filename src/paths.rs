//! Path composition
//!
//! All caller-supplied path strings pass through here before touching the
//! filesystem. Two modes exist: `Strict` (the default) refuses
//! parent-directory segments and absolute overrides, `Permissive` keeps
//! the raw-concatenation behavior so parity with permissive deployments
//! stays testable behind a config flag.

use std::path::{Path, PathBuf};

use crate::error::PathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    Strict,
    Permissive,
}

/// Filename portion of a client-supplied name: everything after the last
/// separator of either flavor. No further validation happens here.
pub fn base_name(client_name: &str) -> &str {
    client_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(client_name)
}

/// Destination for an uploaded file: the supplied directory string plus
/// the stored name. Permissive mode concatenates verbatim, so a trailing
/// separator is the caller's responsibility and `..` passes through;
/// relative results are anchored at `root`.
pub fn compose_destination(
    root: &Path,
    dir: &str,
    name: &str,
    mode: PathMode,
) -> Result<PathBuf, PathError> {
    match mode {
        PathMode::Permissive => {
            let joined = format!("{}{}", dir, name);
            Ok(anchor(root, &joined))
        }
        PathMode::Strict => {
            reject_unconfined(dir)?;
            if has_traversal(name) {
                return Err(PathError::Traversal(name.to_string()));
            }
            Ok(root.join(dir).join(name))
        }
    }
}

/// Target of an inspection request (`file` or `dir` parameter).
pub fn resolve_target(root: &Path, supplied: &str, mode: PathMode) -> Result<PathBuf, PathError> {
    match mode {
        PathMode::Permissive => Ok(anchor(root, supplied)),
        PathMode::Strict => {
            reject_unconfined(supplied)?;
            Ok(root.join(supplied))
        }
    }
}

fn anchor(root: &Path, supplied: &str) -> PathBuf {
    let path = Path::new(supplied);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(supplied)
    }
}

fn reject_unconfined(supplied: &str) -> Result<(), PathError> {
    if Path::new(supplied).is_absolute() {
        return Err(PathError::Absolute(supplied.to_string()));
    }
    if has_traversal(supplied) {
        return Err(PathError::Traversal(supplied.to_string()));
    }
    Ok(())
}

fn has_traversal(supplied: &str) -> bool {
    supplied.split(['/', '\\']).any(|segment| segment == "..")
}
