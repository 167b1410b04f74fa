pub mod completions;

pub mod man;

use std::fs;
use std::path::{Path, PathBuf};

/// Name of the installed binary.
pub const BIN_NAME: &str = "git2version";

/// Resolve `out_dir` against the workspace root and create it.
pub fn output_dir(out_dir: &Path) -> Result<PathBuf, String> {
    let dir = crate::workspace_root().join(out_dir);
    fs::create_dir_all(&dir).map_err(|e| format!("{}: {e}", dir.display()))?;
    Ok(dir)
}
