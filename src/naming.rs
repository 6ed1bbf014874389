//! Output file names for split chunks.
//!
//! Downstream tooling globs for `<stem>_partNNN.jsonl`, so these names are a
//! compatibility contract. The index is padded to three digits and simply grows
//! wider after 999; lexical ordering only holds within one width.

use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Final path component of the input, used unchanged on the short-circuit path.
pub fn base_name(input: &Path) -> Result<&std::ffi::OsStr> {
    input
        .file_name()
        .ok_or_else(|| SplitError::NotFound {
            path: input.to_path_buf(),
        })
}

/// Base name with its last extension removed (`data.v2.jsonl` -> `data.v2`).
pub fn stem(input: &Path) -> Result<String> {
    let stem = Path::new(base_name(input)?)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(stem)
}

/// `<stem>_part<index:03>.jsonl`.
pub fn chunk_file_name(stem: &str, index: usize) -> String {
    format!("{stem}_part{index:03}.jsonl")
}

/// Joins [`chunk_file_name`] onto the output directory.
pub fn chunk_path(output_dir: &Path, stem: &str, index: usize) -> PathBuf {
    output_dir.join(chunk_file_name(stem, index))
}
