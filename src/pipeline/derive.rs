//! Output-path derivation: `report.md` → `report.pdf`.
//!
//! Only the final extension is considered, so `notes.md.bak` and
//! `drafts.md/chapter.txt` are left alone rather than having a `.md`
//! somewhere in the middle rewritten.
//!
//! When the input does not end in the source extension the path comes back
//! unchanged. That is not an error: the renderer is still run, and the
//! caller decides whether an output equal to the input is worth a warning.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Replace the final `source_ext` extension of `input` with `target_ext`.
///
/// Extensions are given without the leading dot and compared
/// case-sensitively. No normalisation of separators or `..` components is
/// performed.
pub fn derive_output_path(input: &Path, source_ext: &str, target_ext: &str) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == OsStr::new(source_ext) => input.with_extension(target_ext),
        _ => input.to_path_buf(),
    }
}
