//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use exportfix_types::PatchResult;

/// Source of the scenes enabled in the build.
pub trait SceneSource {
    fn active_scenes(&self) -> PatchResult<Vec<String>>;
}

/// File-system write operations.
pub trait WritePort {
    /// Replace the file at `path` with `contents`.
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> PatchResult<()>;
    /// Copy a single file, overwriting the destination.
    fn copy_file(&self, from: &Utf8Path, to: &Utf8Path) -> PatchResult<()>;
    /// Replace the directory `to` with a recursive copy of `from`.
    fn replace_dir(&self, from: &Utf8Path, to: &Utf8Path) -> PatchResult<()>;
}
