//! Thin file helpers that map failures into [`PatchError`].

use crate::error::{PatchError, PatchResult};
use camino::Utf8Path;
use fs_err as fs;
use std::io::Write;

/// Read a whole document as UTF-8 text.
pub fn read_document(path: &Utf8Path) -> PatchResult<String> {
    fs::read_to_string(path).map_err(|e| PatchError::io(path, e))
}

/// Overwrite a document. See [`write_atomic`].
pub fn write_document(path: &Utf8Path, contents: &str) -> PatchResult<()> {
    write_atomic(path, contents.as_bytes())
}

/// Write to a temporary sibling, then rename it over `path`, so readers never
/// observe a partially written file. Missing parent directories are created.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> PatchResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| PatchError::io(parent, e))?;
    tmp.write_all(contents).map_err(|e| PatchError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| PatchError::io(path, e))?;
    tmp.persist(path).map_err(|e| PatchError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatchErrorKind;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn read_missing_is_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let err = read_document(&root.join("missing.xcscheme")).expect_err("missing");
        assert_eq!(err.kind(), PatchErrorKind::NotFound);
    }

    #[test]
    fn write_then_read() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let path = root.join("doc.txt");
        write_document(&path, "hello").expect("write");
        assert_eq!(read_document(&path).expect("read"), "hello");
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let path = root.join("nested").join("doc.xcscheme");
        write_document(&path, "first").expect("write");
        write_document(&path, "second").expect("overwrite");

        assert_eq!(read_document(&path).expect("read"), "second");
        let entries = std::fs::read_dir(root.join("nested")).expect("list").count();
        assert_eq!(entries, 1);
    }
}
