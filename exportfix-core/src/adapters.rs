//! Default filesystem-backed port implementations.

use crate::ports::{SceneSource, WritePort};
use crate::scenes::{EDITOR_BUILD_SETTINGS, parse_editor_build_settings};
use camino::{Utf8Path, Utf8PathBuf};
use exportfix_types::io::{read_document, write_atomic};
use exportfix_types::{PatchError, PatchResult};
use fs_err as fs;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::debug;
use walkdir::WalkDir;

/// Reads enabled scenes from `ProjectSettings/EditorBuildSettings.asset`.
#[derive(Debug, Clone)]
pub struct FsSceneSource {
    pub project_root: Utf8PathBuf,
}

impl FsSceneSource {
    pub fn new(project_root: Utf8PathBuf) -> Self {
        Self { project_root }
    }
}

impl SceneSource for FsSceneSource {
    fn active_scenes(&self) -> PatchResult<Vec<String>> {
        let path = self.project_root.join(EDITOR_BUILD_SETTINGS);
        let scenes = parse_editor_build_settings(&read_document(&path)?)?;
        debug!(%path, scenes = scenes.len(), "loaded scene list");
        Ok(scenes)
    }
}

/// Explicit scene list for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySceneSource {
    scenes: Vec<String>,
}

impl InMemorySceneSource {
    pub fn new(scenes: Vec<String>) -> Self {
        Self { scenes }
    }
}

impl SceneSource for InMemorySceneSource {
    fn active_scenes(&self) -> PatchResult<Vec<String>> {
        Ok(self.scenes.clone())
    }
}

/// Filesystem writes. Files are written to a temporary sibling and renamed into
/// place, so readers never observe a partially written document.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> PatchResult<()> {
        write_atomic(path, contents)?;
        debug!(%path, bytes = contents.len(), "wrote file");
        Ok(())
    }

    fn copy_file(&self, from: &Utf8Path, to: &Utf8Path) -> PatchResult<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;
        }
        fs::copy(from, to).map_err(|e| PatchError::io(from, e))?;
        Ok(())
    }

    fn replace_dir(&self, from: &Utf8Path, to: &Utf8Path) -> PatchResult<()> {
        if !from.is_dir() {
            return Err(PatchError::not_found(format!("directory {from}")));
        }
        if to.exists() {
            fs::remove_dir_all(to).map_err(|e| PatchError::io(to, e))?;
        }

        let mut files = 0usize;
        for entry in WalkDir::new(from).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .and_then(|p| Utf8Path::from_path(p))
                    .unwrap_or(from)
                    .to_path_buf();
                PatchError::io(&path, e.into())
            })?;
            let src = Utf8Path::from_path(entry.path()).ok_or_else(|| {
                PatchError::malformed("path", format!("non UTF-8 path under {from}"))
            })?;
            let rel = src.strip_prefix(from).unwrap_or(src);
            let dest = to.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| PatchError::io(&dest, e))?;
            } else {
                fs::copy(src, &dest).map_err(|e| PatchError::io(src, e))?;
                files += 1;
            }
        }
        debug!(%from, %to, files, "replaced directory");
        Ok(())
    }
}

/// Records writes instead of touching the disk.
///
/// Used by tests and dry embedding hosts to observe what the pipeline would do.
#[derive(Debug, Default)]
pub struct InMemoryWritePort {
    files: RefCell<BTreeMap<Utf8PathBuf, Vec<u8>>>,
    copies: RefCell<Vec<(Utf8PathBuf, Utf8PathBuf)>>,
}

impl InMemoryWritePort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written so far, keyed by path.
    pub fn written(&self) -> BTreeMap<Utf8PathBuf, Vec<u8>> {
        self.files.borrow().clone()
    }

    /// `(from, to)` pairs of file copies and directory replacements.
    pub fn copies(&self) -> Vec<(Utf8PathBuf, Utf8PathBuf)> {
        self.copies.borrow().clone()
    }

    pub fn is_untouched(&self) -> bool {
        self.files.borrow().is_empty() && self.copies.borrow().is_empty()
    }
}

impl WritePort for InMemoryWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> PatchResult<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn copy_file(&self, from: &Utf8Path, to: &Utf8Path) -> PatchResult<()> {
        self.copies
            .borrow_mut()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn replace_dir(&self, from: &Utf8Path, to: &Utf8Path) -> PatchResult<()> {
        self.copy_file(from, to)
    }
}
