use crate::error::{CommonError, CommonResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File system abstraction for header discovery, output and testing
pub trait FileSystem {
    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> CommonResult<String>;

    /// Files under `dir` with the given extension, recursively, sorted
    fn list_files(&self, dir: &Path, extension: &str) -> CommonResult<Vec<PathBuf>>;

    /// Immediate subdirectories of `dir`, sorted
    fn list_dirs(&self, dir: &Path) -> CommonResult<Vec<PathBuf>>;

    /// Remove `dir` with its contents and create it empty
    fn recreate_dir(&self, dir: &Path) -> CommonResult<()>;

    /// Replace the whole file; readers never observe a partial write
    fn write_atomic(&self, path: &Path, contents: &str) -> CommonResult<()>;
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn list_files(&self, dir: &Path, extension: &str) -> CommonResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(CommonError::not_found(dir));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn list_dirs(&self, dir: &Path) -> CommonResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(CommonError::not_found(dir));
        }

        let mut dirs = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    fn recreate_dir(&self, dir: &Path) -> CommonResult<()> {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;
        Ok(())
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> CommonResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CommonError::Generic(format!("Invalid output path: {}", path.display())))?;
        let temp = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&temp, contents)?;
        if let Err(err) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(err.into());
        }
        Ok(())
    }
}

/// In-memory file system for testing
#[derive(Default)]
pub struct MockFileSystem {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.borrow_mut().insert(ancestor.to_path_buf());
        }
        self.files.borrow_mut().insert(path, contents.into());
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path) || self.dirs.borrow().contains(path)
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        self.file(path).ok_or_else(|| CommonError::not_found(path))
    }

    fn list_files(&self, dir: &Path, extension: &str) -> CommonResult<Vec<PathBuf>> {
        if !self.dirs.borrow().contains(dir) {
            return Err(CommonError::not_found(dir));
        }

        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|path| path.starts_with(dir) && has_extension(path, extension))
            .cloned()
            .collect())
    }

    fn list_dirs(&self, dir: &Path) -> CommonResult<Vec<PathBuf>> {
        let dirs = self.dirs.borrow();
        if !dirs.contains(dir) {
            return Err(CommonError::not_found(dir));
        }

        Ok(dirs
            .iter()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn recreate_dir(&self, dir: &Path) -> CommonResult<()> {
        self.files.borrow_mut().retain(|path, _| !path.starts_with(dir));
        self.dirs
            .borrow_mut()
            .retain(|path| path == dir || !path.starts_with(dir));

        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.borrow_mut().insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> CommonResult<()> {
        self.add_file(path, contents);
        Ok(())
    }
}
