use std::path::{Path, PathBuf};

/// A file as seen by an installer: its path and whether it existed when the
/// handle was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    path: PathBuf,
    exists: bool,
}

impl FileHandle {
    pub fn new<P: Into<PathBuf>>(path: P, exists: bool) -> Self {
        Self {
            path: path.into(),
            exists,
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn exists(&self) -> bool {
        self.exists
    }
}

/// Hands out [`FileHandle`]s for paths.
pub trait FileSystem {
    fn get_file(&self, path: &Path) -> FileHandle;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn get_file(&self, path: &Path) -> FileHandle {
        FileHandle::new(path, path.is_file())
    }
}

/// Resolves relative paths against a working directory.
pub trait Environment {
    fn working_directory(&self) -> PathBuf;

    /// Returns `path` unchanged if it is absolute, otherwise joins it onto
    /// the working directory.
    fn make_absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_directory().join(path)
        }
    }
}

/// [`Environment`] with a fixed working directory, usually the process's.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    working_directory: PathBuf,
}

impl ProcessEnvironment {
    pub fn new<P: Into<PathBuf>>(working_directory: P) -> Self {
        Self {
            working_directory: working_directory.into(),
        }
    }
    /// Captures the current working directory of the process.
    pub fn current() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }
}

impl Environment for ProcessEnvironment {
    fn working_directory(&self) -> PathBuf {
        self.working_directory.clone()
    }
}
