use std::io;
use std::path::{Path, PathBuf};

use super::{SpillFile, SpillStorage};

/// Anonymous OS temp files. The directory entry is removed at creation, so the
/// open handle is the file's only reference.
#[derive(Debug, Clone, Default)]
pub struct TempFileStorage {
    dir: Option<PathBuf>,
}

impl TempFileStorage {
    /// Spill into the system temp directory.
    pub fn new() -> Self {
        Self { dir: None }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl SpillStorage for TempFileStorage {
    fn create(&self) -> io::Result<Box<dyn SpillFile>> {
        let file = match &self.dir {
            Some(dir) => tempfile::tempfile_in(dir)?,
            None => tempfile::tempfile()?,
        };
        Ok(Box::new(file))
    }
}
