use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConvertError, Result};

/// Output directory that converted files are committed into.
///
/// Every write goes to a temp file inside the same directory and is renamed
/// into place once complete, so readers never see a half-written file. A temp
/// file that is not committed is removed when it is dropped.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Open the output directory, creating it and any missing parents.
    /// An existing directory is reused as is.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ConvertError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `value` as pretty JSON (two-space indent, non-ASCII kept as is)
    /// and commit it under `file_name`, replacing any previous file.
    pub fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let json_content = serde_json::to_string_pretty(value)?;
        self.commit(file_name, |tmp| tmp.write_all(json_content.as_bytes()))
    }

    /// Copy `source` byte for byte and commit it under `file_name`
    pub fn copy_file(&self, source: &Path, file_name: &str) -> Result<PathBuf> {
        let mut reader = File::open(source)?;
        self.commit(file_name, |tmp| io::copy(&mut reader, tmp).map(|_| ()))
    }

    fn commit<F>(&self, file_name: &str, fill: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
    {
        let target = self.dir.join(file_name);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        fill(&mut tmp)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target)?;
        debug!("Committed {}", target.display());
        Ok(target)
    }
}
