use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::process::ProcessId;

/// Default mount point of the process-information pseudo-filesystem
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Where process metadata comes from.
///
/// The tree only needs two things: the names found in the process directory, and the raw
/// status record of a given process.
pub trait ProcSource {
    /// Raw, unfiltered entry names of the process directory
    fn entries(&self) -> Result<Vec<String>>;

    /// Full status record of `pid`. Fails with [`Error::NotFound`] when the process is gone.
    fn read_stat(&self, pid: &ProcessId) -> Result<String>;
}

/// A procfs mount, `/proc` unless told otherwise
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn stat_path(&self, pid: &ProcessId) -> PathBuf {
        self.root.join(pid.as_str()).join("stat")
    }
}

/// A process that exits between enumeration and read shows up either as a missing file, or as
/// ESRCH when it is reaped between the open and the read.
fn is_vanished(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound || err.raw_os_error() == Some(libc::ESRCH)
}

impl ProcSource for ProcFs {
    fn entries(&self) -> Result<Vec<String>> {
        let enumeration_error = |source| Error::Enumeration {
            path: self.root.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(enumeration_error)? {
            let entry = entry.map_err(enumeration_error)?;
            // Non UTF-8 names can't be pids anyway
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    fn read_stat(&self, pid: &ProcessId) -> Result<String> {
        let path = self.stat_path(pid);
        let record = fs::read(&path).map_err(|source| {
            if is_vanished(&source) {
                Error::NotFound { pid: pid.clone() }
            } else {
                Error::Io { path, source }
            }
        })?;
        // Names are arbitrary bytes set by the process itself
        Ok(String::from_utf8_lossy(&record).into_owned())
    }
}
