use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::process::ProcessId;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while scanning, linking or rendering a process tree
#[derive(Error, Debug)]
pub enum Error {
    /// The process is gone: its status record could not be opened, or the
    /// requested id is not part of the tree
    #[error("process {pid} not found")]
    NotFound { pid: ProcessId },

    /// The status record does not follow the `pid (name) state ppid ...` layout
    #[error("unable to parse status record of process {pid}: {record:?}")]
    Parse { pid: ProcessId, record: String },

    /// The process directory itself cannot be listed
    #[error("unable to list process directory {}", .path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A process points at a parent that is not in the tree
    #[error("process {pid} references unknown parent {parent}")]
    Link { pid: ProcessId, parent: ProcessId },

    /// Any other I/O failure while reading a status record
    #[error("unable to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Whether this error only means the process exited during the scan
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
