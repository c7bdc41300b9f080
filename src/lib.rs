//! Process tree snapshots built from a procfs mount
//!
//! [`TreeBuilder`] reads every `/proc/<pid>/stat` record, links each process to its parent below
//! a synthetic root, and the [`printer`] renders the result depth-first, `pstree` style.

mod builder;
mod error;
mod process;
mod source;
mod stat;

pub mod printer;

pub use builder::{OrphanPolicy, TreeBuilder};
pub use error::{Error, Result};
pub use printer::{render, render_tree};
pub use process::{Process, ProcessId, ProcessTree, ROOT_NAME, ROOT_PID, is_pid};
pub use source::{DEFAULT_PROC_ROOT, ProcFs, ProcSource};
pub use stat::{parse_stat, read_process};
