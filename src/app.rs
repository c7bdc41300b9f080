use std::io::{self, Write};
use std::path::PathBuf;

use crate::prelude::*;
use clap::{Parser, ValueEnum};
use pstree::{DEFAULT_PROC_ROOT, OrphanPolicy, ProcessId, ROOT_PID, TreeBuilder, is_pid};

#[derive(Parser, Debug)]
#[command(name = "pstree")]
#[command(version, about = "Display the running processes as a tree")]
pub struct Cli {
    /// Mount point of the process-information filesystem
    #[arg(long, env = "PSTREE_PROC_ROOT", default_value = DEFAULT_PROC_ROOT)]
    pub proc_root: PathBuf,

    /// Only display the subtree of this process
    #[arg(long, value_parser = parse_pid)]
    pub pid: Option<ProcessId>,

    /// What to do with processes whose parent exited during the scan
    #[arg(long, env = "PSTREE_ORPHANS", value_enum, default_value_t = Orphans::Fail)]
    pub orphans: Orphans,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orphans {
    /// Abort with an error
    Fail,
    /// Attach them to the root
    Adopt,
    /// Leave them out, along with their descendants
    Drop,
}

impl From<Orphans> for OrphanPolicy {
    fn from(orphans: Orphans) -> Self {
        match orphans {
            Orphans::Fail => OrphanPolicy::Fail,
            Orphans::Adopt => OrphanPolicy::Adopt,
            Orphans::Drop => OrphanPolicy::Drop,
        }
    }
}

fn parse_pid(value: &str) -> std::result::Result<ProcessId, String> {
    if is_pid(value) {
        Ok(ProcessId::from(value))
    } else {
        Err(format!("`{value}` is not a process id"))
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    debug!("Running with {cli:?}");

    let rendered = snapshot(&cli)?;

    // Nothing reaches stdout unless the whole tree was built and rendered
    io::stdout()
        .lock()
        .write_all(rendered.as_bytes())
        .context("Failed to write the process tree")?;
    Ok(())
}

fn snapshot(cli: &Cli) -> Result<String> {
    let tree = TreeBuilder::from_proc_root(&cli.proc_root)
        .with_orphan_policy(cli.orphans.into())
        .build()
        .with_context(|| {
            format!(
                "Failed to build the process tree from {}",
                cli.proc_root.display()
            )
        })?;

    let start = cli.pid.as_ref().map_or(ROOT_PID, ProcessId::as_str);
    pstree::render(&tree, start, 0).context("Failed to render the process tree")
}
