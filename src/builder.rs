use std::collections::HashSet;
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::process::{ProcessId, ProcessTree, is_pid};
use crate::source::{ProcFs, ProcSource};
use crate::stat::read_process;

/// What to do with a process whose parent is not part of the snapshot.
///
/// This happens when the parent exits mid-scan and the kernel has not re-parented the child yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Abort the build with [`Error::Link`]
    #[default]
    Fail,
    /// Attach the orphan to the synthetic root
    Adopt,
    /// Leave the orphan and its descendants out of the tree
    Drop,
}

/// Builds a [`ProcessTree`] from a [`ProcSource`].
///
/// Status records only expose the parent of a process, so the build runs in two passes: every
/// record is read first, then each process is appended to its parent's children.
pub struct TreeBuilder<S> {
    source: S,
    orphan_policy: OrphanPolicy,
}

impl TreeBuilder<ProcFs> {
    /// Builder reading a procfs mounted at `root`
    pub fn from_proc_root<P: AsRef<Path>>(root: P) -> Self {
        Self::new(ProcFs::new(root))
    }
}

impl<S: ProcSource> TreeBuilder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            orphan_policy: OrphanPolicy::default(),
        }
    }

    pub fn with_orphan_policy(mut self, orphan_policy: OrphanPolicy) -> Self {
        self.orphan_policy = orphan_policy;
        self
    }

    /// Scan every process and return the linked tree
    pub fn build(&self) -> Result<ProcessTree> {
        let candidates = self.enumerate()?;
        let mut tree = ProcessTree::new();

        // First pass: collect every process. Vanished ones are skipped, anything else is fatal.
        let mut discovered = Vec::with_capacity(candidates.len());
        for pid in candidates {
            match read_process(&self.source, &pid) {
                Ok(process) => {
                    tree.insert(process);
                    discovered.push(pid);
                }
                Err(err) if err.is_not_found() => {
                    debug!("Process {pid} exited during the scan, skipping it");
                }
                Err(err) => return Err(err),
            }
        }

        // Second pass: only now is every potential parent known
        link(&mut tree, &discovered, self.orphan_policy)?;
        ensure_reachable(&tree, &discovered)?;

        debug!(
            "Built process tree with {} processes",
            tree.process_count() - 1
        );
        Ok(tree)
    }

    /// Pid entries of the process directory, in numeric order
    fn enumerate(&self) -> Result<Vec<ProcessId>> {
        let pids = self
            .source
            .entries()?
            .into_iter()
            .filter(|name| is_pid(name))
            .map(ProcessId::from)
            .filter(|pid| {
                if pid.is_root() {
                    warn!("Ignoring process directory entry {pid}, this id is reserved for the root");
                }
                !pid.is_root()
            })
            .sorted_by(ProcessId::numeric_cmp)
            .dedup()
            .collect();
        Ok(pids)
    }
}

fn link(tree: &mut ProcessTree, order: &[ProcessId], policy: OrphanPolicy) -> Result<()> {
    let mut dropped = Vec::new();

    for pid in order {
        let Some(parent) = tree.get(pid.as_str()).and_then(|p| p.parent.clone()) else {
            continue;
        };
        if parent == *pid {
            return Err(Error::Link {
                pid: pid.clone(),
                parent,
            });
        }

        let parent = if tree.contains(parent.as_str()) {
            parent
        } else {
            match policy {
                OrphanPolicy::Fail => {
                    return Err(Error::Link {
                        pid: pid.clone(),
                        parent,
                    });
                }
                OrphanPolicy::Adopt => {
                    warn!("Parent {parent} of process {pid} is gone, attaching it to the root");
                    let root = ProcessId::root();
                    if let Some(process) = tree.get_mut(pid.as_str()) {
                        process.parent = Some(root.clone());
                    }
                    root
                }
                OrphanPolicy::Drop => {
                    warn!("Parent {parent} of process {pid} is gone, leaving it out");
                    dropped.push(pid.clone());
                    continue;
                }
            }
        };

        if let Some(parent) = tree.get_mut(parent.as_str()) {
            parent.children.push(pid.clone());
        }
    }

    // Children of a dropped orphan were linked to it, take them out with it
    while let Some(pid) = dropped.pop() {
        if let Some(process) = tree.remove(pid.as_str()) {
            dropped.extend(process.children);
        }
    }

    Ok(())
}

/// Every process must hang below the root. One that doesn't is part of a parent cycle.
fn ensure_reachable(tree: &ProcessTree, order: &[ProcessId]) -> Result<()> {
    let mut reached: HashSet<&str> = HashSet::with_capacity(tree.process_count());
    let mut stack = vec![tree.root()];
    while let Some(process) = stack.pop() {
        if !reached.insert(process.id.as_str()) {
            continue;
        }
        stack.extend(
            process
                .children
                .iter()
                .filter_map(|child| tree.get(child.as_str())),
        );
    }

    if reached.len() == tree.process_count() {
        return Ok(());
    }

    let stray = order
        .iter()
        .filter_map(|pid| tree.get(pid.as_str()))
        .find(|process| !reached.contains(process.id.as_str()));
    match stray {
        Some(process) => Err(Error::Link {
            pid: process.id.clone(),
            parent: process.parent.clone().unwrap_or_else(ProcessId::root),
        }),
        None => Ok(()),
    }
}
