use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Identifier of the synthetic root. No real process is ever given pid 0.
pub const ROOT_PID: &str = "0";
/// Name shown for the synthetic root
pub const ROOT_NAME: &str = "sched";

/// Textual process identifier, as it appears in the process directory.
///
/// No arithmetic is ever done on it, so no integer range is assumed: the only
/// requirement is that ids discovered by enumeration are made of decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessId(String);

impl ProcessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_PID.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_PID
    }

    /// Numeric ordering on digit strings: shorter first, then lexicographic.
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

/// Whether a directory entry name looks like a pid
pub fn is_pid(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProcessId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProcessId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProcessId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One node of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id: ProcessId,
    /// Name as reported by the kernel, spaces and parentheses included
    pub name: String,
    /// `None` only for the synthetic root
    pub parent: Option<ProcessId>,
    /// Child ids, in discovery order
    pub children: Vec<ProcessId>,
}

impl Process {
    pub fn new(id: ProcessId, name: impl Into<String>, parent: ProcessId) -> Self {
        Self {
            id,
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
        }
    }

    fn synthetic_root() -> Self {
        Self {
            id: ProcessId::root(),
            name: ROOT_NAME.to_owned(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Point-in-time snapshot of every process, keyed by id.
///
/// Always holds the synthetic root under [`ROOT_PID`].
#[derive(Debug, Clone)]
pub struct ProcessTree {
    processes: HashMap<ProcessId, Process>,
}

impl Default for ProcessTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTree {
    /// A tree holding only the synthetic root
    pub fn new() -> Self {
        let root = Process::synthetic_root();
        Self {
            processes: HashMap::from([(root.id.clone(), root)]),
        }
    }

    pub fn root(&self) -> &Process {
        &self.processes[ROOT_PID]
    }

    pub fn get(&self, pid: &str) -> Option<&Process> {
        self.processes.get(pid)
    }

    pub fn contains(&self, pid: &str) -> bool {
        self.processes.contains_key(pid)
    }

    /// Number of entries, synthetic root included
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// All entries, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    /// Insert a process, replacing any previous entry with the same id. The root cannot be
    /// replaced.
    pub(crate) fn insert(&mut self, process: Process) -> Option<Process> {
        debug_assert!(!process.id.is_root(), "the synthetic root is reserved");
        self.processes.insert(process.id.clone(), process)
    }

    pub(crate) fn get_mut(&mut self, pid: &str) -> Option<&mut Process> {
        self.processes.get_mut(pid)
    }

    pub(crate) fn remove(&mut self, pid: &str) -> Option<Process> {
        if pid == ROOT_PID {
            return None;
        }
        self.processes.remove(pid)
    }
}
