//! Parsing of `/proc/<pid>/stat` records.
//!
//! A record looks like `25926 (a.out) S 25906 31864 ...`. The name is wrapped in parentheses
//! but may itself contain anything, parentheses included, so it spans from the first `(` to the
//! last `)`. The state code and the parent pid are the first two fields after it.

use crate::error::{Error, Result};
use crate::process::{Process, ProcessId, is_pid};
use crate::source::ProcSource;

/// Read and parse the status record of `pid`
pub fn read_process<S: ProcSource + ?Sized>(source: &S, pid: &ProcessId) -> Result<Process> {
    let record = source.read_stat(pid)?;
    parse_stat(pid, &record)
}

/// Parse a raw status record into a childless [`Process`]
pub fn parse_stat(pid: &ProcessId, record: &str) -> Result<Process> {
    let parse_error = || Error::Parse {
        pid: pid.clone(),
        record: record.trim_end().to_owned(),
    };

    let (open, close) = match (record.find('('), record.rfind(')')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => return Err(parse_error()),
    };
    let name = &record[open + 1..close];

    let mut fields = record[close + 1..].split_whitespace();
    let _state = fields.next().ok_or_else(parse_error)?;
    let parent = fields.next().ok_or_else(parse_error)?;
    if !is_pid(parent) {
        return Err(parse_error());
    }

    Ok(Process::new(pid.clone(), name, ProcessId::from(parent)))
}
