use std::fmt::{self, Write};

use crate::error::{Error, Result};
use crate::process::{ProcessTree, ROOT_PID};

/// Render the subtree of `start` depth-first, one `name (pid)` line per process.
///
/// Each line is indented by one space per level, starting at `depth` spaces. Children are
/// visited in the order stored in the tree.
pub fn render(tree: &ProcessTree, start: &str, depth: usize) -> Result<String> {
    let Some(first) = tree.get(start) else {
        return Err(Error::NotFound { pid: start.into() });
    };

    let mut output = String::new();
    let mut stack = vec![(first, depth)];
    while let Some((process, depth)) = stack.pop() {
        // Writing into a String cannot fail
        let _ = writeln!(output, "{:depth$}{} ({})", "", process.name, process.id);

        // Reversed so that the first child is popped first
        stack.extend(
            process
                .children
                .iter()
                .rev()
                .filter_map(|child| tree.get(child.as_str()))
                .map(|child| (child, depth + 1)),
        );
    }

    Ok(output)
}

/// Render the whole tree, from the synthetic root
pub fn render_tree(tree: &ProcessTree) -> Result<String> {
    render(tree, ROOT_PID, 0)
}

impl fmt::Display for ProcessTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = render_tree(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
