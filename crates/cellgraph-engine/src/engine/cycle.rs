//! Recalculation order with circular dependency detection.
//!
//! When a cell changes, it and everything that (transitively) depends on it
//! must be re-evaluated, each cell only after all of its dependees. This is a
//! depth-first walk along the "is depended on by" edges, emitting cells in
//! reverse postorder. A cell reached again while its own walk is still in
//! progress closes a cycle, and the whole computation is abandoned.
//!
//! The walk keeps an explicit stack, so long dependency chains cannot
//! overflow the call stack, and each cell is expanded at most once.

use std::collections::HashMap;

use thiserror::Error;

use super::graph::DependencyGraph;

/// A cycle passes through `cell`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("circular dependency detected at '{cell}'")]
pub struct CycleError {
    pub cell: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame {
    name: String,
    pending: Vec<String>,
}

impl Frame {
    fn new(graph: &DependencyGraph, name: String) -> Frame {
        let mut pending: Vec<String> = graph.iter_dependents(&name).map(str::to_string).collect();
        // Popped from the back, so dependents are visited in ascending order.
        pending.sort_unstable_by(|a, b| b.cmp(a));
        Frame { name, pending }
    }
}

/// Order in which `root` and every cell depending on it must be recalculated.
/// `root` is always first.
pub fn cells_to_recalculate(
    graph: &DependencyGraph,
    root: &str,
) -> Result<Vec<String>, CycleError> {
    recalculation_order(graph, [root])
}

/// Order in which every cell in `roots`, and every cell depending on one of
/// them, must be recalculated. Each cell appears once, after all of its
/// dependees that are also in the list.
pub fn recalculation_order<'a, I>(
    graph: &DependencyGraph,
    roots: I,
) -> Result<Vec<String>, CycleError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut postorder = Vec::new();

    for root in roots {
        visit(graph, root, &mut marks, &mut postorder)?;
    }

    postorder.reverse();
    Ok(postorder)
}

fn visit(
    graph: &DependencyGraph,
    root: &str,
    marks: &mut HashMap<String, Mark>,
    postorder: &mut Vec<String>,
) -> Result<(), CycleError> {
    if marks.contains_key(root) {
        return Ok(());
    }
    marks.insert(root.to_string(), Mark::InProgress);
    let mut stack = vec![Frame::new(graph, root.to_string())];

    while let Some(frame) = stack.last_mut() {
        match frame.pending.pop() {
            Some(next) => match marks.get(&next).copied() {
                Some(Mark::InProgress) => return Err(CycleError { cell: next }),
                Some(Mark::Done) => {}
                None => {
                    marks.insert(next.clone(), Mark::InProgress);
                    stack.push(Frame::new(graph, next));
                }
            },
            None => {
                let name = std::mem::take(&mut frame.name);
                stack.pop();
                marks.insert(name.clone(), Mark::Done);
                postorder.push(name);
            }
        }
    }

    Ok(())
}
