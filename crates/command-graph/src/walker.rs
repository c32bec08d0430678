//! The unified execute/complete graph traversal (§4.2).
//!
//! Both entry points share one shape: visit the current node's `Processor`,
//! consult its `Edge` for the next node, repeat. They differ only in what the
//! processor call does (write to `Output` vs. return a `Completion`) and in what
//! "done" means (fully-processed input vs. a non-empty `Completion`).

use std::rc::Rc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::Input;
use crate::node::{ExecuteData, Node};
use crate::output::Output;

/// Walk `root` to completion in Execute mode: run every processor, follow edges,
/// and fail if input remains unconsumed once the walk terminates.
///
/// This is the first of the two ways §4.2 differs from Complete: Execute writes to
/// `output` and the end-of-walk check for `ExtraArgs` only fires when the input is
/// not fully processed.
pub fn execute(
    root: Rc<Node>,
    input: &mut Input,
    output: &mut dyn Output,
    data: &mut Data,
) -> Result<ExecuteData, CommandError> {
    tracing::debug!(tokens = ?input.remaining_tokens(), "walker: starting execute traversal");
    let mut exec = ExecuteData::new();
    let mut current = Some(root);
    while let Some(node) = current {
        node.processor.execute(input, output, data, &mut exec)?;
        current = node.edge.next(input, data)?;
    }
    if !input.fully_processed() {
        let extra = input.remaining_tokens();
        tracing::warn!(?extra, "walker: input not fully consumed");
        return Err(CommandError::ExtraArgs(extra));
    }
    Ok(exec)
}

/// Walk `root` in Complete mode: run every processor's `complete` hook until one
/// returns a non-`None` `Completion`, or the walk terminates with nothing left to
/// suggest (in which case an empty `Completion` is returned, per §4.2).
pub fn complete(root: Rc<Node>, input: &mut Input, data: &mut Data) -> Result<Completion, CommandError> {
    let mut current = Some(root);
    while let Some(node) = current {
        if let Some(completion) = node.processor.complete(input, data)? {
            return Ok(completion);
        }
        current = node.edge.next(input, data)?;
    }
    Ok(Completion::empty())
}
