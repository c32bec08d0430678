//! Node chaining and the graph representation (§3 Node and Edge, §4.2).
//!
//! A [`Node`] pairs a [`Processor`] with an [`Edge`] that selects the next `Node`.
//! Graphs are built bottom-up with [`serial_nodes`] for linear chains and the
//! constructors in [`crate::branch`]/[`crate::repeater`] for non-linear control
//! flow, then handed to [`crate::walker::execute`] or [`crate::walker::complete`].

use std::rc::Rc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::Input;
use crate::output::Output;
use crate::usage::UsageBuilder;

/// The accumulator every `Processor::execute` call can append to: shell-executable
/// lines the caller must emit after the command returns, and deferred functions to
/// run once parsing has finished (§3 ExecuteData).
#[derive(Default)]
pub struct ExecuteData {
    /// Shell-executable lines, in the order they should be emitted.
    pub executable: Vec<String>,
    /// Request that the caller wrap `executable`'s lines in a shell function.
    pub function_wrap: bool,
    deferred: Vec<Box<dyn FnMut(&mut dyn Output, &mut Data) -> Result<(), CommandError>>>,
}

impl std::fmt::Debug for ExecuteData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuteData")
            .field("executable", &self.executable)
            .field("function_wrap", &self.function_wrap)
            .field("deferred", &format_args!("[{} deferred fn(s)]", self.deferred.len()))
            .finish()
    }
}

impl ExecuteData {
    pub fn new() -> Self {
        ExecuteData::default()
    }

    /// Queue a function to run, in registration order, after the walk completes
    /// successfully.
    pub fn defer(
        &mut self,
        f: impl FnMut(&mut dyn Output, &mut Data) -> Result<(), CommandError> + 'static,
    ) {
        self.deferred.push(Box::new(f));
    }

    /// Run every deferred function in order, stopping at the first error.
    pub fn run_deferred(
        &mut self,
        output: &mut dyn Output,
        data: &mut Data,
    ) -> Result<(), CommandError> {
        for f in self.deferred.iter_mut() {
            f(output, data)?;
        }
        Ok(())
    }
}

/// A capability a [`Node`] performs while the walker visits it.
pub trait Processor {
    /// Consume/produce tokens, write to `data`, and/or append to `exec`.
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError>;

    /// Offer suggestions for the current cursor position, or `None` to let
    /// traversal continue to the next node.
    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError>;

    /// Append this processor's fragment to a usage synopsis (§4.11). The default
    /// no-op is appropriate for processors with nothing to show the user (e.g.
    /// executable appenders).
    fn usage(&self, _builder: &mut UsageBuilder) {}
}

/// Selects the next [`Node`] a traversal should visit, given the current
/// `Input`/`Data` (§3 Edge).
pub trait Edge {
    /// Returns `None` to terminate the traversal at the current node.
    fn next(&self, input: &mut Input, data: &Data) -> Result<Option<Rc<Node>>, CommandError>;
}

/// An edge that always yields the same fixed successor, used to chain a linear
/// sequence of processors together.
struct SimpleEdge(Rc<Node>);

impl Edge for SimpleEdge {
    fn next(&self, _input: &mut Input, _data: &Data) -> Result<Option<Rc<Node>>, CommandError> {
        Ok(Some(Rc::clone(&self.0)))
    }
}

/// A terminal edge: the traversal ends at this node.
struct NoEdge;

impl Edge for NoEdge {
    fn next(&self, _input: &mut Input, _data: &Data) -> Result<Option<Rc<Node>>, CommandError> {
        Ok(None)
    }
}

/// A unit of the command graph: a `Processor` paired with an `Edge` that chooses
/// what runs next.
pub struct Node {
    pub processor: Box<dyn Processor>,
    pub edge: Box<dyn Edge>,
}

impl Node {
    /// Build a single node with a fixed, explicit edge.
    pub fn new(processor: Box<dyn Processor>, edge: Box<dyn Edge>) -> Rc<Node> {
        Rc::new(Node { processor, edge })
    }

    /// Build a single terminal node (no successor).
    pub fn terminal(processor: Box<dyn Processor>) -> Rc<Node> {
        Node::new(processor, Box::new(NoEdge))
    }
}

/// Chain `processors` into a linear sequence of nodes, each pointing at the next,
/// the last one terminal (§3 `SerialNodes`).
pub fn serial_nodes(mut processors: Vec<Box<dyn Processor>>) -> Rc<Node> {
    assert!(!processors.is_empty(), "serial_nodes requires at least one processor");
    let last = processors.pop().unwrap();
    let mut next = Node::terminal(last);
    while let Some(processor) = processors.pop() {
        next = Node::new(processor, Box::new(SimpleEdge(next)));
    }
    next
}
