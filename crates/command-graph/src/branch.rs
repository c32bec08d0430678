//! Key-dispatched branching between successor nodes (§4.5).
//!
//! Unlike every other processor in this crate, a branch's successor isn't fixed
//! at graph-construction time — it depends on the token the branch itself pops.
//! [`branch`] wires a [`BranchProcessor`] and a [`BranchEdge`] together through a
//! shared `Rc<RefCell<Option<Rc<Node>>>>` cell: the processor decides and writes,
//! the edge reads.

use std::cell::RefCell;
use std::rc::Rc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::Input;
use crate::node::{Edge, ExecuteData, Node, Processor};
use crate::output::Output;
use crate::usage::UsageBuilder;

type Selection = Rc<RefCell<Option<Rc<Node>>>>;

/// One branch arm: a canonical key, any number of synonyms, and the node to
/// select when either matches.
pub struct BranchArm {
    key: String,
    synonyms: Vec<String>,
    target: Rc<Node>,
}

impl BranchArm {
    pub fn new(key: impl Into<String>, target: Rc<Node>) -> Self {
        BranchArm {
            key: key.into(),
            synonyms: Vec::new(),
            target,
        }
    }

    pub fn synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }

    fn matches(&self, token: &str) -> bool {
        self.key == token || self.synonyms.iter().any(|s| s == token)
    }
}

/// Build a branch node: peeks the next token, matches it against `arms`'
/// keys/synonyms, and routes to the matching arm's target, a supplied
/// `default`, or a [`CommandError::Branching`] if neither matches.
pub fn branch(arms: Vec<BranchArm>, default: Option<Rc<Node>>) -> Rc<Node> {
    let selection: Selection = Rc::new(RefCell::new(None));
    let processor = BranchProcessor {
        arms,
        default,
        selection: Rc::clone(&selection),
    };
    let edge = BranchEdge { selection };
    Node::new(Box::new(processor), Box::new(edge))
}

struct BranchProcessor {
    arms: Vec<BranchArm>,
    default: Option<Rc<Node>>,
    selection: Selection,
}

impl BranchProcessor {
    fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.arms.iter().map(|a| a.key.clone()).collect();
        names.sort();
        names
    }

    fn find(&self, token: &str) -> Option<&BranchArm> {
        self.arms.iter().find(|arm| arm.matches(token))
    }
}

impl Processor for BranchProcessor {
    fn execute(
        &self,
        input: &mut Input,
        _output: &mut dyn Output,
        _data: &mut Data,
        _exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        let token = input.peek().map(str::to_string);
        let matched = token.as_deref().and_then(|t| self.find(t));
        if let Some(arm) = matched {
            input.pop()?;
            *self.selection.borrow_mut() = Some(Rc::clone(&arm.target));
            return Ok(());
        }
        match &self.default {
            Some(default) => {
                *self.selection.borrow_mut() = Some(Rc::clone(default));
                Ok(())
            }
            None => Err(CommandError::Branching(self.sorted_names())),
        }
    }

    fn complete(&self, input: &mut Input, _data: &mut Data) -> Result<Option<Completion>, CommandError> {
        let Some(token) = input.peek().map(str::to_string) else {
            return Ok(Some(Completion::new(self.sorted_names())));
        };
        if let Some(arm) = self.find(&token) {
            input.pop()?;
            *self.selection.borrow_mut() = Some(Rc::clone(&arm.target));
            return Ok(None);
        }
        if input.len() == 1 {
            return Ok(Some(Completion::new(self.sorted_names())));
        }
        match &self.default {
            Some(default) => {
                *self.selection.borrow_mut() = Some(Rc::clone(default));
                Ok(None)
            }
            None => Ok(Some(Completion::empty())),
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        builder.push_synopsis(format!("{{{}}}", self.sorted_names().join("|")));
    }
}

struct BranchEdge {
    selection: Selection,
}

impl Edge for BranchEdge {
    fn next(&self, _input: &mut Input, _data: &Data) -> Result<Option<Rc<Node>>, CommandError> {
        Ok(self.selection.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::arg;
    use crate::node::serial_nodes;
    use crate::output::RecordingOutput;
    use crate::walker;

    fn leaf(name: &'static str) -> Rc<Node> {
        serial_nodes(vec![Box::new(arg::<String>(name, "").build())])
    }

    #[test]
    fn matching_key_selects_and_pops_its_arm() {
        let root = branch(
            vec![BranchArm::new("add", leaf("added")), BranchArm::new("get", leaf("got"))],
            None,
        );
        let mut input = Input::new(["get", "value"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        walker::execute(root, &mut input, &mut output, &mut data).unwrap();
        assert_eq!(data.get::<String>("got"), Some(&"value".to_string()));
    }

    #[test]
    fn synonym_matches_same_arm_as_its_key() {
        let root = branch(vec![BranchArm::new("add", leaf("x")).synonym("a")], None);
        let mut input = Input::new(["a", "value"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        walker::execute(root, &mut input, &mut output, &mut data).unwrap();
        assert_eq!(data.get::<String>("x"), Some(&"value".to_string()));
    }

    #[test]
    fn unmatched_token_without_default_is_a_branching_error() {
        let root = branch(vec![BranchArm::new("add", leaf("x"))], None);
        let mut input = Input::new(["delete"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let err = walker::execute(root, &mut input, &mut output, &mut data).unwrap_err();
        assert!(matches!(err, CommandError::Branching(names) if names == vec!["add".to_string()]));
    }

    #[test]
    fn unmatched_token_falls_through_to_default_without_popping() {
        let root = branch(vec![BranchArm::new("add", leaf("x"))], Some(leaf("fallback")));
        let mut input = Input::new(["value"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        walker::execute(root, &mut input, &mut output, &mut data).unwrap();
        assert_eq!(data.get::<String>("fallback"), Some(&"value".to_string()));
    }
}
