//! The shortcut/alias subsystem: in-line macro expansion plus CRUD commands
//! (§4.6).
//!
//! A shortcut provider owns a two-level map `namespace -> (key -> tokens)`. This
//! crate never persists that map itself (§6): a host wraps its own storage in a
//! [`ShortcutProvider`] impl and is responsible for writing it back out whenever
//! [`ShortcutProvider::changed`] is `true`.
//!
//! Two entry points consume a provider:
//!
//! - [`ShortcutNode`] is a host `Processor`: its first token is a CRUD command
//!   letter (`a`/`d`/`g`/`l`/`s`), or it falls through to a child node.
//! - [`ShortcutOpt`] attaches to an [`crate::arg::Argument`] so that argument's
//!   own `Execute`/`Complete` calls `Input::check_shortcuts` before popping.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::{Input, ShortcutLookup};
use crate::node::{ExecuteData, Node, Processor};
use crate::output::Output;
use crate::usage::UsageBuilder;

/// The reserved CRUD command letters (§4.6, §6). A shortcut namespace's keys must
/// not collide with these.
pub const RESERVED_COMMANDS: [&str; 5] = ["a", "d", "g", "l", "s"];

/// A namespaced shortcut map plus a dirty flag, mutated in place by the CRUD
/// commands and persisted by the host (§6's "Shortcut provider" contract).
pub trait ShortcutProvider {
    /// The full `namespace -> key -> tokens` map.
    fn shortcut_map(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>>;

    /// Mutable access, used by the CRUD commands.
    fn shortcut_map_mut(&mut self) -> &mut BTreeMap<String, BTreeMap<String, Vec<String>>>;

    /// Flag the map as having been mutated since the last persist.
    fn mark_changed(&mut self);

    /// Whether the map has been mutated since the last persist.
    fn changed(&self) -> bool;

    /// Look up `token` as a shortcut key under `namespace`.
    fn lookup(&self, namespace: &str, token: &str) -> Option<Vec<String>> {
        self.shortcut_map()
            .get(namespace)
            .and_then(|ns| ns.get(token))
            .cloned()
    }
}

impl ShortcutLookup for dyn ShortcutProvider {
    fn lookup(&self, namespace: &str, token: &str) -> Option<Vec<String>> {
        ShortcutProvider::lookup(self, namespace, token)
    }
}

/// A simple in-memory [`ShortcutProvider`], suitable for tests and for hosts that
/// serialize the whole map to a single file.
#[derive(Debug, Default)]
pub struct MapShortcutProvider {
    map: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    changed: bool,
}

impl MapShortcutProvider {
    pub fn new() -> Self {
        MapShortcutProvider::default()
    }

    /// Seed the provider from an existing map, e.g. one deserialized from disk.
    pub fn from_map(map: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Self {
        MapShortcutProvider { map, changed: false }
    }
}

impl ShortcutProvider for MapShortcutProvider {
    fn shortcut_map(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.map
    }

    fn shortcut_map_mut(&mut self) -> &mut BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &mut self.map
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn changed(&self) -> bool {
        self.changed
    }
}

/// A namespace plus a shared handle to the provider backing it, attached either to
/// a [`ShortcutNode`] or a [`ShortcutOpt`].
#[derive(Clone)]
pub struct ShortcutBinding {
    pub namespace: String,
    pub provider: Rc<RefCell<dyn ShortcutProvider>>,
}

impl ShortcutBinding {
    pub fn new(namespace: impl Into<String>, provider: Rc<RefCell<dyn ShortcutProvider>>) -> Self {
        ShortcutBinding {
            namespace: namespace.into(),
            provider,
        }
    }
}

/// An [`crate::arg::Argument`] option: expand shortcuts over the next
/// `min_n + optional_n` tokens before popping (§4.6 point 2).
pub type ShortcutOpt = ShortcutBinding;

/// A host processor implementing the shortcut CRUD commands, falling through to
/// `child` when the next token is not one of `a`/`d`/`g`/`l`/`s` (§4.6 point 1).
pub struct ShortcutNode {
    binding: ShortcutBinding,
    child: Rc<Node>,
}

impl ShortcutNode {
    pub fn new(namespace: impl Into<String>, provider: Rc<RefCell<dyn ShortcutProvider>>, child: Rc<Node>) -> Self {
        ShortcutNode {
            binding: ShortcutBinding::new(namespace, provider),
            child,
        }
    }
}

impl Processor for ShortcutNode {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        let Some(command) = input.peek().map(str::to_string) else {
            return run_child(&self.child, input, output, data, exec);
        };
        match command.as_str() {
            "a" => {
                input.pop()?;
                add(&self.binding, input, output, data, exec, &self.child)
            }
            "d" => {
                input.pop()?;
                delete(&self.binding, input, output)
            }
            "g" => {
                input.pop()?;
                get(&self.binding, input, output)
            }
            "l" => {
                input.pop()?;
                list(&self.binding, output)
            }
            "s" => {
                input.pop()?;
                search(&self.binding, input, output)
            }
            _ => run_child(&self.child, input, output, data, exec),
        }
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        // CRUD sub-commands are out of scope for completion; only the fall-through
        // child offers suggestions.
        match input.peek() {
            Some(cmd) if RESERVED_COMMANDS.contains(&cmd) => Ok(None),
            _ => self.child.processor.complete(input, data),
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        self.child.processor.usage(builder);
    }
}

fn run_child(
    child: &Rc<Node>,
    input: &mut Input,
    output: &mut dyn Output,
    data: &mut Data,
    exec: &mut ExecuteData,
) -> Result<(), CommandError> {
    child.processor.execute(input, output, data, exec)
}

fn add(
    binding: &ShortcutBinding,
    input: &mut Input,
    output: &mut dyn Output,
    data: &mut Data,
    exec: &mut ExecuteData,
    child: &Rc<Node>,
) -> Result<(), CommandError> {
    let name_handle = input.pop().map_err(|_| {
        CommandError::ShortcutCrud("shortcut add requires a name".to_string())
    })?;
    let name = input.token(name_handle).to_string();
    if name.is_empty() {
        return Err(CommandError::ShortcutCrud("shortcut name must not be empty".to_string()));
    }
    if RESERVED_COMMANDS.contains(&name.as_str()) {
        return Err(CommandError::ShortcutCrud(format!(
            "shortcut name \"{name}\" is reserved"
        )));
    }
    {
        let provider = binding.provider.borrow();
        if provider
            .shortcut_map()
            .get(&binding.namespace)
            .is_some_and(|ns| ns.contains_key(&name))
        {
            return Err(CommandError::ShortcutCrud(format!(
                "shortcut \"{name}\" already exists"
            )));
        }
    }
    // Run the child node over the remaining tokens so they are validated and
    // transformed exactly as if the user had typed them directly. Handles stay
    // resolvable after their tokens are popped, so once the child has run we
    // read back the (possibly transformed) form rather than the pre-run tokens.
    let handles = input.remaining_handles();
    run_child(child, input, output, data, exec)?;
    let values: Vec<String> = handles.iter().map(|h| input.token(*h).to_string()).collect();
    let mut provider = binding.provider.borrow_mut();
    tracing::info!(namespace = %binding.namespace, %name, ?values, "shortcut: add");
    provider
        .shortcut_map_mut()
        .entry(binding.namespace.clone())
        .or_default()
        .insert(name, values);
    provider.mark_changed();
    Ok(())
}

fn delete(binding: &ShortcutBinding, input: &mut Input, output: &mut dyn Output) -> Result<(), CommandError> {
    let mut provider = binding.provider.borrow_mut();
    let Some(ns) = provider.shortcut_map_mut().get_mut(&binding.namespace) else {
        return Err(CommandError::ShortcutCrud(format!(
            "shortcut namespace \"{}\" does not exist",
            binding.namespace
        )));
    };
    let mut changed = false;
    for name in input.remaining_tokens() {
        if ns.remove(&name).is_some() {
            tracing::info!(namespace = %binding.namespace, %name, "shortcut: delete");
            changed = true;
        } else {
            output.stderr(&format!("shortcut \"{name}\" does not exist"));
        }
    }
    while input.pop().is_ok() {}
    if changed {
        provider.mark_changed();
    }
    Ok(())
}

fn get(binding: &ShortcutBinding, input: &mut Input, output: &mut dyn Output) -> Result<(), CommandError> {
    let provider = binding.provider.borrow();
    let Some(ns) = provider.shortcut_map().get(&binding.namespace) else {
        return Err(CommandError::ShortcutCrud(format!(
            "shortcut namespace \"{}\" does not exist",
            binding.namespace
        )));
    };
    for name in input.remaining_tokens() {
        match ns.get(&name) {
            Some(values) => output.stdout(&format!("{name}: {}", values.join(" "))),
            None => output.stderr(&format!("shortcut \"{name}\" does not exist")),
        }
    }
    while input.pop().is_ok() {}
    Ok(())
}

fn list(binding: &ShortcutBinding, output: &mut dyn Output) -> Result<(), CommandError> {
    let provider = binding.provider.borrow();
    if let Some(ns) = provider.shortcut_map().get(&binding.namespace) {
        for (name, values) in ns {
            output.stdout(&format!("{name}: {}", values.join(" ")));
        }
    }
    Ok(())
}

fn search(binding: &ShortcutBinding, input: &mut Input, output: &mut dyn Output) -> Result<(), CommandError> {
    let patterns: Vec<regex::Regex> = input
        .remaining_tokens()
        .iter()
        .map(|p| regex::Regex::new(p).map_err(CommandError::from))
        .collect::<Result<_, _>>()?;
    while input.pop().is_ok() {}
    let provider = binding.provider.borrow();
    if let Some(ns) = provider.shortcut_map().get(&binding.namespace) {
        for (name, values) in ns {
            let line = format!("{name}: {}", values.join(" "));
            if patterns.iter().all(|re| re.is_match(&line)) {
                output.stdout(&line);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::list_arg;
    use crate::node::serial_nodes;
    use crate::output::RecordingOutput;

    fn provider() -> Rc<RefCell<dyn ShortcutProvider>> {
        Rc::new(RefCell::new(MapShortcutProvider::new()))
    }

    #[test]
    fn falls_through_to_child_when_first_token_is_not_a_crud_command() {
        let provider = provider();
        let child = serial_nodes(vec![Box::new(list_arg::<Vec<String>>("sl", "", 1, Input::UNBOUNDED).build())]);
        let node = ShortcutNode::new("ns", Rc::clone(&provider), child);
        let mut input = Input::new(["grizzly", "teddy"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        node.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(
            data.get::<Vec<String>>("sl"),
            Some(&vec!["grizzly".to_string(), "teddy".to_string()])
        );
    }

    #[test]
    fn add_command_rejects_reserved_and_duplicate_names() {
        let provider = provider();
        let child = serial_nodes(vec![Box::new(list_arg::<Vec<String>>("sl", "", 0, Input::UNBOUNDED).build())]);
        let node = ShortcutNode::new("ns", Rc::clone(&provider), child);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();

        let mut input = Input::new(["a", "l", "x"]);
        let err = node.execute(&mut input, &mut output, &mut data, &mut exec).unwrap_err();
        assert!(matches!(err, CommandError::ShortcutCrud(_)));
    }

    #[test]
    fn add_command_stores_transformed_values_and_marks_changed() {
        // §8 scenario 3.
        let provider = provider();
        let child = serial_nodes(vec![Box::new(list_arg::<Vec<String>>("sl", "", 0, Input::UNBOUNDED).build())]);
        let node = ShortcutNode::new("ns", Rc::clone(&provider), child);
        let mut input = Input::new(["a", "bearMin", "grizzly", "teddy", "brown"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        node.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();

        let p = provider.borrow();
        assert_eq!(
            p.shortcut_map().get("ns").unwrap().get("bearMin").unwrap(),
            &vec!["grizzly".to_string(), "teddy".to_string(), "brown".to_string()]
        );
        assert!(p.changed());
    }

    #[test]
    fn add_command_stores_the_childs_transformed_form_not_the_raw_tokens() {
        // §4.6 point 1: "runs the child node on the values to validate/transform
        // them before storing the transformed form."
        use crate::arg::list_arg;
        let provider = provider();
        let child = serial_nodes(vec![Box::new(
            list_arg::<Vec<String>>("sl", "", 0, Input::UNBOUNDED)
                .transformer(|v: Vec<String>| Ok(v.into_iter().map(|s| s.to_uppercase()).collect()))
                .build(),
        )]);
        let node = ShortcutNode::new("ns", Rc::clone(&provider), child);
        let mut input = Input::new(["a", "shout", "grizzly", "teddy"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        node.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();

        let p = provider.borrow();
        assert_eq!(
            p.shortcut_map().get("ns").unwrap().get("shout").unwrap(),
            &vec!["GRIZZLY".to_string(), "TEDDY".to_string()]
        );
    }

    #[test]
    fn delete_warns_on_missing_keys_without_failing() {
        let provider = provider();
        {
            let mut p = provider.borrow_mut();
            p.shortcut_map_mut().entry("ns".into()).or_default().insert("t".into(), vec!["x".into()]);
        }
        let child = serial_nodes(vec![Box::new(list_arg::<Vec<String>>("sl", "", 0, Input::UNBOUNDED).build())]);
        let node = ShortcutNode::new("ns", Rc::clone(&provider), child);
        let mut input = Input::new(["d", "t", "missing"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        node.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(output.stderr_lines, vec!["shortcut \"missing\" does not exist"]);
        assert!(!provider.borrow().shortcut_map().get("ns").unwrap().contains_key("t"));
    }
}
