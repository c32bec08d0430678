//! `cmdgraph`: a demo host binary wiring a small command graph to
//! `command_graph::host::run`.
//!
//! ```text
//! cmdgraph [a|d|g|l|s ...] NAME [--loud/-l]
//! ```
//!
//! `NAME` is shortcut-expandable under the `greet` namespace, so
//! `cmdgraph a friend alice` remembers `alice` under the key `friend`, and a
//! later `cmdgraph friend` expands back to `alice`.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use command_graph::{
    arg, host, serial_nodes, BoolFlag, Config, Data, ExecutableProcessor, ExecuteData, FlagProcessor,
    HostServices, MapShortcutProvider, Node, ShortcutBinding, ShortcutNode,
};

/// Flags the host binary itself understands, ahead of the command graph's own
/// argument nodes (§4.9/§4.10 — separate from what the graph parses).
#[derive(Parser)]
#[command(name = "cmdgraph", about = "Demo host binary for command-graph")]
struct HostArgs {
    /// Override the on-disk configuration file path for this invocation.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tokens handed to the command graph itself.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

fn build_root() -> Rc<Node> {
    let provider: Rc<RefCell<dyn command_graph::ShortcutProvider>> =
        Rc::new(RefCell::new(MapShortcutProvider::new()));
    let binding = ShortcutBinding::new("greet", provider.clone());

    let name_arg = arg::<String>("name", "who to greet").shortcut(binding).build();

    let greeting = ExecutableProcessor::new(|data: &Data| {
        let name = data.get::<String>("name").cloned().unwrap_or_default();
        let loud = data.get::<bool>("loud").copied().unwrap_or(false);
        let line = if loud {
            format!("echo \"HELLO, {}!\"", name.to_uppercase())
        } else {
            format!("echo \"Hello, {name}.\"")
        };
        Ok(vec![line])
    });

    let flags = FlagProcessor::new(vec![Box::new(BoolFlag::new("loud", Some('l'), "greet loudly"))]);

    let greet = serial_nodes(vec![Box::new(flags), Box::new(name_arg), Box::new(greeting)]);

    Node::new(Box::new(ShortcutNode::new("greet", provider, greet)), Box::new(TerminalEdge))
}

struct TerminalEdge;

impl command_graph::Edge for TerminalEdge {
    fn next(
        &self,
        _input: &mut command_graph::Input,
        _data: &Data,
    ) -> Result<Option<Rc<Node>>, command_graph::CommandError> {
        Ok(None)
    }
}

fn main() {
    let host_args = HostArgs::parse();
    if let Some(path) = &host_args.config {
        std::env::set_var(command_graph::config::CONFIG_PATH_ENV, path);
    }

    let config = Config::load(&|key| std::env::var(key).ok()).unwrap_or_else(|err| {
        eprintln!("invalid configuration: {err}");
        std::process::exit(host::EXIT_INTERNAL_ERROR);
    });
    if config.debug {
        std::env::set_var(host::DEBUG_ENV, "1");
    }

    let root = build_root();
    let rest = host_args.rest;
    let services = HostServices {
        args: Box::new(move || rest.clone()),
        ..HostServices::real()
    };
    let code = host::run(root, &services);
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_graph::{Input, RecordingOutput};

    #[test]
    fn greets_by_default() {
        let root = build_root();
        let mut input = Input::new(["alice"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let exec: ExecuteData = command_graph::walker::execute(root, &mut input, &mut output, &mut data).unwrap();
        assert_eq!(exec.executable, vec!["echo \"Hello, alice.\""]);
    }
}
