//! # command-graph
//!
//! A declarative, graph-based command framework for building terminal CLIs.
//!
//! A command is a graph of [`node::Node`]s, each pairing a [`node::Processor`]
//! (consumes tokens, writes [`data::Data`], appends to [`node::ExecuteData`])
//! with an [`node::Edge`] (chooses the next node). One graph serves both modes a
//! CLI needs:
//!
//! - **Execute** ([`walker::execute`]) runs every processor against real input and
//!   returns the lines the host should hand to the shell.
//! - **Complete** ([`walker::complete`]) runs the same graph against a partial
//!   command line and returns shell-completion suggestions instead of executing.
//!
//! ## Building blocks
//!
//! - [`arg::arg`] / [`arg::list_arg`] — positional, typed arguments.
//! - [`flag::flag`] / [`flag::list_flag`] / [`flag::BoolFlag`] plus
//!   [`flag::FlagProcessor`] — `--name`/`-x` flags, including `-abc` clusters.
//! - [`branch::branch`] — dispatch to one of several successor chains by a
//!   matched keyword.
//! - [`repeater::repeater`] — loop a sub-chain a bounded or unbounded number of
//!   times.
//! - [`special`] — executable-line appenders and `If`/`IfElse`/`IfData`
//!   conditionals.
//! - [`shortcut`] — a CRUD-addressable alias subsystem a [`value::ArgValue`]
//!   argument can expand through before popping its own tokens.
//! - [`completer::Completer`] / [`file_completer::FileCompleter`] — suggestion
//!   sources attached to an argument.
//!
//! [`host::run`] ties a finished graph to `std::env::args()`, exit codes, and
//! structured logging for a process entry point; [`config::Config`] loads the
//! handful of knobs a host may want to override on disk.

pub mod arg;
pub mod branch;
pub mod completer;
pub mod completion;
pub mod config;
pub mod data;
pub mod error;
pub mod file_completer;
pub mod flag;
pub mod host;
pub mod input;
pub mod node;
pub mod output;
pub mod repeater;
pub mod shortcut;
pub mod special;
pub mod usage;
pub mod value;
pub mod walker;

pub use arg::{arg, list_arg, Argument, ArgumentBuilder};
pub use branch::{branch, BranchArm};
pub use completer::{Completer, StaticCompleter};
pub use completion::Completion;
pub use config::Config;
pub use data::Data;
pub use error::CommandError;
pub use file_completer::{file_completer, DirLister, FileCompleter};
pub use flag::{flag, list_flag, BoolFlag, Flag, FlagBuilder, FlagEntry, FlagProcessor};
pub use host::{run, HostServices};
pub use input::{Input, ShortcutLookup};
pub use node::{serial_nodes, Edge, ExecuteData, Node, Processor};
pub use output::{Output, RecordingOutput, StdOutput};
pub use repeater::{repeater, Repeater};
pub use shortcut::{MapShortcutProvider, ShortcutBinding, ShortcutNode, ShortcutOpt, ShortcutProvider};
pub use special::{EchoExecuteData, ExecutableProcessor, If, IfData, IfElse, SimpleExecutableProcessor};
pub use value::ArgValue;
