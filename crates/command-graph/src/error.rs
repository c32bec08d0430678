//! Error types for command graph construction and traversal.
//!
//! This module defines the single error enum that every `Processor` in the crate
//! returns. All errors implement `std::error::Error` via `thiserror`, and are
//! distinguishable by predicate (not by matching on message text) so a host binary
//! can decide an exit code without string-sniffing.
//!
//! # Error Hierarchy
//!
//! ```text
//! CommandError
//! ├── NotEnoughArgs      - argument arity not satisfied
//! ├── ExtraArgs          - input left over after a full traversal
//! ├── Branching          - branch node had no matching key and no default
//! ├── Validation         - a validator rejected a value
//! ├── Transform          - a transformer failed
//! ├── EmptyShortcut      - a shortcut expanded to zero tokens
//! ├── ShortcutCrud       - shortcut add/delete/get/search command failed
//! ├── FlagAlreadySet     - a non-multi flag was passed more than once
//! ├── FlagConflict       - a multi-flag token mixed combinable and non-combinable flags
//! ├── Config             - on-disk configuration was malformed
//! └── Internal           - value-operator, I/O, or regex-compile failure
//! ```
//!
//! Usage-class errors (the first six variants) are surfaced to the user as-is;
//! `Internal` is reserved for failures that indicate a bug in the host's node graph
//! or its environment, not a user typo.

use thiserror::Error;

/// A single error type threaded through every `Processor::execute` and
/// `Processor::complete` call in the crate.
///
/// # Example
///
/// ```
/// use command_graph::error::CommandError;
///
/// let err = CommandError::NotEnoughArgs {
///     name: "sl".to_string(),
///     min: 2,
///     got: 1,
/// };
/// assert!(err.is_usage_error());
/// assert_eq!(
///     format!("{}", err),
///     "Argument \"sl\" requires at least 2 value(s), got 1"
/// );
/// ```
#[derive(Debug, Error)]
pub enum CommandError {
    /// An argument node did not receive enough tokens to satisfy its minimum arity.
    #[error("Argument \"{name}\" requires at least {min} value(s), got {got}")]
    NotEnoughArgs {
        /// Name of the underrun argument.
        name: String,
        /// Minimum arity required.
        min: usize,
        /// Number of tokens actually available.
        got: usize,
    },

    /// The walker reached the end of the node graph with unconsumed input tokens.
    #[error("Unprocessed extra arguments: {0:?}")]
    ExtraArgs(Vec<String>),

    /// A branch node's next token matched none of its keys or synonyms, and it has
    /// no default branch.
    #[error("Branching argument must be one of [{}]", .0.join(", "))]
    Branching(Vec<String>),

    /// A validator rejected an already-converted value.
    #[error("Validation failed for \"{name}\": {reason}")]
    Validation {
        /// Name of the argument being validated.
        name: String,
        /// Why the validator rejected the value.
        reason: String,
    },

    /// A transformer returned an error while post-processing a converted value.
    #[error("Custom transformer failed: {0}")]
    Transform(String),

    /// A shortcut key expanded to an empty token list.
    #[error("shortcut has empty value")]
    EmptyShortcut,

    /// One of the shortcut CRUD commands (`a`, `d`, `g`, `l`, `s`) failed outright.
    #[error("{0}")]
    ShortcutCrud(String),

    /// A flag without `AllowsMultiple` was supplied more than once.
    #[error("Flag {0} has already been set")]
    FlagAlreadySet(String),

    /// A multi-flag token (`-abc`) mixed letters that belong to combinable flags
    /// with letters that do not.
    #[error("Either all or no flags in a multi-flag object must be relevant: {0}")]
    FlagConflict(String),

    /// The on-disk configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A failure internal to the crate or its environment: a value operator could
    /// not parse a token, a regex failed to compile, or an I/O call failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Whether this error should be reported to the user as a usage mistake
    /// (non-zero but "small" exit code) rather than an internal failure.
    ///
    /// The host runtime (§4.9) uses this to choose between the "usage error" and
    /// "internal error" exit codes without inspecting the error's message.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            CommandError::NotEnoughArgs { .. }
                | CommandError::ExtraArgs(_)
                | CommandError::Branching(_)
                | CommandError::Validation { .. }
                | CommandError::Transform(_)
                | CommandError::EmptyShortcut
                | CommandError::ShortcutCrud(_)
                | CommandError::FlagAlreadySet(_)
                | CommandError::FlagConflict(_)
        )
    }
}

impl From<regex::Error> for CommandError {
    fn from(err: regex::Error) -> Self {
        CommandError::Internal(format!("invalid regex: {err}"))
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_are_distinguishable_by_predicate() {
        assert!(CommandError::NotEnoughArgs {
            name: "x".into(),
            min: 1,
            got: 0
        }
        .is_usage_error());
        assert!(!CommandError::Internal("boom".into()).is_usage_error());
    }

    #[test]
    fn branching_error_lists_sorted_names() {
        let err = CommandError::Branching(vec!["add".into(), "get".into()]);
        assert_eq!(
            format!("{err}"),
            "Branching argument must be one of [add, get]"
        );
    }
}
