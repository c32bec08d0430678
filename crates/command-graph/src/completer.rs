//! Suggestion sources attached to an argument (§4.7).
//!
//! A [`Completer`] turns the value an argument is mid-typing (plus the current
//! `Data`) into a [`Completion`]. [`crate::file_completer`] builds on this for
//! filesystem-backed suggestions.

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;

/// Produces suggestions for an argument of value type `T`.
pub trait Completer<T> {
    fn complete(&self, value: &T, data: &Data) -> Result<Completion, CommandError>;
}

impl<T, F> Completer<T> for F
where
    F: Fn(&T, &Data) -> Result<Completion, CommandError>,
{
    fn complete(&self, value: &T, data: &Data) -> Result<Completion, CommandError> {
        self(value, data)
    }
}

/// A completer that offers a fixed list of suggestions regardless of the value
/// currently being typed.
pub struct StaticCompleter {
    suggestions: Vec<String>,
}

impl StaticCompleter {
    pub fn new(suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        StaticCompleter {
            suggestions: suggestions.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T> Completer<T> for StaticCompleter {
    fn complete(&self, _value: &T, _data: &Data) -> Result<Completion, CommandError> {
        Ok(Completion::new(self.suggestions.clone()))
    }
}
