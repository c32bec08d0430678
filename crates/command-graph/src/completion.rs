//! Suggestion sets and their filtering/formatting rules (§3 Completion, §4.7).

/// A candidate suggestion set returned by a `Processor::complete` call or by a
/// [`crate::completer::Completer`].
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// The raw suggestion strings, before filtering/sorting/escaping.
    pub suggestions: Vec<String>,
    /// Skip the "must have the current last token as a prefix" filter.
    pub ignore_filter: bool,
    /// Append a literal single-space sentinel so the shell does not auto-fill past
    /// the common prefix (used when suggestions are ambiguous base names).
    pub dont_complete: bool,
    /// Compare the prefix filter case-insensitively.
    pub case_insensitive: bool,
    /// Sort suggestions case-insensitively.
    pub case_insensitive_sort: bool,
    /// De-duplicate against values already present in the argument's parsed list.
    pub distinct: bool,
}

impl Completion {
    /// A completion with no suggestions, signaling "traversal terminates here."
    pub fn empty() -> Self {
        Completion::default()
    }

    /// Build a completion from a list of suggestion strings.
    pub fn new(suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Completion {
            suggestions: suggestions.into_iter().map(Into::into).collect(),
            ..Completion::default()
        }
    }

    pub fn ignore_filter(mut self, value: bool) -> Self {
        self.ignore_filter = value;
        self
    }

    pub fn dont_complete(mut self, value: bool) -> Self {
        self.dont_complete = value;
        self
    }

    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }

    pub fn case_insensitive_sort(mut self, value: bool) -> Self {
        self.case_insensitive_sort = value;
        self
    }

    pub fn distinct(mut self, value: bool) -> Self {
        self.distinct = value;
        self
    }

    /// Apply filtering, sorting, de-duplication, and shell-escaping to produce the
    /// final lines the host should print, one suggestion per line, per §6's
    /// "Suggestion output format."
    ///
    /// `last_token` is the (possibly partial) token currently being typed.
    /// `already_parsed` is consulted only when `distinct` is set.
    pub fn render(
        &self,
        last_token: &str,
        delimiter: Option<char>,
        already_parsed: &[String],
    ) -> Vec<String> {
        let mut suggestions: Vec<String> = self.suggestions.clone();

        if self.distinct {
            suggestions.retain(|s| !already_parsed.iter().any(|p| p == s));
        }

        if !self.ignore_filter {
            suggestions.retain(|s| {
                if self.case_insensitive {
                    s.to_lowercase().starts_with(&last_token.to_lowercase())
                } else {
                    s.starts_with(last_token)
                }
            });
        }

        if self.case_insensitive_sort {
            suggestions.sort_by_key(|s| s.to_lowercase());
        } else {
            suggestions.sort();
        }
        suggestions.dedup();

        let mut rendered: Vec<String> = suggestions.iter().map(|s| escape(s, delimiter)).collect();

        if self.dont_complete {
            rendered.push(" ".to_string());
        }

        rendered
    }
}

/// Escape a suggestion containing whitespace: wrap it in the active quotation
/// delimiter if one is set, otherwise backslash-escape each space.
fn escape(suggestion: &str, delimiter: Option<char>) -> String {
    if !suggestion.contains(' ') {
        return suggestion.to_string();
    }
    match delimiter {
        Some(d) => format!("{d}{suggestion}{d}"),
        None => suggestion.replace(' ', "\\ "),
    }
}
