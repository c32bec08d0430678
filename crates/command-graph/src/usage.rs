//! A thin usage-synopsis accumulator.
//!
//! Full usage-document layout (column alignment, wrapping, section headers) is out
//! of core scope (§1, §4.11); this module ships only what a Processor needs to
//! describe its own fragment of the command line, and a builder that stitches
//! those fragments into a one-line synopsis plus a longer per-argument list. A
//! host that wants a polished `--help` output builds its own renderer on top of
//! this.

/// Accumulates usage fragments as the graph walker's sibling traversal visits each
/// `Processor::usage` in turn.
#[derive(Debug, Default, Clone)]
pub struct UsageBuilder {
    synopsis: Vec<String>,
    descriptions: Vec<(String, String)>,
}

impl UsageBuilder {
    pub fn new() -> Self {
        UsageBuilder::default()
    }

    /// Append a token (e.g. `sl [sl...]`, `--verbose`, `{add|delete}`) to the
    /// one-line synopsis.
    pub fn push_synopsis(&mut self, fragment: impl Into<String>) {
        self.synopsis.push(fragment.into());
    }

    /// Record `name`'s long-form description, for the per-argument list.
    pub fn push_description(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.descriptions.push((name.into(), description.into()));
    }

    /// The accumulated one-line synopsis, e.g. `sl [sl...] --verbose`.
    pub fn synopsis(&self) -> String {
        self.synopsis.join(" ")
    }

    /// The accumulated `(name, description)` pairs, in traversal order.
    pub fn descriptions(&self) -> &[(String, String)] {
        &self.descriptions
    }
}
