//! The input cursor: a mutating, rewindable view over a token list.
//!
//! [`Input`] is created once at command entry and threaded through the graph walker
//! (see [`crate::walker`]) for the lifetime of a single Execute or Complete call. It
//! is never shared across traversals and is not `Sync`.
//!
//! # Logical indexing
//!
//! Tokens live in a flat backing store (`tokens`) that is append-only except for
//! in-place rewrites performed by transformers and shortcut expansion. A separate
//! `remaining` list holds the indexes of tokens that have not yet been popped, in
//! logical order. `offset` is a cursor into `remaining` (not into `tokens`) used by
//! flag scans to skip positions they have already visited without popping them.
//!
//! ```text
//! tokens:     ["--verbose", "build", "main.rs"]
//! remaining:  [1, 2]              (the flag processor already popped index 0)
//! offset:     0
//! ```

use crate::error::CommandError;

/// An opaque handle to a token in an [`Input`]'s backing storage.
///
/// Handles remain valid for the lifetime of the `Input` even after the token they
/// refer to has been popped; `Input::token` and `Input::set_token` always resolve a
/// handle against the backing store, not against `remaining`. Holding on to a handle
/// past the `Processor` call that produced it is a logic error in caller code, not
/// something this type prevents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHandle(usize);

/// A validator used to terminate a list-typed argument's pop early.
///
/// Returns `true` if `token` should stop the list (i.e. it "breaks" the list).
pub type Breaker = dyn Fn(&str) -> bool;

/// Configuration for [`Input::pop_n`]'s early-termination behavior.
pub struct BreakerOpts<'a> {
    /// Stop popping before the first token for which this returns `true`.
    pub breaker: &'a (dyn Fn(&str) -> bool + 'a),
    /// If `true`, the breaking token is removed from `Input` entirely. If `false`
    /// (the default), it is left in place for the next node to consume.
    pub discard: bool,
}

/// Something that can answer "is `token` a shortcut key in this namespace, and if
/// so what does it expand to?" Implemented by the host's shortcut provider
/// (see [`crate::shortcut`]).
pub trait ShortcutLookup {
    /// Look up `token` under `namespace`. Returns `None` if it is not a shortcut.
    fn lookup(&self, namespace: &str, token: &str) -> Option<Vec<String>>;
}

/// Rewindable, mutable cursor over a command's argument tokens.
#[derive(Debug, Clone, Default)]
pub struct Input {
    tokens: Vec<String>,
    remaining: Vec<usize>,
    offset: usize,
    delimiter: Option<char>,
}

/// A saved cursor position, produced by [`Input::snapshot`] and restored by
/// [`Input::restore`]. Used by the branch node to peek without committing, and by
/// tests asserting on intermediate cursor state.
#[derive(Debug, Clone)]
pub struct InputSnapshot {
    tokens: Vec<String>,
    remaining: Vec<usize>,
    offset: usize,
}

impl Input {
    /// Build an `Input` from a raw token list, as collected from `argv` or from a
    /// shell completion request.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let remaining = (0..tokens.len()).collect();
        Input {
            tokens,
            remaining,
            offset: 0,
            delimiter: None,
        }
    }

    /// The quotation delimiter active while formatting suggestions, if any.
    pub fn delimiter(&self) -> Option<char> {
        self.delimiter
    }

    /// Set the quotation delimiter used when a suggestion contains whitespace.
    pub fn set_delimiter(&mut self, delimiter: Option<char>) {
        self.delimiter = delimiter;
    }

    /// Number of tokens still unpopped, counting from `offset`.
    pub fn len(&self) -> usize {
        self.remaining.len().saturating_sub(self.offset)
    }

    /// Whether there are no unpopped tokens left from `offset` onward.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` once every token has been popped (independent of `offset`, which is
    /// always reset to zero before this is checked at the end of a walk).
    pub fn fully_processed(&self) -> bool {
        self.remaining.len() <= self.offset
    }

    /// The transient scan offset used by flag processors. Reading this should be
    /// rare outside of [`crate::flag`]; prefer `peek`/`pop` which already account
    /// for it.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Set the scan offset. Flag processors use this to jump to a flag's position
    /// without disturbing tokens before it, then reset it to zero when done.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// The token at logical index `offset + i`, without consuming it.
    pub fn peek_at(&self, i: usize) -> Option<&str> {
        self.remaining
            .get(self.offset + i)
            .map(|&idx| self.tokens[idx].as_str())
    }

    /// The token at logical index `offset`, without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.peek_at(0)
    }

    /// Resolve a handle back to its current string value.
    pub fn token(&self, handle: TokenHandle) -> &str {
        &self.tokens[handle.0]
    }

    /// Overwrite the string backing a handle in place. Used by argument
    /// transformers and by shortcut re-expansion so later readers observe the
    /// transformed form.
    pub fn set_token(&mut self, handle: TokenHandle, value: impl Into<String>) {
        self.tokens[handle.0] = value.into();
    }

    /// Pop and return the token at logical index `offset`. Fails if none remain.
    pub fn pop(&mut self) -> Result<TokenHandle, CommandError> {
        if self.offset >= self.remaining.len() {
            return Err(CommandError::NotEnoughArgs {
                name: String::new(),
                min: 1,
                got: 0,
            });
        }
        Ok(TokenHandle(self.remaining.remove(self.offset)))
    }

    /// Pop up to `min + optional` tokens (an `optional` of [`Input::UNBOUNDED`]
    /// means "the rest of the input"). Returns the popped handles and whether at
    /// least `min` were obtained.
    ///
    /// If `breaker` is supplied, popping stops before the first token for which
    /// the breaker predicate returns `true`. That token is left in `Input` unless
    /// `discard` requests its removal.
    pub fn pop_n(
        &mut self,
        min: usize,
        optional: usize,
        breaker: Option<BreakerOpts<'_>>,
    ) -> (Vec<TokenHandle>, bool) {
        let max = min.saturating_add(optional);
        let mut popped = Vec::new();
        while popped.len() < max {
            let Some(&idx) = self.remaining.get(self.offset) else {
                break;
            };
            if let Some(opts) = breaker.as_ref() {
                if (opts.breaker)(&self.tokens[idx]) {
                    if opts.discard {
                        self.remaining.remove(self.offset);
                    }
                    break;
                }
            }
            self.remaining.remove(self.offset);
            popped.push(TokenHandle(idx));
        }
        let enough = popped.len() >= min;
        (popped, enough)
    }

    /// Unbounded arity sentinel for [`Input::pop_n`]'s `optional` parameter.
    pub const UNBOUNDED: usize = usize::MAX;

    /// Insert `tokens` at logical position `offset + idx`, shifting every later
    /// `remaining` entry by the number of tokens inserted. Used by the shortcut
    /// expander and by multi-flag splitting.
    pub fn push_front(&mut self, idx: usize, tokens: Vec<String>) {
        if tokens.is_empty() {
            return;
        }
        let base = self.tokens.len();
        let new_indexes: Vec<usize> = (base..base + tokens.len()).collect();
        self.tokens.extend(tokens);
        let at = (self.offset + idx).min(self.remaining.len());
        self.remaining.splice(at..at, new_indexes);
    }

    /// Tokens still unconsumed from `offset` onward, in order. Used to build
    /// `ExtraArgs` error messages.
    pub fn remaining_tokens(&self) -> Vec<String> {
        self.remaining[self.offset.min(self.remaining.len())..]
            .iter()
            .map(|&idx| self.tokens[idx].clone())
            .collect()
    }

    /// Handles for the tokens still unconsumed from `offset` onward, in order.
    /// Unlike `remaining_tokens`, these stay resolvable via `token()` after the
    /// tokens they name have been popped, so a caller can snapshot "what's about
    /// to be consumed" and read back its possibly-transformed form afterward.
    pub fn remaining_handles(&self) -> Vec<TokenHandle> {
        self.remaining[self.offset.min(self.remaining.len())..]
            .iter()
            .map(|&idx| TokenHandle(idx))
            .collect()
    }

    /// Capture `(tokens, remaining, offset)` so a processor can speculatively
    /// consume input and roll back if its guess was wrong.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            tokens: self.tokens.clone(),
            remaining: self.remaining.clone(),
            offset: self.offset,
        }
    }

    /// Restore a previously captured snapshot.
    pub fn restore(&mut self, snapshot: InputSnapshot) {
        self.tokens = snapshot.tokens;
        self.remaining = snapshot.remaining;
        self.offset = snapshot.offset;
    }

    /// Scan up to `up_to` logical tokens starting at `offset`; for each one that is
    /// a shortcut key in `namespace` (per `provider`), replace it with the first
    /// value of its expansion and push the remaining expansion tokens directly
    /// after it.
    ///
    /// When `completing` is `true`, the very last token within the scan window is
    /// left unexpanded so the user can still complete it.
    ///
    /// Returns an error if any shortcut expands to zero tokens.
    pub fn check_shortcuts<P: ShortcutLookup + ?Sized>(
        &mut self,
        up_to: usize,
        provider: &P,
        namespace: &str,
        completing: bool,
    ) -> Result<(), CommandError> {
        let scan_len = up_to.min(self.len());
        let mut i = 0;
        while i < scan_len {
            let is_last_in_scan = i + 1 == scan_len;
            if completing && is_last_in_scan {
                break;
            }
            let Some(token) = self.peek_at(i) else {
                break;
            };
            if let Some(expansion) = provider.lookup(namespace, token) {
                if expansion.is_empty() {
                    return Err(CommandError::EmptyShortcut);
                }
                let idx = self.remaining[self.offset + i];
                self.tokens[idx] = expansion[0].clone();
                if expansion.len() > 1 {
                    self.push_front(i + 1, expansion[1..].to_vec());
                }
            }
            i += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapProvider(std::collections::BTreeMap<(&'static str, &'static str), Vec<&'static str>>);

    impl ShortcutLookup for MapProvider {
        fn lookup(&self, namespace: &str, token: &str) -> Option<Vec<String>> {
            self.0.iter().find_map(|(&(ns, key), vals)| {
                if ns == namespace && key == token {
                    Some(vals.iter().map(|s| s.to_string()).collect())
                } else {
                    None
                }
            })
        }
    }

    #[test]
    fn pop_n_consumes_min_plus_optional() {
        let mut input = Input::new(["a", "b", "c"]);
        let (popped, enough) = input.pop_n(1, 1, None);
        assert_eq!(popped.len(), 2);
        assert!(enough);
        assert_eq!(input.remaining_tokens(), vec!["c"]);
    }

    #[test]
    fn pop_n_reports_not_enough() {
        let mut input = Input::new(["a"]);
        let (popped, enough) = input.pop_n(3, 0, None);
        assert_eq!(popped.len(), 1);
        assert!(!enough);
    }

    #[test]
    fn pop_n_zero_arity_is_trivially_enough() {
        let mut input = Input::new::<_, String>([]);
        let (popped, enough) = input.pop_n(0, 0, None);
        assert!(popped.is_empty());
        assert!(enough);
    }

    #[test]
    fn push_front_shifts_later_remaining_entries() {
        let mut input = Input::new(["a", "c"]);
        input.push_front(1, vec!["b".to_string()]);
        assert_eq!(input.remaining_tokens(), vec!["a", "b", "c"]);
    }

    #[test]
    fn breaker_stops_before_matching_token_and_keeps_it() {
        let mut input = Input::new(["a", "b", "--flag", "c"]);
        let breaker: &Breaker = &|t: &str| t.starts_with("--");
        let (popped, enough) = input.pop_n(0, Input::UNBOUNDED, Some(BreakerOpts { breaker, discard: false }));
        assert_eq!(popped.len(), 2);
        assert!(enough);
        assert_eq!(input.remaining_tokens(), vec!["--flag", "c"]);
    }

    #[test]
    fn check_shortcuts_expands_and_bleeds_into_following_tokens() {
        let mut provider = MapProvider(Default::default());
        provider
            .0
            .insert(("ns", "t"), vec!["three", "trois", "tres"]);
        let mut input = Input::new(["t", "extra"]);
        input.check_shortcuts(1, &provider, "ns", false).unwrap();
        assert_eq!(input.remaining_tokens(), vec!["three", "trois", "tres", "extra"]);
    }

    #[test]
    fn check_shortcuts_leaves_last_token_untouched_while_completing() {
        let mut provider = MapProvider(Default::default());
        provider.0.insert(("ns", "t"), vec!["expanded"]);
        let mut input = Input::new(["t"]);
        input.check_shortcuts(1, &provider, "ns", true).unwrap();
        assert_eq!(input.remaining_tokens(), vec!["t"]);
    }

    #[test]
    fn check_shortcuts_rejects_empty_expansion() {
        let mut provider = MapProvider(Default::default());
        provider.0.insert(("ns", "t"), vec![]);
        let mut input = Input::new(["t"]);
        let err = input.check_shortcuts(1, &provider, "ns", false).unwrap_err();
        assert!(matches!(err, CommandError::EmptyShortcut));
    }

    #[test]
    fn snapshot_restore_round_trips() {
        let mut input = Input::new(["a", "b"]);
        let snap = input.snapshot();
        input.pop().unwrap();
        assert_eq!(input.len(), 1);
        input.restore(snap);
        assert_eq!(input.len(), 2);
    }
}
