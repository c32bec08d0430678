//! Named-option parsing over mixed input streams (§4.4).
//!
//! A [`FlagProcessor`] owns a set of [`FlagEntry`] objects — typically
//! [`Flag<T>`] (value-taking) or [`BoolFlag`] (presence-only) — and scans
//! `Input` left-to-right, pulling out `--name`/`-x` tokens (and clusters of
//! single-letter [`Combinable`](FlagEntry::combinable) flags like `-abc`)
//! wherever they appear among the positional tokens.

use std::collections::HashSet;

use crate::arg::{arg, Argument};
use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::{Breaker, Input};
use crate::node::{ExecuteData, Processor};
use crate::output::Output;
use crate::usage::UsageBuilder;
use crate::value::ArgValue;

/// An object-safe handle to one flag's behavior, held by a [`FlagProcessor`]
/// independent of the flag's value type.
pub trait FlagEntry {
    fn name(&self) -> &str;
    fn short(&self) -> Option<char>;
    /// Whether this flag can appear letter-clustered with other combinable
    /// flags (`-abc`), never consuming a following token when it does.
    fn combinable(&self) -> bool;
    /// Whether this flag may be supplied more than once without error.
    fn allows_multiple(&self) -> bool;

    /// Parse this flag's value out of `input` (already positioned just past
    /// the flag's own token), optionally protected by `breaker` so it won't
    /// swallow a sibling flag token.
    fn invoke(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
        breaker: Option<&Breaker>,
    ) -> Result<(), CommandError>;

    fn invoke_complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError>;

    /// Run once, after the scan, for every flag that was never seen
    /// (alphabetical order). The default does nothing.
    fn process_missing(&self, _data: &mut Data) -> Result<(), CommandError> {
        Ok(())
    }

    /// Run once, after every `process_missing` call, for every flag
    /// regardless of whether it was seen. Used by itemized-list flags to fold
    /// per-token invocations into a final collection.
    fn post_process(&self, _data: &mut Data) -> Result<(), CommandError> {
        Ok(())
    }

    fn usage(&self, builder: &mut UsageBuilder);
}

/// A flag that takes a value, built on top of [`Argument`].
pub struct Flag<T: ArgValue> {
    name: String,
    short: Option<char>,
    description: String,
    inner: Argument<T>,
    combinable: bool,
    allows_multiple: bool,
    missing_hook: Option<Box<dyn Fn(&mut Data)>>,
    post_hook: Option<Box<dyn Fn(&mut Data) -> Result<(), CommandError>>>,
}

pub struct FlagBuilder<T: ArgValue> {
    name: String,
    short: Option<char>,
    description: String,
    inner: crate::arg::ArgumentBuilder<T>,
    combinable: bool,
    allows_multiple: bool,
    missing_hook: Option<Box<dyn Fn(&mut Data)>>,
    post_hook: Option<Box<dyn Fn(&mut Data) -> Result<(), CommandError>>>,
}

/// A single-valued flag taking exactly one argument token, e.g. `--port 8080`.
pub fn flag<T: ArgValue>(name: impl Into<String>, short: Option<char>, description: impl Into<String>) -> FlagBuilder<T> {
    let name = name.into();
    let description = description.into();
    FlagBuilder {
        name: name.clone(),
        short,
        description: description.clone(),
        inner: arg::<T>(name, description),
        combinable: false,
        allows_multiple: false,
        missing_hook: None,
        post_hook: None,
    }
}

/// An itemized-list flag: each occurrence supplies one value, collected into
/// `Vec<String>` by a `post_process` hook the caller supplies.
pub fn list_flag(name: impl Into<String>, short: Option<char>, description: impl Into<String>) -> FlagBuilder<String> {
    flag::<String>(name, short, description).allows_multiple(true)
}

impl<T: ArgValue> FlagBuilder<T> {
    pub fn validator(mut self, validator: impl Fn(&T, &Data) -> Result<(), String> + 'static) -> Self {
        self.inner = self.inner.validator(validator);
        self
    }

    pub fn transformer(mut self, transformer: impl Fn(T) -> Result<T, String> + 'static) -> Self {
        self.inner = self.inner.transformer(transformer);
        self
    }

    pub fn default_value(mut self, default: impl Fn() -> T + 'static) -> Self {
        self.inner = self.inner.default_value(default);
        self
    }

    pub fn completer(mut self, completer: impl crate::completer::Completer<T> + 'static) -> Self {
        self.inner = self.inner.completer(completer);
        self
    }

    pub fn combinable(mut self, value: bool) -> Self {
        self.combinable = value;
        self
    }

    pub fn allows_multiple(mut self, value: bool) -> Self {
        self.allows_multiple = value;
        self
    }

    /// Run once if this flag was never supplied.
    pub fn on_missing(mut self, hook: impl Fn(&mut Data) + 'static) -> Self {
        self.missing_hook = Some(Box::new(hook));
        self
    }

    /// Run once after scanning, regardless of whether this flag was supplied.
    pub fn post_process(mut self, hook: impl Fn(&mut Data) -> Result<(), CommandError> + 'static) -> Self {
        self.post_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Flag<T> {
        Flag {
            name: self.name,
            short: self.short,
            description: self.description,
            inner: self.inner.build(),
            combinable: self.combinable,
            allows_multiple: self.allows_multiple,
            missing_hook: self.missing_hook,
            post_hook: self.post_hook,
        }
    }
}

impl<T: ArgValue> FlagEntry for Flag<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn combinable(&self) -> bool {
        self.combinable
    }

    fn allows_multiple(&self) -> bool {
        self.allows_multiple
    }

    fn invoke(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
        breaker: Option<&Breaker>,
    ) -> Result<(), CommandError> {
        self.inner.execute_impl(input, output, data, exec, breaker)
    }

    fn invoke_complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        self.inner.complete(input, data)
    }

    fn process_missing(&self, data: &mut Data) -> Result<(), CommandError> {
        if let Some(hook) = &self.missing_hook {
            hook(data);
        }
        Ok(())
    }

    fn post_process(&self, data: &mut Data) -> Result<(), CommandError> {
        match &self.post_hook {
            Some(hook) => hook(data),
            None => Ok(()),
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        push_flag_usage(builder, &self.name, self.short, &self.description);
    }
}

fn push_flag_usage(builder: &mut UsageBuilder, name: &str, short: Option<char>, description: &str) {
    let spelling = match short {
        Some(c) => format!("--{name}/-{c}"),
        None => format!("--{name}"),
    };
    builder.push_synopsis(format!("[{spelling}]"));
    builder.push_description(name.to_string(), description.to_string());
}

/// A presence-only flag: setting it writes `true` to `Data`, and its
/// `process_missing` hook fills in `false` for commands that never check
/// [`Data::has`] directly. Combinable by default, since clustering
/// (`-abc`) is the entire point of a boolean switch.
pub struct BoolFlag {
    name: String,
    short: Option<char>,
    description: String,
    combinable: bool,
}

impl BoolFlag {
    pub fn new(name: impl Into<String>, short: Option<char>, description: impl Into<String>) -> Self {
        BoolFlag {
            name: name.into(),
            short,
            description: description.into(),
            combinable: true,
        }
    }

    pub fn combinable(mut self, value: bool) -> Self {
        self.combinable = value;
        self
    }
}

impl FlagEntry for BoolFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn combinable(&self) -> bool {
        self.combinable
    }

    fn allows_multiple(&self) -> bool {
        true
    }

    fn invoke(
        &self,
        _input: &mut Input,
        _output: &mut dyn Output,
        data: &mut Data,
        _exec: &mut ExecuteData,
        _breaker: Option<&Breaker>,
    ) -> Result<(), CommandError> {
        data.set(self.name.clone(), true);
        Ok(())
    }

    fn invoke_complete(&self, _input: &mut Input, _data: &mut Data) -> Result<Option<Completion>, CommandError> {
        Ok(None)
    }

    fn process_missing(&self, data: &mut Data) -> Result<(), CommandError> {
        if !data.has(&self.name) {
            data.set(self.name.clone(), false);
        }
        Ok(())
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        push_flag_usage(builder, &self.name, self.short, &self.description);
    }
}

/// Scans `Input` for declared `--name`/`-x` flags and combinable clusters,
/// dispatching to each flag's own parser (§4.4).
pub struct FlagProcessor {
    flags: Vec<Box<dyn FlagEntry>>,
}

impl FlagProcessor {
    pub fn new(flags: Vec<Box<dyn FlagEntry>>) -> Self {
        FlagProcessor { flags }
    }

    fn find_by_long<'a>(&'a self, token: &str) -> Option<&'a dyn FlagEntry> {
        let name = token.strip_prefix("--")?;
        self.flags.iter().find(|f| f.name() == name).map(Box::as_ref)
    }

    fn find_by_short(&self, c: char) -> Option<&dyn FlagEntry> {
        self.flags.iter().find(|f| f.short() == Some(c)).map(Box::as_ref)
    }

    fn find_single_short<'a>(&'a self, token: &str) -> Option<&'a dyn FlagEntry> {
        let rest = token.strip_prefix('-')?;
        if rest.starts_with('-') {
            return None;
        }
        let mut chars = rest.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        self.find_by_short(c)
    }

    /// A closure recognizing any spelling (`--name` or `-x`) this processor's
    /// flags answer to, for use as a positional argument's list-breaker so it
    /// stops before eating a sibling flag token (§4.4 "Interaction with
    /// positional arguments").
    pub fn is_flag_token(&self) -> impl Fn(&str) -> bool + 'static {
        let longs: HashSet<String> = self.flags.iter().map(|f| format!("--{}", f.name())).collect();
        let shorts: HashSet<char> = self.flags.iter().filter_map(|f| f.short()).collect();
        move |token: &str| {
            if longs.contains(token) {
                return true;
            }
            let Some(rest) = token.strip_prefix('-') else {
                return false;
            };
            !rest.is_empty() && !rest.starts_with('-') && rest.chars().all(|c| shorts.contains(&c))
        }
    }
}

fn is_multi_flag_token(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) if rest.len() >= 2 && !rest.starts_with('-') => rest.chars().all(|c| c.is_alphabetic()),
        _ => false,
    }
}

impl Processor for FlagProcessor {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        let mut processed: HashSet<String> = HashSet::new();
        let breaker_fn = self.is_flag_token();
        let extra_breaker: &Breaker = &breaker_fn;

        let mut i = 0;
        while i < input.len() {
            let Some(token) = input.peek_at(i).map(str::to_string) else {
                break;
            };

            if let Some(flag) = self.find_by_long(&token).or_else(|| self.find_single_short(&token)) {
                if processed.contains(flag.name()) && !flag.allows_multiple() {
                    return Err(CommandError::FlagAlreadySet(flag.name().to_string()));
                }
                input.set_offset(i);
                input.pop()?;
                flag.invoke(input, output, data, exec, Some(extra_breaker))?;
                input.set_offset(0);
                tracing::debug!(flag = flag.name(), "flag: set");
                processed.insert(flag.name().to_string());
                continue;
            }

            if is_multi_flag_token(&token) {
                let letters: Vec<char> = token[1..].chars().collect();
                let resolved: Vec<Option<&dyn FlagEntry>> = letters.iter().map(|c| self.find_by_short(*c)).collect();
                if resolved.iter().all(Option::is_none) {
                    i += 1;
                    continue;
                }
                if !resolved.iter().all(Option::is_some) {
                    return Err(CommandError::FlagConflict(token));
                }
                let flags: Vec<&dyn FlagEntry> = resolved.into_iter().map(Option::unwrap).collect();
                if !flags.iter().all(|f| f.combinable()) {
                    return Err(CommandError::FlagConflict(token));
                }
                input.set_offset(i);
                input.pop()?;
                input.set_offset(0);
                for f in flags {
                    if processed.contains(f.name()) && !f.allows_multiple() {
                        return Err(CommandError::FlagAlreadySet(f.name().to_string()));
                    }
                    let mut empty = Input::new::<_, String>([]);
                    f.invoke(&mut empty, output, data, exec, None)?;
                    tracing::debug!(flag = f.name(), cluster = %token, "flag: set from cluster");
                    processed.insert(f.name().to_string());
                }
                continue;
            }

            i += 1;
        }

        let mut names: Vec<&str> = self.flags.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        for name in names {
            if !processed.contains(name) {
                if let Some(f) = self.flags.iter().find(|f| f.name() == name) {
                    f.process_missing(data)?;
                }
            }
        }
        for f in &self.flags {
            f.post_process(data)?;
        }
        Ok(())
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        let mut processed: HashSet<String> = HashSet::new();
        let mut i = 0;
        while i < input.len() {
            let Some(token) = input.peek_at(i).map(str::to_string) else {
                break;
            };
            let is_last = i + 1 == input.len();

            if let Some(flag) = self.find_by_long(&token).or_else(|| self.find_single_short(&token)) {
                input.set_offset(i);
                input.pop()?;
                let result = flag.invoke_complete(input, data)?;
                input.set_offset(0);
                if result.is_some() {
                    return Ok(result);
                }
                processed.insert(flag.name().to_string());
                continue;
            }

            if is_last && token.starts_with('-') {
                let mut names: Vec<String> = self
                    .flags
                    .iter()
                    .filter(|f| !processed.contains(f.name()))
                    .map(|f| format!("--{}", f.name()))
                    .collect();
                names.sort();
                return Ok(Some(Completion::new(names)));
            }

            i += 1;
        }
        Ok(None)
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        for f in &self.flags {
            f.usage(builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::serial_nodes;
    use crate::output::RecordingOutput;

    fn run(processor: &FlagProcessor, tokens: &[&str]) -> (Input, Data, RecordingOutput) {
        let mut input = Input::new(tokens.iter().map(|s| s.to_string()));
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        (input, data, output)
    }

    #[test]
    fn long_flag_is_extracted_and_value_stored() {
        let processor = FlagProcessor::new(vec![Box::new(flag::<String>("name", None, "").build())]);
        let (input, data, _) = run(&processor, &["--name", "alice", "rest"]);
        assert_eq!(data.get::<String>("name"), Some(&"alice".to_string()));
        assert_eq!(input.remaining_tokens(), vec!["rest"]);
    }

    #[test]
    fn short_flag_alias_resolves_to_same_flag() {
        let processor = FlagProcessor::new(vec![Box::new(flag::<i64>("count", Some('c'), "").build())]);
        let (_, data, _) = run(&processor, &["-c", "5"]);
        assert_eq!(data.get::<i64>("count"), Some(&5));
    }

    #[test]
    fn repeated_non_multi_flag_is_an_error() {
        let processor = FlagProcessor::new(vec![Box::new(flag::<String>("name", None, "").build())]);
        let mut input = Input::new(["--name", "a", "--name", "b"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        let err = processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap_err();
        assert!(matches!(err, CommandError::FlagAlreadySet(name) if name == "name"));
    }

    #[test]
    fn missing_bool_flag_defaults_to_false() {
        let processor = FlagProcessor::new(vec![Box::new(BoolFlag::new("verbose", Some('v'), ""))]);
        let (_, data, _) = run(&processor, &[]);
        assert_eq!(data.get::<bool>("verbose"), Some(&false));
    }

    #[test]
    fn combinable_cluster_sets_every_flag_without_consuming_tokens() {
        let processor = FlagProcessor::new(vec![
            Box::new(BoolFlag::new("all", Some('a'), "")),
            Box::new(BoolFlag::new("brief", Some('b'), "")),
        ]);
        let (input, data, _) = run(&processor, &["-ab", "file.rs"]);
        assert_eq!(data.get::<bool>("all"), Some(&true));
        assert_eq!(data.get::<bool>("brief"), Some(&true));
        assert_eq!(input.remaining_tokens(), vec!["file.rs"]);
    }

    #[test]
    fn mixed_cluster_of_combinable_and_non_combinable_is_rejected() {
        let processor = FlagProcessor::new(vec![
            Box::new(BoolFlag::new("all", Some('a'), "")),
            Box::new(flag::<String>("branch", Some('b'), "").combinable(false).build()),
        ]);
        let mut input = Input::new(["-ab"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        let err = processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap_err();
        assert!(matches!(err, CommandError::FlagConflict(_)));
    }

    #[test]
    fn cluster_where_only_some_letters_are_registered_flags_is_rejected() {
        // §4.4: "either every letter maps to a Combinable flag of this processor,
        // or none does." `x` maps to nothing, so `-ax` is neither.
        let processor = FlagProcessor::new(vec![Box::new(BoolFlag::new("all", Some('a'), ""))]);
        let mut input = Input::new(["-ax"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        let err = processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap_err();
        assert!(matches!(err, CommandError::FlagConflict(_)));
    }

    #[test]
    fn flag_value_does_not_eat_a_following_sibling_flag_token() {
        // §4.4 "Interaction with positional arguments".
        let processor = FlagProcessor::new(vec![
            Box::new(flag::<String>("a", None, "").build()),
            Box::new(BoolFlag::new("b", None, "")),
        ]);
        let (_, data, _) = run(&processor, &["--a", "v1", "--b"]);
        assert_eq!(data.get::<String>("a"), Some(&"v1".to_string()));
        assert_eq!(data.get::<bool>("b"), Some(&true));
    }

    #[test]
    fn flags_interleave_with_positional_arguments_in_serial_nodes() {
        let root = serial_nodes(vec![
            Box::new(FlagProcessor::new(vec![Box::new(BoolFlag::new("verbose", Some('v'), ""))])),
            Box::new(arg::<String>("target", "").build()),
        ]);
        let mut input = Input::new(["-v", "build"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        crate::walker::execute(root, &mut input, &mut output, &mut data).unwrap();
        assert_eq!(data.get::<bool>("verbose"), Some(&true));
        assert_eq!(data.get::<String>("target"), Some(&"build".to_string()));
    }

    #[test]
    fn completion_on_trailing_dash_token_lists_available_flag_names() {
        let processor = FlagProcessor::new(vec![
            Box::new(flag::<String>("alpha", None, "").build()),
            Box::new(BoolFlag::new("beta", None, "")),
        ]);
        let mut input = Input::new(["-"]);
        let mut data = Data::new();
        let completion = processor.complete(&mut input, &mut data).unwrap().unwrap();
        assert_eq!(completion.suggestions, vec!["--alpha", "--beta"]);
    }
}
