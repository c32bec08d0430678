//! The typed argument node: a positional parser with transform/validate/complete
//! (§4.3).
//!
//! [`Argument<T>`] is the one implementation behind both "Arg" and "ListArg" from
//! the design notes (§9): the two are just different choices of `(min_n,
//! optional_n)` built through the [`arg`] and [`list_arg`] constructors.

use crate::completer::Completer;
use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::{Breaker, BreakerOpts, Input};
use crate::node::{ExecuteData, Processor};
use crate::output::Output;
use crate::shortcut::ShortcutOpt;
use crate::usage::UsageBuilder;
use crate::value::ArgValue;

/// A single validator: given the converted value and the `Data` accumulated so
/// far, either approve it or explain why it's rejected.
pub type Validator<T> = Box<dyn Fn(&T, &Data) -> Result<(), String>>;

/// A single transformer: given the converted value, either pass through a
/// (possibly modified) value or explain why it could not be transformed.
pub type Transformer<T> = Box<dyn Fn(T) -> Result<T, String>>;

/// A typed positional argument: pops `min_n..=min_n+optional_n` tokens, converts
/// them via [`ArgValue`], runs transformers and validators, and stores the result
/// in [`Data`] under `name`.
pub struct Argument<T: ArgValue> {
    name: String,
    description: String,
    min_n: usize,
    optional_n: usize,
    completer: Option<Box<dyn Completer<T>>>,
    validators: Vec<Validator<T>>,
    transformers: Vec<Transformer<T>>,
    default: Option<Box<dyn Fn() -> T>>,
    setter: Option<Box<dyn Fn(&mut Data, T)>>,
    breaker: Option<Box<Breaker>>,
    breaker_discard: bool,
    shortcut: Option<ShortcutOpt>,
}

/// Builds an [`Argument`] from its options bundle (§3 "Argument descriptor").
pub struct ArgumentBuilder<T: ArgValue> {
    inner: Argument<T>,
}

/// A single-value argument (`min_n = 1, optional_n = 0`).
pub fn arg<T: ArgValue>(name: impl Into<String>, description: impl Into<String>) -> ArgumentBuilder<T> {
    ArgumentBuilder::new(name, description, 1, 0)
}

/// A list-valued argument with explicit arity. `T` is the list type itself
/// (e.g. `Vec<String>`, `Vec<i64>`), not its element type — every popped token
/// is converted and stored as one `T`. `optional_n` may be
/// [`Input::UNBOUNDED`] for "consume the rest."
pub fn list_arg<T: ArgValue>(
    name: impl Into<String>,
    description: impl Into<String>,
    min_n: usize,
    optional_n: usize,
) -> ArgumentBuilder<T> {
    ArgumentBuilder::new(name, description, min_n, optional_n)
}

impl<T: ArgValue> ArgumentBuilder<T> {
    fn new(name: impl Into<String>, description: impl Into<String>, min_n: usize, optional_n: usize) -> Self {
        ArgumentBuilder {
            inner: Argument {
                name: name.into(),
                description: description.into(),
                min_n,
                optional_n,
                completer: None,
                validators: Vec::new(),
                transformers: Vec::new(),
                default: None,
                setter: None,
                breaker: None,
                breaker_discard: false,
                shortcut: None,
            },
        }
    }

    pub fn completer(mut self, completer: impl Completer<T> + 'static) -> Self {
        self.inner.completer = Some(Box::new(completer));
        self
    }

    pub fn validator(mut self, validator: impl Fn(&T, &Data) -> Result<(), String> + 'static) -> Self {
        self.inner.validators.push(Box::new(validator));
        self
    }

    pub fn transformer(mut self, transformer: impl Fn(T) -> Result<T, String> + 'static) -> Self {
        self.inner.transformers.push(Box::new(transformer));
        self
    }

    pub fn default_value(mut self, default: impl Fn() -> T + 'static) -> Self {
        self.inner.default = Some(Box::new(default));
        self
    }

    pub fn setter(mut self, setter: impl Fn(&mut Data, T) + 'static) -> Self {
        self.inner.setter = Some(Box::new(setter));
        self
    }

    /// Install a list-breaker: popping stops before the first token this
    /// predicate matches. `discard` controls whether the breaking token is
    /// removed from `Input` or left for the next node (§4.3 "Breakers").
    pub fn breaker(mut self, breaker: impl Fn(&str) -> bool + 'static, discard: bool) -> Self {
        self.inner.breaker = Some(Box::new(breaker));
        self.inner.breaker_discard = discard;
        self
    }

    /// Attach a shortcut namespace: before popping, expand macros over the next
    /// `min_n + optional_n` tokens (§4.6 point 2).
    pub fn shortcut(mut self, shortcut: ShortcutOpt) -> Self {
        self.inner.shortcut = Some(shortcut);
        self
    }

    pub fn build(self) -> Argument<T> {
        self.inner
    }
}

impl<T: ArgValue> Argument<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn breaker_opts(&self) -> Option<BreakerOpts<'_>> {
        self.breaker.as_deref().map(|b| BreakerOpts {
            breaker: b,
            discard: self.breaker_discard,
        })
    }

    fn store(&self, data: &mut Data, value: T) {
        match &self.setter {
            Some(setter) => setter(data, value),
            None => data.set(self.name.clone(), value),
        }
    }

    fn expand_shortcuts(&self, input: &mut Input, completing: bool) -> Result<(), CommandError> {
        let Some(shortcut) = &self.shortcut else {
            return Ok(());
        };
        let up_to = if self.optional_n == Input::UNBOUNDED {
            input.len()
        } else {
            self.min_n + self.optional_n
        };
        let provider = shortcut.provider.borrow();
        input.check_shortcuts(up_to, &*provider, &shortcut.namespace, completing)
    }
}

impl<T: ArgValue> Argument<T> {
    /// The shared implementation behind `Processor::execute`, taking an extra
    /// breaker a caller can layer on top of this argument's own (used by
    /// [`crate::flag::FlagProcessor`] to stop a flag's value from eating a
    /// sibling flag token, per §4.4 "Interaction with positional arguments").
    pub(crate) fn execute_impl(
        &self,
        input: &mut Input,
        _output: &mut dyn Output,
        data: &mut Data,
        _exec: &mut ExecuteData,
        extra_breaker: Option<&Breaker>,
    ) -> Result<(), CommandError> {
        self.expand_shortcuts(input, false)?;

        let combined;
        let opts: Option<BreakerOpts<'_>> = match (self.breaker.as_deref(), extra_breaker) {
            (None, None) => None,
            (Some(b), None) => Some(BreakerOpts { breaker: b, discard: self.breaker_discard }),
            (None, Some(e)) => Some(BreakerOpts { breaker: e, discard: false }),
            (Some(b), Some(e)) => {
                combined = move |t: &str| b(t) || e(t);
                Some(BreakerOpts { breaker: &combined, discard: false })
            }
        };

        let (popped, enough) = input.pop_n(self.min_n, self.optional_n, opts);

        if popped.is_empty() {
            if !enough {
                return Err(CommandError::NotEnoughArgs {
                    name: self.name.clone(),
                    min: self.min_n,
                    got: 0,
                });
            }
            if let Some(default) = &self.default {
                self.store(data, default());
            }
            return Ok(());
        }

        let raw: Vec<String> = popped.iter().map(|h| input.token(*h).to_string()).collect();
        let mut value = T::from_args(&raw)?;

        for transformer in &self.transformers {
            value = transformer(value).map_err(CommandError::Transform)?;
        }

        let rewritten = value.to_args();
        for (handle, token) in popped.iter().zip(rewritten) {
            input.set_token(*handle, token);
        }

        self.store(data, value.clone());

        for validator in &self.validators {
            validator(&value, data).map_err(|reason| CommandError::Validation {
                name: self.name.clone(),
                reason,
            })?;
        }

        if !enough {
            return Err(CommandError::NotEnoughArgs {
                name: self.name.clone(),
                min: self.min_n,
                got: popped.len(),
            });
        }

        Ok(())
    }
}

impl<T: ArgValue> Processor for Argument<T> {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        self.execute_impl(input, output, data, exec, None)
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        self.expand_shortcuts(input, true)?;

        let (popped, _enough) = input.pop_n(self.min_n, self.optional_n, self.breaker_opts());
        let is_terminal = input.fully_processed();
        let raw: Vec<String> = popped.iter().map(|h| input.token(*h).to_string()).collect();

        match T::from_args(&raw) {
            Err(_) if is_terminal => {
                let last = raw.last().cloned().unwrap_or_default();
                Ok(Some(self.complete_last_token(&last, data)?))
            }
            Err(err) => Err(err),
            Ok(value) => {
                self.store(data, value.clone());
                if is_terminal {
                    let last_rendered = value.to_args().last().cloned().unwrap_or_default();
                    Ok(Some(self.complete_last_token(&last_rendered, data)?))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        let marker = if self.optional_n == Input::UNBOUNDED {
            format!("{}...", self.name)
        } else if self.min_n + self.optional_n <= 1 {
            self.name.clone()
        } else {
            format!("{} [{}...]", self.name, self.name)
        };
        builder.push_synopsis(marker);
        builder.push_description(self.name.clone(), self.description.clone());
    }
}

impl<T: ArgValue> Argument<T> {
    fn complete_last_token(&self, last_token: &str, data: &Data) -> Result<Completion, CommandError> {
        let Some(completer) = &self.completer else {
            return Ok(Completion::empty());
        };
        // The completer is invoked against a best-effort parse of the last raw
        // token alone; list-typed arguments complete their final element the
        // same way a scalar argument completes its only element. A token that
        // doesn't yet parse (still mid-typing) just offers no suggestions.
        match T::from_args(&[last_token.to_string()]) {
            Ok(probe) => completer.complete(&probe, data),
            Err(_) => Ok(Completion::empty()),
        }
    }
}
