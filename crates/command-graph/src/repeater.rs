//! Looping an inner node over a bounded or unbounded number of cycles (§4.5).

use std::rc::Rc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::Input;
use crate::node::{ExecuteData, Node, Processor};
use crate::output::Output;
use crate::usage::UsageBuilder;

/// Runs `inner` `[min_n, min_n + optional_n]` times, `optional_n` of
/// [`Input::UNBOUNDED`] meaning "as many times as tokens remain."
pub struct Repeater {
    inner: Rc<Node>,
    min_n: usize,
    optional_n: usize,
}

/// Build a [`Repeater`] over `inner`, a sub-chain representing one cycle.
pub fn repeater(inner: Rc<Node>, min_n: usize, optional_n: usize) -> Repeater {
    Repeater { inner, min_n, optional_n }
}

impl Repeater {
    fn cap_reached(&self, cycles: usize) -> bool {
        self.optional_n != Input::UNBOUNDED && cycles >= self.min_n.saturating_add(self.optional_n)
    }

    fn should_attempt(&self, cycles: usize, input: &Input) -> bool {
        cycles < self.min_n || (!input.is_empty() && !self.cap_reached(cycles))
    }
}

/// Walk `node`'s chain once, without the whole-input-consumed check
/// `crate::walker::execute` applies at the end of a full traversal — a single
/// repeater cycle is expected to leave tokens for the next cycle.
fn walk_cycle(
    node: &Rc<Node>,
    input: &mut Input,
    output: &mut dyn Output,
    data: &mut Data,
    exec: &mut ExecuteData,
) -> Result<(), CommandError> {
    let mut current = Some(Rc::clone(node));
    while let Some(n) = current {
        n.processor.execute(input, output, data, exec)?;
        current = n.edge.next(input, data)?;
    }
    Ok(())
}

/// Walk `node`'s chain once in Complete mode, mirroring [`walker::complete`] but
/// returning `None` (rather than an empty [`Completion`]) when the chain runs out
/// without any processor stopping — so a repeater cycle can tell "nothing here,
/// try the next cycle" apart from "this is the answer."
fn complete_cycle(
    node: &Rc<Node>,
    input: &mut Input,
    data: &mut Data,
) -> Result<Option<Completion>, CommandError> {
    let mut current = Some(Rc::clone(node));
    while let Some(n) = current {
        if let Some(completion) = n.processor.complete(input, data)? {
            return Ok(Some(completion));
        }
        current = n.edge.next(input, data)?;
    }
    Ok(None)
}

impl Processor for Repeater {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        let mut cycles = 0usize;
        while self.should_attempt(cycles, input) {
            let required = cycles < self.min_n;
            match walk_cycle(&self.inner, input, output, data, exec) {
                Ok(()) => cycles += 1,
                Err(CommandError::ExtraArgs(_)) => cycles += 1,
                Err(e) if required => return Err(e),
                Err(_) => break,
            }
        }
        Ok(())
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        let mut cycles = 0usize;
        while self.should_attempt(cycles, input) {
            if let Some(completion) = complete_cycle(&self.inner, input, data)? {
                return Ok(Some(completion));
            }
            if input.is_empty() {
                return Ok(None);
            }
            cycles += 1;
        }
        Ok(None)
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        self.inner.processor.usage(builder);
        let suffix = if self.optional_n == Input::UNBOUNDED {
            "...".to_string()
        } else {
            format!("{{{},{}}}", self.min_n, self.min_n + self.optional_n)
        };
        builder.push_synopsis(suffix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::arg;
    use crate::node::serial_nodes;
    use crate::output::RecordingOutput;

    fn one_cycle() -> Rc<Node> {
        serial_nodes(vec![Box::new(arg::<String>("item", "").build())])
    }

    #[test]
    fn runs_minimum_cycles_and_stops_when_input_is_exhausted() {
        let node = serial_nodes(vec![Box::new(repeater(one_cycle(), 1, Input::UNBOUNDED))]);
        let mut input = Input::new(["a", "b", "c"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        crate::walker::execute(node, &mut input, &mut output, &mut data).unwrap();
        assert!(input.fully_processed());
    }

    #[test]
    fn propagates_not_enough_args_when_minimum_cycles_cannot_be_met() {
        let repeated = repeater(one_cycle(), 2, 0);
        let mut input = Input::new(["only-one"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        let err = repeated.execute(&mut input, &mut output, &mut data, &mut exec).unwrap_err();
        assert!(matches!(err, CommandError::NotEnoughArgs { .. }));
    }

    #[test]
    fn stops_at_optional_cap_even_with_tokens_remaining() {
        let repeated = repeater(one_cycle(), 0, 2);
        let mut input = Input::new(["a", "b", "c"]);
        let mut data = Data::new();
        let mut output = RecordingOutput::default();
        let mut exec = ExecuteData::new();
        repeated.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(input.remaining_tokens(), vec!["c"]);
    }
}
