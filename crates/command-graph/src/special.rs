//! Executable appenders and conditional processors (§4.8).

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::Input;
use crate::node::{ExecuteData, Processor};
use crate::output::Output;
use crate::usage::UsageBuilder;

/// Appends a fixed set of shell-executable lines to [`ExecuteData::executable`].
pub struct SimpleExecutableProcessor {
    lines: Vec<String>,
}

impl SimpleExecutableProcessor {
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SimpleExecutableProcessor {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl Processor for SimpleExecutableProcessor {
    fn execute(
        &self,
        _input: &mut Input,
        _output: &mut dyn Output,
        _data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        exec.executable.extend(self.lines.iter().cloned());
        Ok(())
    }

    fn complete(&self, _input: &mut Input, _data: &mut Data) -> Result<Option<Completion>, CommandError> {
        Ok(None)
    }
}

/// Appends lines computed from `Data` at execute time to
/// [`ExecuteData::executable`].
pub struct ExecutableProcessor {
    f: Box<dyn Fn(&Data) -> Result<Vec<String>, CommandError>>,
}

impl ExecutableProcessor {
    pub fn new(f: impl Fn(&Data) -> Result<Vec<String>, CommandError> + 'static) -> Self {
        ExecutableProcessor { f: Box::new(f) }
    }
}

impl Processor for ExecutableProcessor {
    fn execute(
        &self,
        _input: &mut Input,
        _output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        exec.executable.extend((self.f)(data)?);
        Ok(())
    }

    fn complete(&self, _input: &mut Input, _data: &mut Data) -> Result<Option<Completion>, CommandError> {
        Ok(None)
    }
}

/// Prints the lines accumulated in `ExecuteData.executable` so far, one per
/// `Output::stdout` call, each passed through an optional format function first.
pub struct EchoExecuteData {
    format: Option<Box<dyn Fn(&str) -> String>>,
}

impl EchoExecuteData {
    pub fn new() -> Self {
        EchoExecuteData { format: None }
    }

    pub fn with_format(format: impl Fn(&str) -> String + 'static) -> Self {
        EchoExecuteData { format: Some(Box::new(format)) }
    }
}

impl Default for EchoExecuteData {
    fn default() -> Self {
        EchoExecuteData::new()
    }
}

impl Processor for EchoExecuteData {
    fn execute(
        &self,
        _input: &mut Input,
        output: &mut dyn Output,
        _data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        for line in &exec.executable {
            match &self.format {
                Some(format) => output.stdout(&format(line)),
                None => output.stdout(line),
            }
        }
        Ok(())
    }

    fn complete(&self, _input: &mut Input, _data: &mut Data) -> Result<Option<Completion>, CommandError> {
        Ok(None)
    }
}

type Predicate = Box<dyn Fn(&Input, &Data) -> bool>;

/// Runs `inner` only when `predicate` holds; a no-op otherwise.
pub struct If {
    inner: Box<dyn Processor>,
    predicate: Predicate,
}

impl If {
    pub fn new(inner: Box<dyn Processor>, predicate: impl Fn(&Input, &Data) -> bool + 'static) -> Self {
        If { inner, predicate: Box::new(predicate) }
    }
}

impl Processor for If {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        if (self.predicate)(input, data) {
            self.inner.execute(input, output, data, exec)?;
        }
        Ok(())
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        if (self.predicate)(input, data) {
            self.inner.complete(input, data)
        } else {
            Ok(None)
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        self.inner.usage(builder);
    }
}

/// Runs `if_true` when `predicate` holds, `if_false` otherwise.
pub struct IfElse {
    if_true: Box<dyn Processor>,
    if_false: Box<dyn Processor>,
    predicate: Predicate,
}

impl IfElse {
    pub fn new(
        if_true: Box<dyn Processor>,
        if_false: Box<dyn Processor>,
        predicate: impl Fn(&Input, &Data) -> bool + 'static,
    ) -> Self {
        IfElse { if_true, if_false, predicate: Box::new(predicate) }
    }
}

impl Processor for IfElse {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        let branch = if (self.predicate)(input, data) { self.if_true.as_ref() } else { self.if_false.as_ref() };
        branch.execute(input, output, data, exec)
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        let predicate_holds = (self.predicate)(input, data);
        if predicate_holds {
            self.if_true.complete(input, data)
        } else {
            self.if_false.complete(input, data)
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        self.if_true.usage(builder);
    }
}

/// Runs `inner` only when `Data` holds `key` with a truthy value
/// ([`Data::is_truthy`]).
pub struct IfData {
    key: String,
    inner: Box<dyn Processor>,
}

impl IfData {
    pub fn new(key: impl Into<String>, inner: Box<dyn Processor>) -> Self {
        IfData { key: key.into(), inner }
    }
}

impl Processor for IfData {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut dyn Output,
        data: &mut Data,
        exec: &mut ExecuteData,
    ) -> Result<(), CommandError> {
        if data.is_truthy(&self.key) {
            self.inner.execute(input, output, data, exec)?;
        }
        Ok(())
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, CommandError> {
        if data.is_truthy(&self.key) {
            self.inner.complete(input, data)
        } else {
            Ok(None)
        }
    }

    fn usage(&self, builder: &mut UsageBuilder) {
        self.inner.usage(builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingOutput;

    #[test]
    fn simple_executable_processor_appends_fixed_lines() {
        let processor = SimpleExecutableProcessor::new(["echo hi", "echo bye"]);
        let mut input = Input::new::<_, String>([]);
        let mut output = RecordingOutput::default();
        let mut data = Data::new();
        let mut exec = ExecuteData::new();
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(exec.executable, vec!["echo hi", "echo bye"]);
    }

    #[test]
    fn executable_processor_computes_lines_from_data() {
        let processor = ExecutableProcessor::new(|data| {
            let name = data.get::<String>("name").cloned().unwrap_or_default();
            Ok(vec![format!("echo {name}")])
        });
        let mut input = Input::new::<_, String>([]);
        let mut output = RecordingOutput::default();
        let mut data = Data::new();
        data.set("name", "world".to_string());
        let mut exec = ExecuteData::new();
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(exec.executable, vec!["echo world"]);
    }

    #[test]
    fn echo_execute_data_prints_accumulated_lines_through_format() {
        let processor = EchoExecuteData::with_format(|line| format!("> {line}"));
        let mut input = Input::new::<_, String>([]);
        let mut output = RecordingOutput::default();
        let mut data = Data::new();
        let mut exec = ExecuteData::new();
        exec.executable.push("echo hi".to_string());
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(output.stdout_lines, vec!["> echo hi"]);
    }

    #[test]
    fn if_runs_inner_only_when_predicate_holds() {
        let processor = If::new(
            Box::new(SimpleExecutableProcessor::new(["ran"])),
            |_input, data| data.is_truthy("go"),
        );
        let mut input = Input::new::<_, String>([]);
        let mut output = RecordingOutput::default();
        let mut data = Data::new();
        let mut exec = ExecuteData::new();
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert!(exec.executable.is_empty());

        data.set("go", true);
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(exec.executable, vec!["ran"]);
    }

    #[test]
    fn if_else_picks_the_matching_branch() {
        let processor = IfElse::new(
            Box::new(SimpleExecutableProcessor::new(["true-branch"])),
            Box::new(SimpleExecutableProcessor::new(["false-branch"])),
            |_input, data| data.is_truthy("flag"),
        );
        let mut input = Input::new::<_, String>([]);
        let mut output = RecordingOutput::default();
        let mut data = Data::new();
        let mut exec = ExecuteData::new();
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(exec.executable, vec!["false-branch"]);
    }

    #[test]
    fn if_data_treats_absent_key_as_false_and_false_bool_as_false() {
        let processor = IfData::new("verbose", Box::new(SimpleExecutableProcessor::new(["ran"])));
        let mut input = Input::new::<_, String>([]);
        let mut output = RecordingOutput::default();
        let mut data = Data::new();
        let mut exec = ExecuteData::new();
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert!(exec.executable.is_empty());

        data.set("verbose", false);
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert!(exec.executable.is_empty());

        data.set("verbose", true);
        processor.execute(&mut input, &mut output, &mut data, &mut exec).unwrap();
        assert_eq!(exec.executable, vec!["ran"]);
    }
}
