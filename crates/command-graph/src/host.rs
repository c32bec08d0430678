//! Process entry point tying the node graph to `argv`, exit codes, and logging
//! (§4.9, ambient).

use std::rc::Rc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;
use crate::input::Input;
use crate::node::Node;
use crate::output::{Output, StdOutput};
use crate::walker;

/// Word-index-to-complete carrier (§4.9's "well-known environment variable").
/// Unset means "execute mode."
pub const COMPLETE_INDEX_ENV: &str = "COMMAND_GRAPH_COMPLETE_INDEX";

/// Raises log verbosity and makes bash-execution helpers print the path of the
/// temporary script before running it (§6).
pub const DEBUG_ENV: &str = "LEEP_FROG_DEBUG";

/// Process exit code for a usage-class error (bad arguments, failed validation).
pub const EXIT_USAGE_ERROR: i32 = 1;
/// Process exit code for an internal failure (I/O, a bug in the node graph).
pub const EXIT_INTERNAL_ERROR: i32 = 2;

/// Indirections over ambient process state, so a host (and this crate's own
/// tests) can inject fakes instead of mutating real environment/filesystem/clock
/// globals (§4.9 "Global var overrides for testing").
pub struct HostServices {
    pub args: Box<dyn Fn() -> Vec<String>>,
    pub env: Box<dyn Fn(&str) -> Option<String>>,
    pub now_unix_seconds: Box<dyn Fn() -> u64>,
    pub current_dir: Box<dyn Fn() -> std::io::Result<std::path::PathBuf>>,
}

impl HostServices {
    /// The real process: `std::env::args`, `std::env::var`, the system clock,
    /// and the real current directory.
    pub fn real() -> Self {
        HostServices {
            args: Box::new(|| std::env::args().skip(1).collect()),
            env: Box::new(|key| std::env::var(key).ok()),
            now_unix_seconds: Box::new(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0)
            }),
            current_dir: Box::new(std::env::current_dir),
        }
    }
}

impl Default for HostServices {
    fn default() -> Self {
        HostServices::real()
    }
}

fn init_logging(services: &HostServices) {
    use tracing_subscriber::{fmt, EnvFilter};
    let verbose = (services.env)(DEBUG_ENV).is_some_and(|v| !v.is_empty());
    let filter = if verbose { "debug" } else { "warn" };
    // Fails (and is ignored) when a subscriber is already installed, e.g. across
    // repeated calls within one test binary.
    let _ = fmt().with_env_filter(EnvFilter::new(filter)).try_init();
}

fn flush_executable(output: &mut dyn Output, lines: &[String], function_wrap: bool) {
    if lines.is_empty() {
        return;
    }
    if function_wrap {
        output.stdout("_command_graph_exec() {");
    }
    for line in lines {
        output.stdout(line);
    }
    if function_wrap {
        output.stdout("}");
        output.stdout("_command_graph_exec");
    }
}

fn render_completion(completion: &Completion, last_token: &str, output: &mut dyn Output) {
    for line in completion.render(last_token, None, &[]) {
        output.stdout(&line);
    }
}

/// Parse `argv` (via `services`), walk `root` in Execute or Complete mode
/// depending on [`COMPLETE_INDEX_ENV`], and return the process exit code.
pub fn run(root: Rc<Node>, services: &HostServices) -> i32 {
    init_logging(services);
    let mut output = StdOutput;
    run_with_output(root, services, &mut output)
}

/// As [`run`], but writing through a caller-supplied `Output` instead of the
/// real stdout/stderr — used by tests and by hosts embedding their own sink.
pub fn run_with_output(root: Rc<Node>, services: &HostServices, output: &mut dyn Output) -> i32 {
    let tokens = (services.args)();

    if let Some(index) = (services.env)(COMPLETE_INDEX_ENV) {
        return run_complete(root, &tokens, &index, output);
    }

    run_execute(root, &tokens, output)
}

fn run_execute(root: Rc<Node>, tokens: &[String], output: &mut dyn Output) -> i32 {
    let mut input = Input::new(tokens.iter().cloned());
    let mut data = Data::new();
    match walker::execute(root, &mut input, output, &mut data) {
        Ok(mut exec) => {
            flush_executable(output, &exec.executable, exec.function_wrap);
            if let Err(err) = exec.run_deferred(output, &mut data) {
                tracing::warn!(error = %err, "host: deferred run failed");
                output.annotate_error(&err);
                return exit_code_for(&err);
            }
            0
        }
        Err(err) => {
            tracing::warn!(error = %err, "host: execute failed");
            output.annotate_error(&err);
            exit_code_for(&err)
        }
    }
}

fn run_complete(root: Rc<Node>, tokens: &[String], index: &str, output: &mut dyn Output) -> i32 {
    let index: usize = match index.parse() {
        Ok(i) => i,
        Err(_) => return EXIT_USAGE_ERROR,
    };
    let up_to: Vec<String> = tokens.iter().take(index).cloned().collect();
    let last_token = tokens.get(index).cloned().unwrap_or_default();

    let mut input = Input::new(up_to);
    let mut data = Data::new();
    match walker::complete(root, &mut input, &mut data) {
        Ok(completion) => {
            render_completion(&completion, &last_token, output);
            0
        }
        Err(err) => {
            output.annotate_error(&err);
            exit_code_for(&err)
        }
    }
}

fn exit_code_for(err: &CommandError) -> i32 {
    if err.is_usage_error() {
        EXIT_USAGE_ERROR
    } else {
        EXIT_INTERNAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::arg;
    use crate::node::serial_nodes;
    use crate::output::RecordingOutput;

    fn fake_services(args: Vec<&str>, env_vars: Vec<(&'static str, &'static str)>) -> HostServices {
        let args: Vec<String> = args.into_iter().map(String::from).collect();
        HostServices {
            args: Box::new(move || args.clone()),
            env: Box::new(move |key| env_vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())),
            now_unix_seconds: Box::new(|| 0),
            current_dir: Box::new(|| Ok(std::path::PathBuf::from("/"))),
        }
    }

    #[test]
    fn successful_execute_returns_zero_and_prints_executable_lines() {
        let root = serial_nodes(vec![Box::new(
            crate::special::SimpleExecutableProcessor::new(["echo hi"]),
        )]);
        let services = fake_services(vec![], vec![]);
        let mut output = RecordingOutput::default();
        let code = run_with_output(root, &services, &mut output);
        assert_eq!(code, 0);
        assert_eq!(output.stdout_lines, vec!["echo hi"]);
    }

    #[test]
    fn usage_error_exits_with_the_usage_error_code() {
        let root = serial_nodes(vec![Box::new(arg::<String>("name", "").build())]);
        let services = fake_services(vec![], vec![]);
        let mut output = RecordingOutput::default();
        let code = run_with_output(root, &services, &mut output);
        assert_eq!(code, EXIT_USAGE_ERROR);
        assert_eq!(output.stderr_lines.len(), 1);
    }

    #[test]
    fn complete_mode_is_selected_by_the_index_env_var() {
        let root = serial_nodes(vec![Box::new(arg::<String>("name", "").build())]);
        let services = fake_services(vec!["al"], vec![(COMPLETE_INDEX_ENV, "0")]);
        let mut output = RecordingOutput::default();
        let code = run_with_output(root, &services, &mut output);
        assert_eq!(code, 0);
    }
}
