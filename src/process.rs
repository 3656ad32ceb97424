//! Blocking subprocess runner used by build scripts.
//!
//! A [`RunCommand`] describes one invocation: the argument vector plus the
//! handful of knobs build scripts need (working directory, stdin payload,
//! which streams to capture, whether to wrap the call in the chroot entry
//! script and how to treat failures). It is consumed by one of three
//! terminal operations:
//!
//! * [`RunCommand::run`] returns a [`CommandOutput`] and fails on a nonzero
//!   exit status,
//! * [`RunCommand::output`] is `run` reduced to the captured stdout text,
//! * [`RunCommand::status`] returns the raw exit status and never looks at it.
//!
//! With [`RunCommand::error_ok`] every failure is downgraded to a
//! [`warning`](crate::log::warning) and the call returns normally.

use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::log::{info, warning};

/// Wrapper script that re-executes its arguments inside the chroot.
pub const DEFAULT_ENTER_CHROOT: &str = "./enter_chroot.sh";

/// Environment variable overriding [`DEFAULT_ENTER_CHROOT`].
pub const ENTER_CHROOT_ENV: &str = "BUILDHELP_ENTER_CHROOT";

/// Program and arguments of a command.
///
/// A single string is split on whitespace; no shell quoting is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    pub fn args(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for CommandLine {
    fn from(cmd: &str) -> Self {
        Self(cmd.split_whitespace().map(str::to_string).collect())
    }
}

impl From<String> for CommandLine {
    fn from(cmd: String) -> Self {
        Self::from(cmd.as_str())
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(argv: Vec<String>) -> Self {
        Self(argv)
    }
}

impl From<&[String]> for CommandLine {
    fn from(argv: &[String]) -> Self {
        Self(argv.to_vec())
    }
}

impl From<Vec<&str>> for CommandLine {
    fn from(argv: Vec<&str>) -> Self {
        Self(argv.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandLine {
    fn from(argv: [&str; N]) -> Self {
        Self(argv.iter().map(|s| s.to_string()).collect())
    }
}

/// Result of a finished (or suppressed) command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// The argument vector actually executed, chroot wrapper included.
    pub argv: Vec<String>,
    /// Captured stdout; empty when stdout was inherited.
    pub stdout: String,
    /// Captured stderr; empty when stderr was inherited.
    pub stderr: String,
    /// Exit status, `None` when the process could not be started and the
    /// failure was suppressed.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Builder for a single blocking command invocation.
#[derive(Debug, Clone)]
pub struct RunCommand {
    cmd: CommandLine,
    cwd: Option<PathBuf>,
    input: Option<Vec<u8>>,
    redirect_stdout: bool,
    redirect_stderr: bool,
    enter_chroot: bool,
    print_cmd: bool,
    error_ok: bool,
    error_message: Option<String>,
    caller: Option<String>,
}

impl RunCommand {
    pub fn new(cmd: impl Into<CommandLine>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: None,
            input: None,
            redirect_stdout: false,
            redirect_stderr: false,
            enter_chroot: false,
            print_cmd: true,
            error_ok: false,
            error_message: None,
            caller: None,
        }
    }

    /// Run the command in `dir` instead of the current directory.
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Bytes written to the child's stdin. Without a payload stdin is inherited.
    pub fn input(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.input = Some(payload.into());
        self
    }

    pub fn redirect_stdout(mut self, capture: bool) -> Self {
        self.redirect_stdout = capture;
        self
    }

    pub fn redirect_stderr(mut self, capture: bool) -> Self {
        self.redirect_stderr = capture;
        self
    }

    /// Prefix the command with the chroot entry script. The working
    /// directory must then be the directory holding that script.
    pub fn enter_chroot(mut self, enter: bool) -> Self {
        self.enter_chroot = enter;
        self
    }

    pub fn print_cmd(mut self, print: bool) -> Self {
        self.print_cmd = print;
        self
    }

    pub fn error_ok(mut self, ok: bool) -> Self {
        self.error_ok = ok;
        self
    }

    /// Text reported instead of the captured output when the command fails.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Label shown as `PROGRAM(<caller>)` in the pre-run info line.
    pub fn caller(mut self, label: impl Into<String>) -> Self {
        self.caller = Some(label.into());
        self
    }

    /// Full argument vector that will be executed.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.cmd.args().len() + 2);
        if self.enter_chroot {
            argv.push(enter_chroot_script());
            argv.push("--".to_string());
        }
        argv.extend(self.cmd.args().iter().cloned());
        argv
    }

    /// Run to completion, failing on a nonzero exit status unless
    /// [`error_ok`](Self::error_ok) is set.
    pub fn run(&self) -> Result<CommandOutput> {
        let output = match self.execute() {
            Ok(output) => output,
            Err(err) => {
                self.suppress(err)?;
                return Ok(CommandOutput {
                    argv: self.argv(),
                    ..CommandOutput::default()
                });
            }
        };

        if let Some(code) = output.exit_code.filter(|code| *code != 0) {
            self.suppress(self.failure(&output, code))?;
        }
        Ok(output)
    }

    /// Like [`run`](Self::run) but only returns captured stdout.
    pub fn output(&self) -> Result<String> {
        self.run().map(|output| output.stdout)
    }

    /// Run to completion and return the exit status without judging it.
    ///
    /// Only a failure to start or wait for the process is an error; with
    /// [`error_ok`](Self::error_ok) that is warned about and `-1` returned.
    pub fn status(&self) -> Result<i32> {
        match self.execute() {
            Ok(output) => Ok(output.exit_code.unwrap_or(-1)),
            Err(err) => self.suppress(err).map(|()| -1),
        }
    }

    fn suppress(&self, err: Error) -> Result<()> {
        if self.error_ok {
            warning(&err.to_string());
            Ok(())
        } else {
            Err(err)
        }
    }

    fn failure(&self, output: &CommandOutput, exit_code: i32) -> Error {
        let detail = [
            self.error_message.as_deref().unwrap_or(""),
            output.stderr.as_str(),
            output.stdout.as_str(),
        ]
        .into_iter()
        .find(|text| !text.is_empty())
        .unwrap_or("")
        .to_string();

        Error::CommandFailed {
            command: format!("{:?}", output.argv),
            exit_code,
            detail,
        }
    }

    fn execute(&self) -> Result<CommandOutput> {
        let argv = self.argv();
        let (program, args) = argv.split_first().ok_or(Error::EmptyCommand)?;

        if self.print_cmd {
            let dir = self
                .cwd
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| ".".to_string());
            info(&format!(
                "PROGRAM({}) -> RunCommand: {:?} in dir {}",
                self.caller_name(),
                argv,
                dir
            ));
        }

        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
            .stdin(pipe_if(self.input.is_some()))
            .stdout(pipe_if(self.redirect_stdout))
            .stderr(pipe_if(self.redirect_stderr));

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;

        // Feed stdin from its own thread; writing everything up front could
        // block forever against a child that fills its stdout pipe first.
        let writer = match (child.stdin.take(), self.input.clone()) {
            (Some(mut stdin), Some(payload)) => Some(thread::spawn(move || -> io::Result<()> {
                stdin.write_all(&payload)
            })),
            _ => None,
        };

        let output = child.wait_with_output()?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                // The child may exit without draining stdin.
                Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => {
                    return Err(io::Error::new(io::ErrorKind::Other, "stdin writer thread panicked").into())
                }
            }
        }

        Ok(CommandOutput {
            argv,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: Some(exit_code_of(output.status)),
        })
    }

    fn caller_name(&self) -> String {
        self.caller.clone().unwrap_or_else(default_caller)
    }
}

fn pipe_if(capture: bool) -> Stdio {
    if capture {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

fn enter_chroot_script() -> String {
    env::var(ENTER_CHROOT_ENV).unwrap_or_else(|_| DEFAULT_ENTER_CHROOT.to_string())
}

/// Base name of the running program, the stand-in when no caller label is set.
fn default_caller() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Numeric exit status; on Unix a signal death maps to `128 + signal` the way
/// shells report it.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_commands_split_on_whitespace() {
        let cmd = CommandLine::from("  make -j4   install ");
        assert_eq!(cmd.args(), ["make", "-j4", "install"]);
    }

    #[test]
    fn chroot_prefix_goes_first() {
        let run = RunCommand::new(["emerge", "-uDN", "world"]).enter_chroot(true);
        let argv = run.argv();
        assert_eq!(argv[1], "--");
        assert_eq!(&argv[2..], ["emerge", "-uDN", "world"]);
    }

    #[test]
    fn failure_detail_prefers_custom_message() {
        let run = RunCommand::new(["x"]).error_message("custom");
        let output = CommandOutput {
            argv: vec!["x".into()],
            stdout: "out".into(),
            stderr: "err".into(),
            exit_code: Some(3),
        };
        let err = run.failure(&output, 3);
        assert_eq!(err.to_string(), "Command \"[\"x\"]\" failed.\ncustom");
        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn failure_detail_falls_back_to_stderr_then_stdout() {
        let run = RunCommand::new(["x"]);
        let mut output = CommandOutput {
            argv: vec!["x".into()],
            stdout: "out".into(),
            stderr: "err".into(),
            exit_code: Some(1),
        };
        assert!(run.failure(&output, 1).to_string().ends_with("\nerr"));
        output.stderr.clear();
        assert!(run.failure(&output, 1).to_string().ends_with("\nout"));
    }
}
