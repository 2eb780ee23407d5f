//! External command execution.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A command line to run in a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Program name or path
    pub program: String,

    /// Arguments
    pub args: Vec<String>,

    /// Working directory
    pub cwd: Option<PathBuf>,

    /// Text written to the child's stdin
    pub stdin: Option<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Program and arguments joined by spaces, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Errors from running external commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// Runs external commands.
pub trait CommandRunner {
    /// Run `command` to completion. A non-zero exit is reported in the
    /// output, not as an error.
    fn run(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError>;

    /// Run `command`, treating a non-zero exit as an error.
    fn run_checked(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        let output = self.run(command)?;
        if output.success {
            Ok(output)
        } else {
            Err(CommandError::Failed {
                command: command.command_line(),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        let spawn_error = |source: std::io::Error| CommandError::Spawn {
            command: command.command_line(),
            source,
        };

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &command.cwd {
            process.current_dir(cwd);
        }

        tracing::debug!("Running {}", command.command_line());
        let mut child = process.spawn().map_err(spawn_error)?;

        // stdin is written on its own thread while wait_with_output drains
        // stdout and stderr.
        let writer = match (child.stdin.take(), command.stdin.clone()) {
            (Some(mut pipe), Some(data)) => Some(std::thread::spawn(move || {
                pipe.write_all(data.as_bytes())
            })),
            _ => None,
        };

        let output = child.wait_with_output().map_err(spawn_error)?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(result) => result.map_err(spawn_error)?,
                Err(_) => {
                    return Err(spawn_error(std::io::Error::other(
                        "stdin writer thread panicked",
                    )))
                }
            }
        }

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Runner that answers from a closure and records every command.
    pub(crate) struct FakeRunner<F> {
        respond: F,
        pub(crate) calls: RefCell<Vec<ExternalCommand>>,
    }

    impl<F> FakeRunner<F>
    where
        F: Fn(&ExternalCommand) -> CommandOutput,
    {
        pub(crate) fn new(respond: F) -> Self {
            Self {
                respond,
                calls: RefCell::new(Vec::new()),
            }
        }

        /// Recorded argument lists, in call order.
        pub(crate) fn args(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(|c| c.args.clone()).collect()
        }
    }

    impl<F> CommandRunner for FakeRunner<F>
    where
        F: Fn(&ExternalCommand) -> CommandOutput,
    {
        fn run(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError> {
            self.calls.borrow_mut().push(command.clone());
            Ok((self.respond)(command))
        }
    }
}
