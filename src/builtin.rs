use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::parser::CommandLine;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Printed when the shell terminates, whether via `exit` or end of input.
pub(crate) const FAREWELL: &str = "bye";

/// Fixed identification line printed by `about`.
const ABOUT_MESSAGE: &str = "myshell, a tiny educational shell";

/// Status reported by `exit` when its argument fails validation. The command
/// was still recognized as `exit`, so the shell terminates regardless.
const INVALID_STATUS: ExitCode = -1;

/// Built-in commands known to the shell at compile time.
///
/// Built-ins execute directly in-process without spawning a child. Dispatch
/// is by exact match on the command name; anything else falls through to the
/// external launcher.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Builds the command from an invocation whose `argv[0]` already matched
    /// [`name`](Self::name). Each built-in picks out the arguments and
    /// redirection targets it cares about and ignores the rest, matching the
    /// per-command redirection policy of the original shell.
    fn build(cmd: &CommandLine<'_>) -> Self;

    /// Executes the command using the provided IO streams and environment.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for
    /// error. Operational failures are reported as `Err` and surface to the
    /// user as the generic diagnostic.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        BuiltinCommand::execute(*self, &mut stdin, &mut stdout, env)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        cmd: &CommandLine<'_>,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if cmd.argv.first().copied() == Some(T::name()) {
            Some(Box::new(T::build(cmd)))
        } else {
            None
        }
    }
}

/// Change the process working directory; defaults to the filesystem root.
pub struct Cd {
    pub target: Option<PathBuf>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn build(cmd: &CommandLine<'_>) -> Self {
        Cd {
            target: cmd.argv.get(1).map(PathBuf::from),
        }
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let target = self.target.unwrap_or_else(|| PathBuf::from("/"));
        std::env::set_current_dir(&target)
            .with_context(|| format!("cd: can't chdir to {}", target.display()))?;
        env.current_dir =
            std::env::current_dir().context("cd: working directory unreadable after chdir")?;
        Ok(0)
    }
}

/// Terminate the shell with an optional explicit status.
pub struct Exit {
    pub code: Option<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn build(cmd: &CommandLine<'_>) -> Self {
        Exit {
            code: cmd.argv.get(1).map(|arg| arg.to_string()),
        }
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let status = match &self.code {
            None => 0,
            Some(arg) => parse_exit_status(arg).unwrap_or(INVALID_STATUS),
        };
        writeln!(stdout, "{FAREWELL}")?;
        writeln!(stdout, "Returning status code: {status}")?;
        env.exit_status = Some(status);
        Ok(0)
    }
}

/// Print the shell's identification line, honoring `>` redirection.
pub struct About {
    pub redirect_out: Option<PathBuf>,
}

impl BuiltinCommand for About {
    fn name() -> &'static str {
        "about"
    }

    fn build(cmd: &CommandLine<'_>) -> Self {
        About {
            redirect_out: cmd.stdout_redirect.map(PathBuf::from),
        }
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        match self.redirect_out {
            Some(path) => {
                // The inherited stream is never touched, so there is nothing
                // to restore on the open-failure path.
                let mut file = File::create(&path)
                    .with_context(|| format!("about: can't create {}", path.display()))?;
                writeln!(file, "{ABOUT_MESSAGE}")?;
            }
            None => writeln!(stdout, "{ABOUT_MESSAGE}")?,
        }
        Ok(0)
    }
}

/// Validates an `exit` status argument.
///
/// Accepted form: optional leading `-`, then decimal digits with no leading
/// zero unless the digit string is exactly `0`; the value must land in
/// [-128, 127]. Anything else yields `None` and the caller substitutes the
/// sentinel status.
pub(crate) fn parse_exit_status(arg: &str) -> Option<ExitCode> {
    let negative = arg.starts_with('-');
    let digits = if negative { &arg[1..] } else { arg };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }

    let magnitude: i64 = digits.parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    if (-128..=127).contains(&value) {
        Some(value as ExitCode)
    } else {
        None
    }
}
