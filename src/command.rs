use crate::env::Environment;
use crate::parser::CommandLine;
use anyhow::Result;
use std::io::{Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Implementors typically wrap the shell's own standard input or, in tests,
/// an in-memory buffer.
pub trait Stdin: Read {
    /// Convert this input into a [`Stdio`] handle suitable for
    /// `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for
    /// `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

/// Object-safe trait for any command the shell can run.
///
/// Implemented by built-ins via a blanket impl and by external commands.
/// The streams passed in are the shell's inherited standard input/output;
/// a command that carries redirection targets opens them itself, which keeps
/// per-command redirection policy (built-ins honor only `>`, and only some
/// of them) out of the dispatch loop.
pub trait ExecutableCommand {
    /// Executes the command to completion.
    ///
    /// The streams are consumed: a command that spawns a child converts them
    /// into that child's handles. If a spawn attempt fails and the command
    /// retries at another location, the retry runs on the process's own
    /// standard streams, since the originals went to the first attempt.
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a resolved invocation.
///
/// Returns `None` when the factory doesn't recognize `cmd.argv[0]`; the
/// interpreter probes its factories in order and runs the first match.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided invocation.
    fn try_create(
        &self,
        env: &Environment,
        cmd: &CommandLine<'_>,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
