use crate::command::ExitCode;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable shell state that outlives individual commands.
///
/// The working directory is the only piece of state a command can change
/// that later commands observe (`cd` mutates it, every spawned child
/// inherits it). `exit_status` is the termination request channel: `exit`
/// records the status here instead of killing the process mid-command, and
/// the REPL driver acts on it after the command returns.
#[derive(Debug, Clone)]
pub struct Environment {
    pub current_dir: PathBuf,
    pub exit_status: Option<ExitCode>,
}

impl Environment {
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            exit_status: None,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
