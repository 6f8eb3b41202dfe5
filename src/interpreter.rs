use crate::builtin::FAREWELL;
use crate::command::{CommandFactory, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::lexer;
use crate::parser::{self, CommandLine};
use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{Read, Write};
use std::process::Stdio;

const PROMPT: &str = "myshell$ ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate — the built-ins and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The shell's command interpreter.
///
/// Holds the [`Environment`] and an ordered list of [`CommandFactory`]
/// objects that are queried to create commands by name; the first match
/// runs. See [`Default`] for the factories wired in out of the box.
///
/// Example
/// ```
/// use myshell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run_line("about").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Shell state shared across commands, exposed for inspection.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Tokenizes, resolves redirections and dispatches a single input line.
    ///
    /// A blank line is a successful no-op. Any parse or execution failure is
    /// returned as an error; the REPL reports every one of them with the
    /// same generic diagnostic and keeps going.
    pub fn run_line(&mut self, line: &str) -> Result<ExitCode> {
        let words = lexer::split_words(line);
        if words.is_empty() {
            return Ok(0);
        }
        let cmd = parser::resolve_redirections(&words)
            .map_err(|e| anyhow!("parse error: {e:?}"))?;
        self.dispatch(&cmd)
    }

    fn dispatch(&mut self, cmd: &CommandLine<'_>) -> Result<ExitCode> {
        for factory in &self.commands {
            if let Some(exe) = factory.try_create(&self.env, cmd) {
                let stdin = Box::new(InheritedStdin(std::io::stdin()));
                let stdout = Box::new(InheritedStdout(std::io::stdout()));
                return exe.execute(stdin, stdout, &mut self.env);
            }
        }
        // Unreachable with the default factory set: the external launcher
        // accepts every non-empty invocation.
        Err(anyhow!("command not found: {}", cmd.argv[0]))
    }

    /// Runs the read-eval loop until `exit` or end of input, returning the
    /// status the shell process should terminate with.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    if self.run_line(&line).is_err() {
                        eprintln!("error");
                    }
                    if let Some(code) = self.env.exit_status {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!("{FAREWELL}");
                    return Ok(0);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default command set: the `cd`, `exit`
    /// and `about` built-ins, then the external launcher as catch-all.
    fn default() -> Self {
        use crate::builtin::{About, Cd, Exit};
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<About>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

struct InheritedStdin(std::io::Stdin);

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

struct InheritedStdout(std::io::Stdout);

impl Write for InheritedStdout {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl Stdout for InheritedStdout {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env as stdenv;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let mut p = stdenv::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("myshell_repl_{}_{}_{}", tag, std::process::id(), nanos));
        fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn blank_lines_are_successful_noops() {
        let mut sh = Interpreter::default();
        assert_eq!(sh.run_line("").unwrap(), 0);
        assert_eq!(sh.run_line("   \n").unwrap(), 0);
        assert_eq!(sh.env().exit_status, None);
    }

    #[test]
    fn malformed_redirections_are_reported() {
        let mut sh = Interpreter::default();
        assert!(sh.run_line(">").is_err());
        assert!(sh.run_line("cat < a < b").is_err());
        assert!(sh.run_line("> out").is_err());
    }

    #[test]
    fn about_with_redirection_writes_the_target_file() {
        let temp = make_unique_temp_dir("about");
        let target = temp.join("ident.txt");

        let mut sh = Interpreter::default();
        let line = format!("about > {}", target.display());
        assert_eq!(sh.run_line(&line).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "myshell, a tiny educational shell\n"
        );

        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn exit_requests_termination_with_the_parsed_status() {
        let mut sh = Interpreter::default();
        sh.run_line("exit 5").unwrap();
        assert_eq!(sh.env().exit_status, Some(5));

        let mut sh = Interpreter::default();
        sh.run_line("exit -129").unwrap();
        assert_eq!(sh.env().exit_status, Some(-1));
    }

    #[test]
    #[cfg(unix)]
    fn redirected_external_round_trip() {
        let temp = make_unique_temp_dir("roundtrip");
        let source = temp.join("in.txt");
        let sink = temp.join("out.txt");
        fs::write(&source, "through the shell\n").unwrap();

        let mut sh = Interpreter::default();
        let line = format!("/bin/cat < {} > {}", source.display(), sink.display());
        assert_eq!(sh.run_line(&line).unwrap(), 0);
        assert_eq!(fs::read_to_string(&sink).unwrap(), "through the shell\n");

        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    #[cfg(unix)]
    fn external_failure_surfaces_as_an_error() {
        let mut sh = Interpreter::default();
        assert!(sh.run_line("definitely-not-a-real-program-xyzzy").is_err());
    }
}
