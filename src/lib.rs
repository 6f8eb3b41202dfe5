//! A tiny interactive shell in the xv6 tradition.
//!
//! The crate implements a line-oriented command interpreter: one line is read
//! per iteration, split into space-delimited words, scanned for `<`/`>`
//! redirections, and dispatched either to a built-in (`cd`, `exit`, `about`)
//! or to an external program which is spawned and waited on synchronously.
//! There is deliberately no job control, no pipelines, no globbing and no
//! quoting; the grammar is exactly one command per line.
//!
//! The main entry point is [`Interpreter`], which drives the REPL and can also
//! execute a single line programmatically via [`Interpreter::run_line`]. The
//! public modules [`command`], [`parser`] and [`env`] expose the traits and
//! types needed to implement additional commands; [`io_adapters`] provides
//! in-memory
//! stand-ins for the standard streams, mainly useful in tests.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod io_adapters;
mod lexer;
pub mod parser;

/// Convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
