//! A small interactive command interpreter.
//!
//! This crate reads a command line, classifies it (builtin, simple command,
//! or a two-stage pipeline), launches the external programs involved with
//! their standard streams wired up (redirection files or a pipe), and waits
//! for foreground children. It is intentionally small and easy to read,
//! suitable for coursework and experiments with process management.
//!
//! The main entry point is [`Interpreter`], which owns the session state
//! and drives the prompt-read-dispatch loop. The public modules expose the
//! pieces a caller might want on their own: [`parser`] for classification,
//! [`history`] for the bounded session log, [`env`] for the process
//! environment view, and [`command`] for plugging in builtin commands.

mod builtin;
pub mod command;
pub mod env;
mod external;
pub mod history;
mod interpreter;
mod lexer;
pub mod parser;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
