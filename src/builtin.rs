use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::history::HistoryLog;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const BUILTIN_NAMES: [&str; 3] = ["exit", "cd", "history"];

/// True when `name` is handled in-process instead of by launching a
/// program. The classifier consults this for the first token of a line
/// only.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins parse their argument vector with [`argh`] (`FromArgs`) and run
/// inside the shell process, which is how they get to mutate the session
/// state no child could touch.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the session state.
    fn execute(
        self,
        stdout: &mut dyn Write,
        env: &mut Environment,
        history: &HistoryLog,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
        history: &HistoryLog,
    ) -> Result<ExitCode> {
        T::execute(*self, stdout, env, history)
    }
}

/// Stand-in produced when argh stops early: `--help` text destined for
/// stdout with a success code, or a usage error for the error channel.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        _history: &HistoryLog,
    ) -> Result<ExitCode> {
        if self.is_error {
            return Err(anyhow::anyhow!("{}", self.output.trim_end()));
        }
        stdout.write_all(self.output.as_bytes())?;
        Ok(0)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(command) => Box::new(command),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// End the session.
pub struct Exit {
    #[argh(positional, greedy)]
    /// trailing arguments are accepted and ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _history: &HistoryLog,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to, absolute or relative to the current one
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _history: &HistoryLog,
    ) -> Result<ExitCode> {
        let target = match self.target {
            Some(target) => PathBuf::from(target),
            None => return Err(anyhow::anyhow!("cd: expected argument")),
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        // Both views of the working directory move together, or neither
        // does.
        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize path {}", new_dir.display()))?;
        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't move to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the commands entered this session, oldest first.
pub struct History {
    #[argh(positional, greedy)]
    /// trailing arguments are accepted and ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        history: &HistoryLog,
    ) -> Result<ExitCode> {
        for (number, line) in history.entries() {
            writeln!(stdout, "{}: {}", number, line)?;
        }
        Ok(0)
    }
}

/// Serializes tests that touch the process-wide working directory; they
/// must not overlap, even across test modules.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}
