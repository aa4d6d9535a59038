use crate::builtin::{Cd, Exit, History};
use crate::command::CommandFactory;
use crate::env::Environment;
use crate::external;
use crate::history::HistoryLog;
use crate::parser::{self, Command};
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only builtin commands defined in this crate go through factories;
/// external programs take the process launcher path instead.
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

/// The interactive command interpreter.
///
/// Owns the session state: an [`Environment`] (variables, working
/// directory, termination flag), the display [`HistoryLog`], and the
/// factories for the builtin commands. Each input line flows through
/// [`Interpreter::handle_line`]; [`Interpreter::repl`] drives the
/// prompt-read-dispatch loop until `exit` or end of input.
pub struct Interpreter {
    env: Environment,
    history: HistoryLog,
    builtins: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with a custom set of builtin factories.
    pub fn new(builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            history: HistoryLog::default(),
            builtins,
        }
    }

    /// The session environment, read-only.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The display history, read-only.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Process one input line: record it, classify it, dispatch it.
    ///
    /// An empty line is skipped entirely. Every other line lands in the
    /// history log before classification, so lines that later fail to
    /// parse or launch are still listed by `history`. Errors from any
    /// stage are returned for the caller to report; none of them end the
    /// session.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        self.handle_line_with_output(line, &mut std::io::stdout())
    }

    fn handle_line_with_output(&mut self, line: &str, stdout: &mut dyn Write) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        self.history.append(line);

        match parser::parse_line(line)? {
            None => Ok(()),
            Some(Command::Builtin { argv }) => self.run_builtin(&argv, stdout),
            Some(Command::Simple(cmd)) => external::run_simple(&self.env, &cmd, stdout),
            Some(Command::Pipeline(pipeline)) => external::run_pipeline(&self.env, &pipeline),
        }
    }

    fn run_builtin(&mut self, argv: &[String], stdout: &mut dyn Write) -> Result<()> {
        let name = argv[0].as_str();
        let args: Vec<&str> = argv[1..].iter().map(String::as_str).collect();
        for factory in &self.builtins {
            if let Some(cmd) = factory.try_create(name, &args) {
                cmd.execute(stdout, &mut self.env, &self.history)?;
                return Ok(());
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Drive the prompt-read-dispatch loop until `exit` or end of input.
    ///
    /// Ctrl-C while reading a line cancels that line and re-prompts; the
    /// session only ends on the `exit` builtin, end of input, or an
    /// unrecoverable read error. Dispatch errors are printed to standard
    /// error with their context chain and the loop continues.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        #[cfg(unix)]
        install_interrupt_handler();

        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            let readline = rl.readline(&self.render_prompt());
            match readline {
                Ok(line) => {
                    // The editor's recall history (up-arrow) is separate
                    // from the display history the `history` builtin lists.
                    rl.add_history_entry(line.as_str())?;
                    if let Err(err) = self.handle_line(&line) {
                        eprintln!("{:#}", err);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    eprintln!("read error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn render_prompt(&self) -> String {
        let user = self.env.get_var("USER").unwrap_or_else(|| "user".to_string());
        format!(
            "\x1b[1;32m{}@myshell\x1b[0m:\x1b[1;34m{}\x1b[0m$ ",
            user,
            self.env.current_dir.display()
        )
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the three builtins: `exit`, `cd`,
    /// `history`.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<History>::default()),
        ])
    }
}

/// Catch SIGINT delivered outside the line reader, e.g. during a
/// foreground wait. The handler emits a bare newline and nothing else
/// (only async-signal-safe calls are allowed there); `SA_RESTART` lets
/// the interrupted wait resume. The signal is not forwarded to children;
/// the terminal's own process-group delivery is what ends a foreground
/// child.
#[cfg(unix)]
fn install_interrupt_handler() {
    extern "C" fn on_interrupt(_sig: libc::c_int) {
        let newline = b"\n";
        unsafe {
            libc::write(libc::STDOUT_FILENO, newline.as_ptr().cast(), 1);
        }
    }

    let handler: extern "C" fn(libc::c_int) = on_interrupt;
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut());
    }
}
