use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable view of the process environment shared by the whole session.
///
/// The environment contains:
/// - `vars`: the variables every launched program inherits.
/// - `current_dir`: the working directory for builtins and launched programs.
/// - `should_exit`: a flag the read loop checks to know when to terminate.
///
/// Only the `cd` builtin moves `current_dir` and only the `exit` builtin
/// raises `should_exit`.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, USER).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// Variables are copied from `std::env::vars()` and `current_dir` comes
    /// from `std::env::current_dir()`. The `should_exit` flag starts false.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}
