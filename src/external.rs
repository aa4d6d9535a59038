use crate::env::Environment;
use crate::parser::{Pipeline, SimpleCommand};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Launch one external program and honor its modifiers.
///
/// Redirection files are opened before the child exists, so a bad path
/// fails the dispatch without launching anything. A foreground child is
/// waited on without inspecting its exit status; a background child is
/// announced on `stdout` and its handle released, never to be reaped by
/// the shell.
pub fn run_simple(env: &Environment, cmd: &SimpleCommand, stdout: &mut dyn Write) -> Result<()> {
    let program = resolve_program(env, &cmd.argv[0])?;

    let mut command = Command::new(program.as_ref());
    command
        .args(&cmd.argv[1..])
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir);

    if let Some(path) = &cmd.stdin {
        let path = resolve_redirect(env, path);
        let file =
            File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
        command.stdin(Stdio::from(file));
    }
    if let Some(path) = &cmd.stdout {
        let path = resolve_redirect(env, path);
        let file =
            File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        command.stdout(Stdio::from(file));
    }

    let child = command
        .spawn()
        .with_context(|| format!("failed to launch {}", cmd.argv[0]))?;

    if cmd.background {
        writeln!(stdout, "[background pid {}]", child.id())?;
        return Ok(());
    }

    reap(child, &cmd.argv[0])
}

/// Launch both pipeline stages with the first's standard output feeding
/// the second's standard input, then wait for both.
///
/// Both programs are resolved up front, so an unknown stage launches
/// nothing. Moving the pipe's read end into the second spawn leaves the
/// shell holding neither end, and neither child ever blocks on a
/// descriptor the shell still owns. A pipeline always runs in the
/// foreground.
pub fn run_pipeline(env: &Environment, pipeline: &Pipeline) -> Result<()> {
    let first_program = resolve_program(env, &pipeline.first[0])?;
    let second_program = resolve_program(env, &pipeline.second[0])?;

    let mut first = Command::new(first_program.as_ref())
        .args(&pipeline.first[1..])
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to launch {}", pipeline.first[0]))?;

    let pipe = match first.stdout.take() {
        Some(pipe) => pipe,
        None => {
            let _ = first.wait();
            anyhow::bail!("no pipe from {}", pipeline.first[0]);
        }
    };

    let second = Command::new(second_program.as_ref())
        .args(&pipeline.second[1..])
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .stdin(Stdio::from(pipe))
        .spawn();

    let second = match second {
        Ok(child) => child,
        Err(err) => {
            // Stage one is already running; reap it before reporting.
            let _ = first.wait();
            return Err(err).with_context(|| format!("failed to launch {}", pipeline.second[0]));
        }
    };

    // Both children must be reaped, whichever finishes first.
    let first_done = reap(first, &pipeline.first[0]);
    let second_done = reap(second, &pipeline.second[0]);
    first_done.and(second_done)
}

/// Block until the child terminates. Only the fact of termination matters;
/// the status value is not inspected.
fn reap(mut child: Child, name: &str) -> Result<()> {
    child
        .wait()
        .with_context(|| format!("failed to wait for {}", name))?;
    Ok(())
}

fn resolve_program<'a>(env: &Environment, name: &'a str) -> Result<Cow<'a, Path>> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    find_command_path(OsStr::new(&search_paths), Path::new(name))
        .ok_or_else(|| anyhow::anyhow!("command not found: {}", name))
}

/// Redirection filenames follow the session directory, not the directory
/// the shell was started from.
fn resolve_redirect(env: &Environment, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env.current_dir.join(path)
    }
}

/// Resolve a program name the way a shell's lookup would.
///
/// - Absolute path: returned as-is when it exists.
/// - `./`-prefixed, or any relative path with more than one component
///   (e.g. `bin/tool`): checked against the current directory.
/// - Single component: searched through the `search_paths` directories,
///   first existing match wins.
/// - Empty input resolves to nothing.
///
/// Returns the provided `path` borrowed, or an owned `PathBuf` when the
/// match came out of the search-path walk.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(component), None) => {
            find_in_path(search_paths, component.as_os_str()).map(Cow::Owned)
        }
        // Multi-component relative path, e.g. `bin/tool`.
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let candidate = dir.join(cmd);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
