use crate::builtin::is_builtin;
use crate::lexer::split_into_tokens;
use std::fmt;

/// One external program with its launch modifiers.
///
/// `argv` is never empty; `argv[0]` names the program. At most one
/// redirection is recorded per command: the scan honors the first `>` or
/// `<` that is followed by a filename and leaves any later operator in
/// `argv` as an ordinary argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    pub argv: Vec<String>,
    /// File standard input is read from (`< file`); must already exist.
    pub stdin: Option<String>,
    /// File standard output is written to (`> file`), created or truncated.
    pub stdout: Option<String>,
    /// Launch without waiting (`&` as the final token).
    pub background: bool,
}

/// Exactly two programs joined by `|`, each a non-empty token sequence.
///
/// Stage argvs get no modifier parsing: redirection and background markers
/// inside a pipeline are ordinary arguments, and a second `|` is not
/// honored, so the right-hand stage of `a | b | c` is the tokens `b | c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub first: Vec<String>,
    pub second: Vec<String>,
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The first token named a builtin; the argv is handed over untouched.
    Builtin { argv: Vec<String> },
    Simple(SimpleCommand),
    Pipeline(Pipeline),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A `|` with no tokens on one of its sides.
    InvalidPipe,
    /// Modifier stripping consumed every token (`&` alone, `> file` alone).
    MissingCommand,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPipe => write!(f, "invalid pipe command"),
            Self::MissingCommand => write!(f, "missing command"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Classify one input line.
///
/// Returns `Ok(None)` when the line holds no tokens and there is nothing
/// to dispatch.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    // The pipe is line-level syntax and is looked for before anything
    // else; only the first one splits.
    if let Some((left, right)) = line.split_once('|') {
        let first = split_into_tokens(left);
        let second = split_into_tokens(right);
        if first.is_empty() || second.is_empty() {
            return Err(ParseError::InvalidPipe);
        }
        return Ok(Some(Command::Pipeline(Pipeline { first, second })));
    }

    let mut argv = split_into_tokens(line);
    if argv.is_empty() {
        return Ok(None);
    }

    // Builtins are recognized by the first token only and never combine
    // with redirection or backgrounding.
    if is_builtin(&argv[0]) {
        return Ok(Some(Command::Builtin { argv }));
    }

    let background = argv.last().map(String::as_str) == Some("&");
    if background {
        argv.pop();
    }

    let mut stdin = None;
    let mut stdout = None;
    let mut index = 0;
    while index < argv.len() {
        let is_output = argv[index] == ">";
        let is_input = argv[index] == "<";
        if (is_output || is_input) && index + 1 < argv.len() {
            let target = argv.remove(index + 1);
            argv.remove(index);
            if is_output {
                stdout = Some(target);
            } else {
                stdin = Some(target);
            }
            // One redirection per command; a later operator stays put.
            break;
        }
        index += 1;
    }

    if argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }

    Ok(Some(Command::Simple(SimpleCommand {
        argv,
        stdin,
        stdout,
        background,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    fn parsed(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    fn simple(line: &str) -> SimpleCommand {
        match parsed(line) {
            Command::Simple(command) => command,
            other => panic!("expected a simple command, got {:?}", other),
        }
    }

    #[test]
    fn plain_command_has_no_modifiers() {
        let command = simple("echo hello");
        assert_eq!(command.argv, words(&["echo", "hello"]));
        assert_eq!(command.stdin, None);
        assert_eq!(command.stdout, None);
        assert!(!command.background);
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn first_token_selects_a_builtin() {
        assert_eq!(
            parsed("cd /tmp"),
            Command::Builtin {
                argv: words(&["cd", "/tmp"])
            }
        );
        assert_eq!(
            parsed("history"),
            Command::Builtin {
                argv: words(&["history"])
            }
        );
    }

    #[test]
    fn builtin_names_elsewhere_are_ordinary_arguments() {
        let command = simple("echo exit");
        assert_eq!(command.argv, words(&["echo", "exit"]));
    }

    #[test]
    fn builtin_lines_skip_modifier_parsing() {
        assert_eq!(
            parsed("exit &"),
            Command::Builtin {
                argv: words(&["exit", "&"])
            }
        );
    }

    #[test]
    fn trailing_ampersand_sets_background() {
        let command = simple("sleep 5 &");
        assert_eq!(command.argv, words(&["sleep", "5"]));
        assert!(command.background);
    }

    #[test]
    fn ampersand_elsewhere_stays_an_ordinary_token() {
        let command = simple("echo a & b");
        assert_eq!(command.argv, words(&["echo", "a", "&", "b"]));
        assert!(!command.background);
    }

    #[test]
    fn output_redirection_is_extracted() {
        let command = simple("ls -l > out.txt");
        assert_eq!(command.argv, words(&["ls", "-l"]));
        assert_eq!(command.stdout.as_deref(), Some("out.txt"));
        assert_eq!(command.stdin, None);
    }

    #[test]
    fn input_redirection_is_extracted() {
        let command = simple("sort < data.txt");
        assert_eq!(command.argv, words(&["sort"]));
        assert_eq!(command.stdin.as_deref(), Some("data.txt"));
        assert_eq!(command.stdout, None);
    }

    #[test]
    fn first_operator_wins_and_the_second_stays_in_argv() {
        let command = simple("cmd > out.txt < in.txt");
        assert_eq!(command.stdout.as_deref(), Some("out.txt"));
        assert_eq!(command.stdin, None);
        assert_eq!(command.argv, words(&["cmd", "<", "in.txt"]));

        let mirrored = simple("cmd < in.txt > out.txt");
        assert_eq!(mirrored.stdin.as_deref(), Some("in.txt"));
        assert_eq!(mirrored.stdout, None);
        assert_eq!(mirrored.argv, words(&["cmd", ">", "out.txt"]));
    }

    #[test]
    fn trailing_operator_without_a_filename_stays_literal() {
        let command = simple("ls >");
        assert_eq!(command.argv, words(&["ls", ">"]));
        assert_eq!(command.stdout, None);
    }

    #[test]
    fn background_marker_is_stripped_before_the_redirection_scan() {
        let command = simple("cmd > out.txt &");
        assert!(command.background);
        assert_eq!(command.stdout.as_deref(), Some("out.txt"));
        assert_eq!(command.argv, words(&["cmd"]));
    }

    #[test]
    fn pipe_splits_into_two_stages() {
        assert_eq!(
            parsed("ls | wc"),
            Command::Pipeline(Pipeline {
                first: words(&["ls"]),
                second: words(&["wc"]),
            })
        );
    }

    #[test]
    fn only_the_first_pipe_splits() {
        assert_eq!(
            parsed("ls | wc | sort"),
            Command::Pipeline(Pipeline {
                first: words(&["ls"]),
                second: words(&["wc", "|", "sort"]),
            })
        );
    }

    #[test]
    fn pipeline_stages_get_no_modifier_parsing() {
        assert_eq!(
            parsed("cat < notes.txt | wc -l &"),
            Command::Pipeline(Pipeline {
                first: words(&["cat", "<", "notes.txt"]),
                second: words(&["wc", "-l", "&"]),
            })
        );
    }

    #[test]
    fn pipe_missing_a_side_is_rejected() {
        assert_eq!(parse_line("ls |").unwrap_err(), ParseError::InvalidPipe);
        assert_eq!(parse_line("| wc").unwrap_err(), ParseError::InvalidPipe);
        assert_eq!(parse_line(" | ").unwrap_err(), ParseError::InvalidPipe);
        assert_eq!(
            ParseError::InvalidPipe.to_string(),
            "invalid pipe command"
        );
    }

    #[test]
    fn line_consumed_by_modifiers_is_a_missing_command() {
        assert_eq!(parse_line("&").unwrap_err(), ParseError::MissingCommand);
        assert_eq!(
            parse_line("> out.txt").unwrap_err(),
            ParseError::MissingCommand
        );
        assert_eq!(
            parse_line("< in.txt &").unwrap_err(),
            ParseError::MissingCommand
        );
        assert_eq!(ParseError::MissingCommand.to_string(), "missing command");
    }
}
