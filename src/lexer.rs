//! Lexical analysis (tokenization) for the shell's command language.

/// Split a command line into tokens.
///
/// Tokens are maximal runs of non-space characters; any run of spaces acts
/// as a single separator, so consecutive separators never produce empty
/// tokens. The language has no quoting or escaping, which makes every
/// non-space character ordinary token text. An empty or all-space line
/// yields no tokens.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    line.split(' ')
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}
