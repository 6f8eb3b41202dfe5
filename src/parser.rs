//! Redirection extraction over the tokenized line.
//!
//! Walks the word list left to right, pulls out at most one `< target` and
//! one `> target` pair, and compacts the remaining words into the argument
//! vector in their original relative order.

/// One fully resolved command invocation.
///
/// All fields borrow from the line buffer the words were split from.
/// `argv[0]` is the command name and is guaranteed non-empty by
/// [`resolve_redirections`].
#[derive(Debug, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Command name followed by its arguments, operators stripped.
    pub argv: Vec<&'a str>,
    /// Path named by a `<` operator, if any.
    pub stdin_redirect: Option<&'a str>,
    /// Path named by a `>` operator, if any.
    pub stdout_redirect: Option<&'a str>,
}

/// Ways a token sequence can fail to resolve into a [`CommandLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// More than one `<` operator on the line.
    DuplicateInput,
    /// More than one `>` operator on the line.
    DuplicateOutput,
    /// A `<` or `>` operator with no word after it.
    DanglingRedirect,
    /// Nothing left in the argument vector once redirections are removed.
    MissingCommand,
}

/// Extracts redirection targets and returns the residual argument vector.
///
/// Each operator consumes the immediately following word as its target;
/// an operator at end of line or a second occurrence of the same operator is
/// an error. Callers report every [`ParseError`] identically (a generic
/// diagnostic and a re-prompt), but the variants are distinguished for tests.
pub fn resolve_redirections<'a>(words: &[&'a str]) -> Result<CommandLine<'a>, ParseError> {
    let mut argv = Vec::with_capacity(words.len());
    let mut stdin_redirect = None;
    let mut stdout_redirect = None;

    let mut iter = words.iter();
    while let Some(&word) = iter.next() {
        match word {
            "<" => {
                let target = *iter.next().ok_or(ParseError::DanglingRedirect)?;
                if stdin_redirect.replace(target).is_some() {
                    return Err(ParseError::DuplicateInput);
                }
            }
            ">" => {
                let target = *iter.next().ok_or(ParseError::DanglingRedirect)?;
                if stdout_redirect.replace(target).is_some() {
                    return Err(ParseError::DuplicateOutput);
                }
            }
            _ => argv.push(word),
        }
    }

    if argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }

    Ok(CommandLine {
        argv,
        stdin_redirect,
        stdout_redirect,
    })
}
