//! Word splitting for the shell's single-command-per-line grammar.

/// Upper bound on the number of words kept from one line.
///
/// Mirrors the 32-slot argument vector convention of small exec interfaces
/// (31 usable words plus the terminator slot). Words past the bound are
/// silently discarded; overlong lines are clamped, never rejected.
pub const MAX_TOKENS: usize = 31;

/// Splits one input line into whitespace-delimited words.
///
/// The rules are intentionally minimal:
/// - exactly one trailing `'\n'` is stripped if present;
/// - only the ASCII space character delimits words, runs of it collapse, and
///   no other whitespace (tabs in particular) is special;
/// - at most [`MAX_TOKENS`] words are produced;
/// - an empty or all-space line yields an empty vector, which the caller
///   treats as "re-prompt without doing anything".
///
/// The returned words borrow from `line`; nothing is copied.
pub fn split_words(line: &str) -> Vec<&str> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.split(' ')
        .filter(|word| !word.is_empty())
        .take(MAX_TOKENS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_yield_no_words() {
        assert!(split_words("").is_empty());
        assert!(split_words("\n").is_empty());
        assert!(split_words("     ").is_empty());
        assert!(split_words("   \n").is_empty());
    }

    #[test]
    fn strips_exactly_one_trailing_newline() {
        assert_eq!(split_words("echo hi\n"), vec!["echo", "hi"]);
        // A second newline is an ordinary word byte, not a delimiter.
        assert_eq!(split_words("echo\n\n"), vec!["echo\n"]);
    }

    #[test]
    fn collapses_runs_of_spaces() {
        assert_eq!(split_words("  a   b  c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn tab_is_not_a_delimiter() {
        assert_eq!(split_words("a\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn words_borrow_from_the_line() {
        let line = String::from("cat file\n");
        let words = split_words(&line);
        assert_eq!(words, vec!["cat", "file"]);
        assert!(std::ptr::eq(words[0].as_ptr(), line.as_ptr()));
    }

    #[test]
    fn clamps_at_max_tokens() {
        let line = (0..40).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let words = split_words(&line);
        assert_eq!(words.len(), MAX_TOKENS);
        assert_eq!(words[0], "0");
        assert_eq!(words[MAX_TOKENS - 1], "30");
    }
}
