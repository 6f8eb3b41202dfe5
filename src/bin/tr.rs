//! Byte filter: copy, delete, translate or substitute on the way from
//! standard input to standard output.
//!
//! Set and pattern operands undergo backslash-escape expansion (`\n`, `\t`,
//! `\r`, `\b`, `\s` for space, `\\`); an unknown escape keeps the escaped
//! character and a trailing backslash is a literal backslash.

use anyhow::{Result, bail};
use argh::FromArgs;
use std::io::{self, Read, Write};

#[derive(FromArgs)]
/// Copy standard input to standard output, optionally deleting, translating
/// or substituting characters on the way through.
struct Args {
    #[argh(subcommand)]
    mode: Option<Mode>,
}

// Transformation to apply; plain copy when omitted.
#[derive(FromArgs)]
#[argh(subcommand)]
enum Mode {
    Delete(DeleteArgs),
    Translate(TranslateArgs),
    Substitute(SubstituteArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "d")]
/// Delete occurrences of any character in SET.
struct DeleteArgs {
    /// characters to delete; backslash escapes are expanded
    #[argh(positional)]
    set: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "t")]
/// Replace the n-th character of SETA with the n-th character of SETB.
struct TranslateArgs {
    /// characters to replace
    #[argh(positional)]
    seta: String,

    /// replacement characters; must expand to the same length as SETA
    #[argh(positional)]
    setb: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "s")]
/// Substitute occurrences of the string MATCH with SUBSTITUTION.
struct SubstituteArgs {
    /// string to search for
    #[argh(positional)]
    pattern: String,

    /// replacement string
    #[argh(positional)]
    substitution: String,
}

fn main() {
    let args: Args = argh::from_env();
    if let Err(err) = run(args) {
        eprintln!("tr: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.mode {
        None => {
            io::copy(&mut io::stdin().lock(), &mut io::stdout().lock())?;
            Ok(())
        }
        Some(Mode::Delete(mode)) => {
            let set = unescape(&mode.set);
            filter_stream(|chunk| delete(chunk, &set))
        }
        Some(Mode::Translate(mode)) => {
            let from = unescape(&mode.seta);
            let to = unescape(&mode.setb);
            if from.len() != to.len() {
                bail!("SETA and SETB must have the same length");
            }
            filter_stream(|chunk| translate(chunk, &from, &to))
        }
        Some(Mode::Substitute(mode)) => {
            let pattern = unescape(&mode.pattern);
            let replacement = unescape(&mode.substitution);
            // Matches may straddle any chunk boundary, so substitution works
            // on the whole input at once.
            let mut input = Vec::new();
            io::stdin().lock().read_to_end(&mut input)?;
            io::stdout()
                .lock()
                .write_all(&substitute(&input, &pattern, &replacement))?;
            Ok(())
        }
    }
}

/// Streams stdin to stdout through a chunk-wise byte transform.
fn filter_stream(mut apply: impl FnMut(&[u8]) -> Vec<u8>) -> Result<()> {
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut buf = [0u8; 8192];
    loop {
        let n = stdin.read(&mut buf)?;
        if n == 0 {
            break;
        }
        stdout.write_all(&apply(&buf[..n]))?;
    }
    stdout.flush()?;
    Ok(())
}

/// Expands backslash escapes in a set/pattern operand.
fn unescape(spec: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(spec.len());
    let mut bytes = spec.bytes();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            None => out.push(b'\\'),
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'r') => out.push(b'\r'),
            Some(b'b') => out.push(0x08),
            Some(b's') => out.push(b' '),
            Some(b'\\') => out.push(b'\\'),
            Some(other) => out.push(other),
        }
    }
    out
}

fn delete(input: &[u8], set: &[u8]) -> Vec<u8> {
    input
        .iter()
        .copied()
        .filter(|b| !set.contains(b))
        .collect()
}

fn translate(input: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    input
        .iter()
        .map(|&b| match from.iter().position(|&f| f == b) {
            Some(i) => to[i],
            None => b,
        })
        .collect()
}

fn substitute(input: &[u8], pattern: &[u8], replacement: &[u8]) -> Vec<u8> {
    if pattern.is_empty() {
        return input.to_vec();
    }
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i..].starts_with(pattern) {
            out.extend_from_slice(replacement);
            i += pattern.len();
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    out
}
