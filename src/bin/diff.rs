//! Byte-by-byte stream comparator.
//!
//! Prints the 0-based offset of the first differing byte (a stream ending
//! early counts as a difference at that offset) and exits 1; identical
//! streams exit 0, I/O failures exit 2.

use anyhow::{Context, Result};
use argh::FromArgs;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(FromArgs)]
/// Compare two byte streams and report the first differing offset.
struct Args {
    /// first file to compare
    #[argh(positional)]
    first: PathBuf,

    /// second file; when omitted, FIRST is compared against standard input
    #[argh(positional)]
    second: Option<PathBuf>,
}

fn main() {
    let args: Args = argh::from_env();
    let code = match run(&args) {
        Ok(None) => 0,
        Ok(Some(offset)) => {
            println!("{offset}");
            1
        }
        Err(err) => {
            eprintln!("diff: {err:#}");
            2
        }
    };
    std::process::exit(code);
}

fn run(args: &Args) -> Result<Option<u64>> {
    let first = open(&args.first)?;
    match &args.second {
        Some(path) => {
            let second = open(path)?;
            first_mismatch(first, second).context("read error")
        }
        None => first_mismatch(io::stdin().lock(), first).context("read error"),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Offset of the first position where the streams disagree, or `None` when
/// they are byte-for-byte identical (including both being empty).
fn first_mismatch(a: impl Read, b: impl Read) -> io::Result<Option<u64>> {
    let mut a = a.bytes();
    let mut b = b.bytes();
    let mut offset = 0u64;
    loop {
        match (a.next().transpose()?, b.next().transpose()?) {
            (None, None) => return Ok(None),
            (Some(x), Some(y)) if x == y => offset += 1,
            _ => return Ok(Some(offset)),
        }
    }
}
