//! Working-directory printer by directory-entry scan.
//!
//! Discovers the absolute path of the current directory without consulting
//! `$PWD` or the platform's cwd string: it walks up through `..`, detecting
//! the root as the point where `.` and `..` share a (device, inode) pair,
//! and recovers each component's name by scanning the parent directory for
//! the entry with the matching inode.

use anyhow::{Context, Result, bail};
use argh::FromArgs;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

#[derive(FromArgs)]
/// Print the absolute path of the working directory, discovered by scanning
/// parent directory entries.
struct Args {}

fn main() {
    let Args {} = argh::from_env();
    match working_directory() {
        Ok(path) => println!("{}", path.display()),
        Err(_) => {
            eprintln!("pwd: error");
            std::process::exit(1);
        }
    }
}

fn working_directory() -> Result<PathBuf> {
    let mut components: Vec<OsString> = Vec::new();
    // Walk up by appending ".." rather than chdir-ing, leaving the process
    // working directory untouched.
    let mut dir = PathBuf::from(".");
    loop {
        let here = fs::metadata(&dir).context("stat .")?;
        let parent_path = dir.join("..");
        let parent = fs::metadata(&parent_path).context("stat ..")?;
        if here.dev() == parent.dev() && here.ino() == parent.ino() {
            // "." and ".." are the same directory only at the root.
            break;
        }
        components.push(entry_name(&parent_path, &here)?);
        dir = parent_path;
    }

    let mut path = PathBuf::from("/");
    for name in components.iter().rev() {
        path.push(name);
    }
    Ok(path)
}

/// Name under which `child` appears in the directory at `parent`.
fn entry_name(parent: &Path, child: &fs::Metadata) -> Result<OsString> {
    for entry in fs::read_dir(parent).context("read parent directory")? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.ino() == child.ino() && meta.dev() == child.dev() {
            return Ok(entry.file_name());
        }
    }
    bail!("entry not found in parent directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env as stdenv;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    #[test]
    fn scan_agrees_with_the_kernel_cwd() {
        let _lock = lock_current_dir();
        // current_dir() on Unix is the fully resolved physical path, which is
        // exactly what the entry scan reconstructs.
        let expected = stdenv::current_dir().unwrap();
        assert_eq!(working_directory().unwrap(), expected);
    }

    #[test]
    fn scan_follows_a_directory_change() {
        let _lock = lock_current_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let temp = stdenv::temp_dir().join(format!("pwd_scan_{}_{}", std::process::id(), nanos));
        fs::create_dir_all(&temp).unwrap();
        let canonical = fs::canonicalize(&temp).unwrap();

        let orig = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&temp).unwrap();
        let scanned = working_directory();
        stdenv::set_current_dir(orig).unwrap();

        assert_eq!(scanned.unwrap(), canonical);
        let _ = fs::remove_dir_all(temp);
    }
}
