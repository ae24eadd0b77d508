//! Runtime abstraction for system operations.
//!
//! Everything the supply step does to the outside world, running `apt-get`,
//! `curl` and `dpkg` or touching the filesystem, goes through [`Runtime`].
//! The orchestration code depends only on the trait, so tests substitute
//! `MockRuntime` and never spawn a process.
//!
//! # Structure
//!
//! - `command` - External program execution with captured output
//! - `fs` - File system operations (read, write, directory, glob)
//! - `symlink` - Symlink operations (create, inspect, remove)

mod command;
mod fs;
mod symlink;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use command::CommandError;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Processes
    /// Run `program` with `args` in `dir` and return its combined stdout and
    /// stderr. A spawn failure or a non-zero exit is returned as a
    /// [`CommandError`] carrying whatever output was captured.
    fn output(&self, dir: &Path, program: &str, args: &[String]) -> Result<String>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Expand a glob pattern into the matching paths, sorted.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Check whether a path exists. A missing path is `Ok(false)`; any other
    /// failure to stat the path is an error.
    fn file_exists(&self, path: &Path) -> Result<bool>;
    fn is_dir(&self, path: &Path) -> bool;

    fn symlink(&self, original: &Path, link: &Path) -> Result<()>;
    fn remove_symlink(&self, path: &Path) -> Result<()>;
    fn is_symlink(&self, path: &Path) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn output(&self, dir: &Path, program: &str, args: &[String]) -> Result<String> {
        self.output_impl(dir, program, args)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self.glob_impl(pattern)
    }

    fn file_exists(&self, path: &Path) -> Result<bool> {
        self.file_exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        self.symlink_impl(original, link)
    }

    fn remove_symlink(&self, path: &Path) -> Result<()> {
        self.remove_symlink_impl(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.is_symlink_impl(path)
    }
}
