//! Installer configuration: namespaced apt directories and invocation options.

use std::path::{Path, PathBuf};

/// Subdirectory isolating this tool's cache and install artifacts from other
/// tooling sharing the same roots.
pub const NAMESPACE: &str = "apt";

/// Suffix identifying a direct package download in the Aptfile and a cached
/// package in the archives directory.
pub const PACKAGE_SUFFIX: &str = ".deb";

/// `apt-get` arguments for a download-only, non-interactive reinstall.
pub const APT_DOWNLOAD_FLAGS: &[&str] = &["-y", "--force-yes", "-d", "install", "--reinstall"];

/// `curl` arguments preceding the conditional-download (`-z`) and output (`-o`) pair.
pub const CURL_FLAGS: &[&str] = &["-s", "-L"];

/// Immutable paths and options for one installer instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallerConfig {
    /// The user's package list
    pub aptfile: PathBuf,
    /// apt's `dir::cache` (e.g., /tmp/cache/apt/cache)
    pub cache_dir: PathBuf,
    /// apt's `dir::state` (e.g., /tmp/cache/apt/state)
    pub state_dir: PathBuf,
    /// Where packages are unpacked (e.g., /tmp/deps/0/apt)
    pub install_dir: PathBuf,
    options: Vec<String>,
}

impl InstallerConfig {
    pub fn new(aptfile: impl Into<PathBuf>, cache_root: &Path, install_root: &Path) -> Self {
        let cache_dir = cache_root.join(NAMESPACE).join("cache");
        let state_dir = cache_root.join(NAMESPACE).join("state");

        let options = vec![
            "-o".to_string(),
            "debug::nolocking=true".to_string(),
            "-o".to_string(),
            format!("dir::cache={}", cache_dir.display()),
            "-o".to_string(),
            format!("dir::state={}", state_dir.display()),
        ];

        Self {
            aptfile: aptfile.into(),
            cache_dir,
            state_dir,
            install_dir: install_root.join(NAMESPACE),
            options,
        }
    }

    /// Options passed to every `apt-get` invocation ahead of the subcommand.
    pub fn apt_options(&self) -> &[String] {
        &self.options
    }

    pub fn archives_dir(&self) -> PathBuf {
        self.cache_dir.join("archives")
    }

    /// Directories apt expects to exist before it will refresh or download.
    pub fn working_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.archives_dir().join("partial"),
            self.state_dir.join("lists").join("partial"),
        ]
    }

    /// Glob pattern matching every cached package file.
    pub fn archive_pattern(&self) -> String {
        self.archives_dir()
            .join(format!("*{}", PACKAGE_SUFFIX))
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_namespaces_directories() {
        let config = InstallerConfig::new(
            "/app/Aptfile",
            Path::new("/some/cachedir"),
            Path::new("/some/installdir"),
        );

        assert_eq!(config.aptfile, PathBuf::from("/app/Aptfile"));
        assert_eq!(config.cache_dir, PathBuf::from("/some/cachedir/apt/cache"));
        assert_eq!(config.state_dir, PathBuf::from("/some/cachedir/apt/state"));
        assert_eq!(config.install_dir, PathBuf::from("/some/installdir/apt"));
        assert_eq!(
            config.archives_dir(),
            PathBuf::from("/some/cachedir/apt/cache/archives")
        );
    }

    #[test]
    fn test_config_apt_options() {
        let config = InstallerConfig::new(
            "/app/Aptfile",
            Path::new("/some/cachedir"),
            Path::new("/some/installdir"),
        );

        assert_eq!(
            config.apt_options(),
            [
                "-o",
                "debug::nolocking=true",
                "-o",
                "dir::cache=/some/cachedir/apt/cache",
                "-o",
                "dir::state=/some/cachedir/apt/state",
            ]
        );
    }

    #[test]
    fn test_config_working_dirs_and_pattern() {
        let config = InstallerConfig::new("Aptfile", Path::new("/c"), Path::new("/i"));

        assert_eq!(
            config.working_dirs(),
            vec![
                PathBuf::from("/c/apt/cache/archives/partial"),
                PathBuf::from("/c/apt/state/lists/partial"),
            ]
        );
        assert_eq!(config.archive_pattern(), "/c/apt/cache/archives/*.deb");
    }

    #[test]
    fn test_separate_cache_roots_do_not_collide() {
        let a = InstallerConfig::new("Aptfile", Path::new("/cache-a"), Path::new("/i"));
        let b = InstallerConfig::new("Aptfile", Path::new("/cache-b"), Path::new("/i"));
        assert_ne!(a.cache_dir, b.cache_dir);
        assert_ne!(a.state_dir, b.state_dir);
    }
}
