//! Package installation through apt.
//!
//! [`AptInstaller`] drives the three stages of getting packages into the
//! dependency directory:
//! - `update` - refresh the package index in a namespaced cache
//! - `download` - fetch every Aptfile entry into the cache's archives directory
//! - `install` - unpack every cached `.deb` into the install directory
//!
//! Each stage is fail-fast: the first failing command ends the stage and its
//! error is returned unchanged, so a [`CommandError`](crate::runtime::CommandError)
//! still carries the tool's output.

pub mod config;
pub mod manifest;

use anyhow::Result;
use log::{debug, info};
use std::path::Path;

use crate::runtime::Runtime;

pub use config::InstallerConfig;
pub use manifest::{PackageSpec, package_file_name, parse_manifest};

use config::{APT_DOWNLOAD_FLAGS, CURL_FLAGS};

/// Every external command runs from the filesystem root.
const WORKING_DIR: &str = "/";

/// The three package lifecycle stages, as seen by the supply step.
#[cfg_attr(test, mockall::automock)]
pub trait Apt {
    /// Refresh the package index. Returns the tool output.
    fn update(&self) -> Result<String>;

    /// Fetch every package listed in the Aptfile.
    fn download(&self) -> Result<String>;

    /// Unpack every downloaded package.
    fn install(&self) -> Result<String>;
}

pub struct AptInstaller<'a, R: Runtime> {
    runtime: &'a R,
    config: InstallerConfig,
}

impl<'a, R: Runtime> AptInstaller<'a, R> {
    pub fn new(runtime: &'a R, config: InstallerConfig) -> Self {
        Self { runtime, config }
    }

    fn apt_get(&self, trailing: &[&str]) -> Result<String> {
        let mut args = self.config.apt_options().to_vec();
        args.extend(trailing.iter().map(|s| s.to_string()));
        self.runtime.output(Path::new(WORKING_DIR), "apt-get", &args)
    }

    fn fetch(&self, url: &str, file_name: &str) -> Result<String> {
        let package_file = self.config.archives_dir().join(file_name);
        let package_file = package_file.to_string_lossy();

        let mut args: Vec<String> = CURL_FLAGS.iter().map(|s| s.to_string()).collect();
        args.extend([
            "-z".to_string(),
            package_file.to_string(),
            "-o".to_string(),
            package_file.to_string(),
            url.to_string(),
        ]);
        self.runtime.output(Path::new(WORKING_DIR), "curl", &args)
    }
}

impl<R: Runtime> Apt for AptInstaller<'_, R> {
    #[tracing::instrument(skip(self))]
    fn update(&self) -> Result<String> {
        for dir in self.config.working_dirs() {
            self.runtime.create_dir_all(&dir)?;
        }
        self.apt_get(&["update"])
    }

    #[tracing::instrument(skip(self))]
    fn download(&self) -> Result<String> {
        let text = self.runtime.read_to_string(&self.config.aptfile)?;

        for spec in parse_manifest(&text) {
            match &spec {
                PackageSpec::Url(url) => {
                    info!("Fetching {}", url);
                    self.fetch(url, package_file_name(url))?;
                }
                PackageSpec::Name(name) => {
                    info!("Downloading package {}", name);
                    let mut trailing = APT_DOWNLOAD_FLAGS.to_vec();
                    trailing.push(name.as_str());
                    self.apt_get(&trailing)?;
                }
            }
        }

        Ok(String::new())
    }

    #[tracing::instrument(skip(self))]
    fn install(&self) -> Result<String> {
        let files = self.runtime.glob(&self.config.archive_pattern())?;
        debug!("Found {} cached package(s)", files.len());

        let install_dir = self.config.install_dir.to_string_lossy().into_owned();
        for file in files {
            info!("Unpacking {:?}", file);
            let args = vec![
                "-x".to_string(),
                file.to_string_lossy().into_owned(),
                install_dir.clone(),
            ];
            self.runtime.output(Path::new(WORKING_DIR), "dpkg", &args)?;
        }

        Ok(String::new())
    }
}
