//! Buildpack staging layout.
//!
//! A supply step is invoked as `<bin> <BUILD_DIR> <CACHE_DIR> <DEPS_DIR> <DEPS_IDX>`.
//! Everything it contributes to the droplet lives in its own dependency
//! directory, `<DEPS_DIR>/<DEPS_IDX>`, which later buildpacks search for
//! `bin`, `lib`, `include` and `pkgconfig`.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Name recorded in `config.yml`.
pub const BUILDPACK_NAME: &str = "apt";

/// Environment variables exported to later build steps, and the dependency
/// subdirectory each one is built from.
pub const STAGING_VARIABLES: &[(&str, &str)] = &[
    ("PATH", "bin"),
    ("LD_LIBRARY_PATH", "lib"),
    ("LIBRARY_PATH", "lib"),
    ("CPATH", "include"),
    ("PKG_CONFIG_PATH", "pkgconfig"),
];

/// What the supply step needs from the staging layout.
#[cfg_attr(test, mockall::automock)]
pub trait Stager {
    /// This buildpack's dependency directory (`<DEPS_DIR>/<DEPS_IDX>`).
    fn dep_dir(&self) -> PathBuf;

    /// Expose every entry of `dest_dir` under `<dep_dir>/<dep_sub_dir>` via
    /// relative symlinks.
    fn link_directory_in_dep_dir(&self, dest_dir: &Path, dep_sub_dir: &str) -> Result<()>;
}

#[derive(Serialize, Debug, PartialEq)]
struct ConfigYml<'a> {
    name: &'a str,
    config: BTreeMap<String, String>,
    version: &'a str,
}

pub struct BuildpackStager<'a, R: Runtime> {
    runtime: &'a R,
    build_dir: PathBuf,
    cache_dir: PathBuf,
    deps_dir: PathBuf,
    deps_idx: String,
}

impl<'a, R: Runtime> BuildpackStager<'a, R> {
    pub fn new(
        runtime: &'a R,
        build_dir: PathBuf,
        cache_dir: PathBuf,
        deps_dir: PathBuf,
        deps_idx: String,
    ) -> Self {
        Self {
            runtime,
            build_dir,
            cache_dir,
            deps_dir,
            deps_idx,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure the staging layout is usable and create this buildpack's
    /// dependency directory.
    #[tracing::instrument(skip(self))]
    pub fn check_buildpack_valid(&self) -> Result<()> {
        if self.deps_idx.is_empty() || self.deps_idx.contains(std::path::is_separator) {
            bail!("Invalid dependency index {:?}", self.deps_idx);
        }
        if !self.runtime.file_exists(&self.deps_dir)? {
            bail!("Dependency directory {:?} does not exist", self.deps_dir);
        }
        self.runtime.create_dir_all(&self.dep_dir())
    }

    /// Variables later build steps need to find what every supply step has
    /// installed so far. Dependency directories are searched in index order,
    /// and `current` supplies the existing value appended at the end.
    #[tracing::instrument(skip(self, current))]
    pub fn staging_environment(
        &self,
        current: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Vec<(String, String)>> {
        let mut dep_dirs = self.runtime.read_dir(&self.deps_dir)?;
        dep_dirs.retain(|dir| self.runtime.is_dir(dir));
        // Numeric indexes sort numerically ("2" before "10")
        dep_dirs.sort_by_key(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name.parse::<u64>().unwrap_or(u64::MAX), name)
        });

        let mut vars = Vec::new();
        for (key, sub_dir) in STAGING_VARIABLES {
            let mut entries = Vec::new();
            for dep_dir in &dep_dirs {
                let candidate = dep_dir.join(sub_dir);
                if self.runtime.file_exists(&candidate)? {
                    entries.push(candidate.to_string_lossy().into_owned());
                }
            }
            if entries.is_empty() {
                continue;
            }
            if let Some(existing) = current(key).filter(|v| !v.is_empty()) {
                entries.push(existing);
            }
            vars.push((key.to_string(), entries.join(":")));
        }

        debug!("Staging environment: {:?}", vars);
        Ok(vars)
    }

    /// Record this buildpack in `<dep_dir>/config.yml`.
    #[tracing::instrument(skip(self))]
    pub fn write_config_yml(&self, version: &str) -> Result<()> {
        let config = ConfigYml {
            name: BUILDPACK_NAME,
            config: BTreeMap::new(),
            version,
        };
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize config.yml")?;
        self.runtime
            .write(&self.dep_dir().join("config.yml"), yaml.as_bytes())
    }
}

impl<R: Runtime> Stager for BuildpackStager<'_, R> {
    fn dep_dir(&self) -> PathBuf {
        self.deps_dir.join(&self.deps_idx)
    }

    #[tracing::instrument(skip(self))]
    fn link_directory_in_dep_dir(&self, dest_dir: &Path, dep_sub_dir: &str) -> Result<()> {
        let link_dir = self.dep_dir().join(dep_sub_dir);
        self.runtime.create_dir_all(&link_dir)?;

        for entry in self.runtime.read_dir(dest_dir)? {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let link = link_dir.join(name);
            let target = pathdiff::diff_paths(&entry, &link_dir).unwrap_or_else(|| entry.clone());

            if self.runtime.is_symlink(&link) {
                debug!("Replacing existing link {:?}", link);
                self.runtime.remove_symlink(&link)?;
            }
            self.runtime.symlink(&target, &link)?;
        }
        Ok(())
    }
}
