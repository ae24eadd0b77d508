//! The supply step: install the Aptfile's packages and expose them.
//!
//! [`Supplier::run`] is a linear pipeline,
//! `update -> download -> install -> symlink`, that stops at the first
//! failing stage. Failures are reported through the buildpack [`Logger`]
//! together with the output of the tool that failed, then returned unchanged.

mod links;

use anyhow::Result;
use log::debug;

use crate::apt::Apt;
use crate::logger::Logger;
use crate::runtime::{CommandError, Runtime};
use crate::stager::Stager;

pub use links::{SYMLINK_RULES, SymlinkRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Update,
    Download,
    Install,
}

impl Stage {
    const ALL: [Stage; 3] = [Stage::Update, Stage::Download, Stage::Install];

    fn header(self) -> &'static str {
        match self {
            Stage::Update => "Update apt cache",
            Stage::Download => "Download apt packages",
            Stage::Install => "Install apt packages",
        }
    }

    fn failure(self) -> &'static str {
        match self {
            Stage::Update => "Failed to update apt cache",
            Stage::Download => "Failed to download apt packages",
            Stage::Install => "Failed to install apt packages",
        }
    }
}

/// Output captured from the external tool behind `err`, if any.
fn command_output(err: &anyhow::Error) -> &str {
    err.downcast_ref::<CommandError>()
        .map(CommandError::output)
        .unwrap_or_default()
}

pub struct Supplier<'a, S: Stager, A: Apt, R: Runtime> {
    stager: &'a S,
    apt: &'a A,
    runtime: &'a R,
    log: &'a Logger,
}

impl<'a, S: Stager, A: Apt, R: Runtime> Supplier<'a, S, A, R> {
    pub fn new(stager: &'a S, apt: &'a A, runtime: &'a R, log: &'a Logger) -> Self {
        Self {
            stager,
            apt,
            runtime,
            log,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn run(&self) -> Result<()> {
        for stage in Stage::ALL {
            self.run_stage(stage)?;
        }

        self.log.debug(format_args!("Symlink files"));
        if let Err(e) = self.create_symlinks() {
            self.log.error(format_args!("Could not link files: {}", e));
            return Err(e);
        }
        Ok(())
    }

    fn run_stage(&self, stage: Stage) -> Result<()> {
        self.log.begin_step(format_args!("{}", stage.header()));

        let result = match stage {
            Stage::Update => self.apt.update(),
            Stage::Download => self.apt.download(),
            Stage::Install => self.apt.install(),
        };

        match result {
            Ok(output) => {
                debug!("{:?} finished: {}", stage, output.trim_end());
                Ok(())
            }
            Err(e) => {
                self.log.error(format_args!("{}: {}", stage.failure(), e));
                let output = command_output(&e);
                if !output.is_empty() {
                    self.log.info(format_args!("{}", output));
                }
                Err(e)
            }
        }
    }

    /// Link every well-known directory present in the dependency directory.
    /// Existence is checked afresh on every call.
    #[tracing::instrument(skip(self))]
    pub fn create_symlinks(&self) -> Result<()> {
        let dep_dir = self.stager.dep_dir();

        for rule in SYMLINK_RULES {
            let source = dep_dir.join(rule.source);
            if !self.runtime.file_exists(&source)? {
                continue;
            }
            debug!("Linking {:?} into {}", source, rule.dest);
            self.stager.link_directory_in_dep_dir(&source, rule.dest)?;
        }
        Ok(())
    }
}
