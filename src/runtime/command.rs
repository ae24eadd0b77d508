//! External program execution.

use anyhow::Result;
use log::debug;
use std::path::Path;
use std::process::Command;

use super::RealRuntime;

/// Failure of an external program, keeping the output it produced.
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started at all
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The program ran and exited unsuccessfully
    Failed {
        program: String,
        status: String,
        output: String,
    },
}

impl CommandError {
    /// Combined stdout/stderr captured before the failure (empty for spawn errors).
    pub fn output(&self) -> &str {
        match self {
            CommandError::Spawn { .. } => "",
            CommandError::Failed { output, .. } => output,
        }
    }

    pub fn program(&self) -> &str {
        match self {
            CommandError::Spawn { program, .. } | CommandError::Failed { program, .. } => program,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Spawn { program, source } => {
                write!(f, "Failed to run {}: {}", program, source)
            }
            CommandError::Failed {
                program, status, ..
            } => {
                write!(f, "{} failed with {}", program, status)
            }
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn { source, .. } => Some(source),
            CommandError::Failed { .. } => None,
        }
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn output_impl(&self, dir: &Path, program: &str, args: &[String]) -> Result<String> {
        debug!("Running {} {} in {:?}", program, args.join(" "), dir);

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // stdout first, then stderr
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                output: combined,
            }
            .into());
        }

        Ok(combined)
    }
}
