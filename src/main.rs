use anyhow::{Context, Result};
use apt_supply::apt::{AptInstaller, InstallerConfig};
use apt_supply::logger::{DEBUG_ENV, Logger};
use apt_supply::runtime::{RealRuntime, Runtime};
use apt_supply::stager::{BuildpackStager, Stager};
use apt_supply::supply::Supplier;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// apt-supply - install apt packages for a buildpack staging run
///
/// Reads the application's Aptfile (one package name or .deb URL per line),
/// downloads the packages into the buildpack cache, unpacks them into this
/// buildpack's dependency directory and links bin, lib, include and pkgconfig
/// for later build steps.
///
/// Set BP_DEBUG for debug output and RUST_LOG for diagnostics.
#[derive(Parser, Debug)]
#[command(author, version = env!("APT_SUPPLY_VERSION"), about)]
struct Cli {
    /// Application build directory
    #[arg(value_name = "BUILD_DIR")]
    build_dir: PathBuf,

    /// Buildpack cache directory, kept between stagings
    #[arg(value_name = "CACHE_DIR")]
    cache_dir: PathBuf,

    /// Directory holding every buildpack's dependency directory
    #[arg(value_name = "DEPS_DIR")]
    deps_dir: PathBuf,

    /// This buildpack's index within DEPS_DIR
    #[arg(value_name = "DEPS_IDX")]
    deps_idx: String,

    /// Buildpack root (defaults to the parent of the executable's directory)
    #[arg(long = "buildpack-dir", env = "BUILDPACK_DIR", value_name = "PATH")]
    buildpack_dir: Option<PathBuf>,

    /// Package list to install (defaults to BUILD_DIR/Aptfile)
    #[arg(long = "aptfile", env = "APT_SUPPLY_APTFILE", value_name = "PATH")]
    aptfile: Option<PathBuf>,
}

/// Bootstrap failures, each with the exit code the platform reports.
#[derive(Debug)]
enum Failure {
    BuildpackDir(anyhow::Error),
    Version(anyhow::Error),
    Invalid(anyhow::Error),
    Environment(anyhow::Error),
    /// Already reported by the supply step.
    Supply,
    ConfigYml(anyhow::Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::BuildpackDir(_) => 9,
            Failure::Version(_) => 10,
            Failure::Invalid(_) => 11,
            Failure::Environment(_) => 13,
            Failure::Supply => 14,
            Failure::ConfigYml(_) => 15,
        }
    }

    /// User-facing message. `None` when the failure was already reported.
    fn message(&self) -> Option<String> {
        match self {
            Failure::BuildpackDir(e) => Some(format!("Unable to determine buildpack directory: {:#}", e)),
            Failure::Version(e) => Some(format!("Unable to read buildpack version: {:#}", e)),
            Failure::Invalid(e) => Some(format!("Invalid staging directories: {:#}", e)),
            Failure::Environment(e) => Some(format!("Unable to setup environment variables: {:#}", e)),
            Failure::Supply => None,
            Failure::ConfigYml(e) => Some(format!("Error writing config.yml: {:#}", e)),
        }
    }
}

fn default_buildpack_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate executable")?;
    // <buildpack>/bin/<exe>
    exe.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .context("Executable has no parent directory")
}

fn read_version<R: Runtime>(runtime: &R, buildpack_dir: &Path) -> Result<String> {
    let version = runtime.read_to_string(&buildpack_dir.join("VERSION"))?;
    Ok(version.trim().to_string())
}

fn supply(cli: Cli, log: &Logger) -> Result<(), Failure> {
    let runtime = RealRuntime;

    let buildpack_dir = match cli.buildpack_dir {
        Some(dir) => dir,
        None => default_buildpack_dir().map_err(Failure::BuildpackDir)?,
    };
    let version = read_version(&runtime, &buildpack_dir).map_err(Failure::Version)?;

    let stager = BuildpackStager::new(
        &runtime,
        cli.build_dir,
        cli.cache_dir,
        cli.deps_dir,
        cli.deps_idx,
    );
    stager.check_buildpack_valid().map_err(Failure::Invalid)?;
    log.begin_step(format_args!("Apt Buildpack version {}", version));

    let vars = stager
        .staging_environment(&|key| std::env::var(key).ok())
        .map_err(Failure::Environment)?;
    for (key, value) in vars {
        // SAFETY: the process is still single-threaded here, nothing else
        // reads or writes the environment concurrently.
        unsafe { std::env::set_var(&key, &value) };
    }

    let aptfile = cli
        .aptfile
        .unwrap_or_else(|| stager.build_dir().join("Aptfile"));
    let config = InstallerConfig::new(aptfile, stager.cache_dir(), &stager.dep_dir());
    let apt = AptInstaller::new(&runtime, config);

    Supplier::new(&stager, &apt, &runtime, log)
        .run()
        .map_err(|_| Failure::Supply)?;

    stager
        .write_config_yml(&version)
        .map_err(Failure::ConfigYml)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let log = Logger::stdout(std::env::var_os(DEBUG_ENV).is_some());

    match supply(cli, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            if let Some(message) = failure.message() {
                log.error(format_args!("{}", message));
            }
            ExitCode::from(failure.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_positional_parsing() {
        let cli = Cli::try_parse_from([
            "apt-supply",
            "/tmp/app",
            "/tmp/cache",
            "/tmp/deps",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.build_dir, PathBuf::from("/tmp/app"));
        assert_eq!(cli.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(cli.deps_dir, PathBuf::from("/tmp/deps"));
        assert_eq!(cli.deps_idx, "0");
    }

    #[test]
    fn test_cli_aptfile_option() {
        let cli = Cli::try_parse_from([
            "apt-supply",
            "/tmp/app",
            "/tmp/cache",
            "/tmp/deps",
            "1",
            "--aptfile",
            "/tmp/app/config/Aptfile",
        ])
        .unwrap();
        assert_eq!(cli.aptfile, Some(PathBuf::from("/tmp/app/config/Aptfile")));
    }

    #[test]
    fn test_cli_missing_deps_idx_fails() {
        let result = Cli::try_parse_from(["apt-supply", "/tmp/app", "/tmp/cache", "/tmp/deps"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_failure_exit_codes() {
        let err = || anyhow::anyhow!("boom");
        assert_eq!(Failure::BuildpackDir(err()).exit_code(), 9);
        assert_eq!(Failure::Version(err()).exit_code(), 10);
        assert_eq!(Failure::Invalid(err()).exit_code(), 11);
        assert_eq!(Failure::Environment(err()).exit_code(), 13);
        assert_eq!(Failure::Supply.exit_code(), 14);
        assert_eq!(Failure::ConfigYml(err()).exit_code(), 15);
    }

    #[test]
    fn test_supply_failure_has_no_extra_message() {
        assert!(Failure::Supply.message().is_none());
        assert_eq!(
            Failure::ConfigYml(anyhow::anyhow!("disk full")).message(),
            Some("Error writing config.yml: disk full".to_string())
        );
    }
}
