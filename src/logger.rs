//! Buildpack-formatted user output.
//!
//! The platform shows supply-step output to the user verbatim, so steps and
//! messages follow the usual buildpack layout:
//!
//! ```text
//! -----> Update apt cache
//!        **ERROR** Failed to update apt cache: apt-get failed with exit status: 100
//!        E: Could not resolve host
//! ```
//!
//! Diagnostics meant for developers go through the `log` facade instead.

use std::fmt::Arguments;
use std::io::Write;
use std::sync::Mutex;

const STEP_PREFIX: &str = "-----> ";
const INDENT: &str = "       ";

/// Environment variable enabling debug output.
pub const DEBUG_ENV: &str = "BP_DEBUG";

pub struct Logger {
    out: Mutex<Box<dyn Write + Send>>,
    debug: bool,
}

impl Logger {
    pub fn new(out: Box<dyn Write + Send>, debug: bool) -> Self {
        Self {
            out: Mutex::new(out),
            debug,
        }
    }

    pub fn stdout(debug: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), debug)
    }

    pub fn begin_step(&self, args: Arguments<'_>) {
        self.print(STEP_PREFIX, "", args);
    }

    pub fn info(&self, args: Arguments<'_>) {
        self.print(INDENT, "", args);
    }

    pub fn error(&self, args: Arguments<'_>) {
        self.print(INDENT, "**ERROR** ", args);
    }

    /// Only printed when debug output is enabled.
    pub fn debug(&self, args: Arguments<'_>) {
        if self.debug {
            self.print(INDENT, "DEBUG: ", args);
        }
    }

    fn print(&self, prefix: &str, label: &str, args: Arguments<'_>) {
        let message = args.to_string();
        let message = message.trim_end_matches('\n');
        // Continuation lines line up under the message text
        let body = message.replace('\n', &format!("\n{}", INDENT));

        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // Output is best effort; a closed stdout must not fail the build
        let _ = writeln!(out, "{}{}{}", prefix, label, body);
        let _ = out.flush();
    }
}
