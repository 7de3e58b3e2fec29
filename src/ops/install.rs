//! The scoped clean install.
//!
//! The package manager is an external collaborator: its output and exit
//! status are observed and logged, never interpreted.

use std::path::Path;

use crate::util::process::{find_npm, ProcessBuilder};

/// What the install command did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOutcome {
    /// The command line that was run.
    pub command: String,
    /// Exit code, if the process ran to completion.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Set when the process could not be started at all.
    pub spawn_error: Option<String>,
}

impl InstallOutcome {
    /// Whether the install ran and exited cleanly.
    pub fn success(&self) -> bool {
        self.spawn_error.is_none() && self.exit_code == Some(0)
    }
}

/// Runs a clean install of one workspace member.
pub trait Installer {
    /// Install dependencies for `package_name`, from `package_dir`.
    ///
    /// Must not fail: anything that goes wrong is reported in the outcome.
    fn clean_install(&self, package_dir: &Path, package_name: &str) -> InstallOutcome;
}

/// `npm ci --workspace=<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmInstaller;

impl NpmInstaller {
    /// The command that would be run for `package_name`.
    pub fn command(package_name: &str) -> ProcessBuilder {
        ProcessBuilder::new(find_npm()).args(["ci".to_string(), format!("--workspace={}", package_name)])
    }
}

impl Installer for NpmInstaller {
    fn clean_install(&self, package_dir: &Path, package_name: &str) -> InstallOutcome {
        let cmd = Self::command(package_name).cwd(package_dir);
        let command = cmd.display_command();
        tracing::debug!("running `{}` in {}", command, package_dir.display());

        match cmd.exec() {
            Ok(output) => InstallOutcome {
                command,
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                spawn_error: None,
            },
            Err(e) => InstallOutcome {
                command,
                spawn_error: Some(format!("{:#}", e)),
                ..InstallOutcome::default()
            },
        }
    }
}
