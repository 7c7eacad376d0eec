//! External subcommand dispatch.
//!
//! Command tokens no built-in group claims are routed to a `loft-<cmd>`
//! binary on `$PATH`. On unix the process image is replaced so signals
//! and the exit status transfer directly to the external tool.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::debug;

use crate::error::CliError;

/// Prefix external subcommand binaries must carry.
pub const BIN_PREFIX: &str = "loft-";

/// Locate `loft-<command>` on `$PATH`.
#[must_use]
pub fn find_external(command: &str) -> Option<PathBuf> {
    find_in_path(command, &env::var_os("PATH")?)
}

fn find_in_path(command: &str, path: &OsStr) -> Option<PathBuf> {
    let name = format!("{BIN_PREFIX}{command}");
    for dir in env::split_paths(path) {
        let candidate = dir.join(&name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Replace the current process with the external binary, passing the
/// remaining argv. Only returns on failure.
pub fn run_external(binary: &PathBuf, args: &[String]) -> Result<(), CliError> {
    debug!(?binary, ?args, "delegating to external subcommand");
    exec(binary, args)
}

#[cfg(unix)]
fn exec(binary: &PathBuf, args: &[String]) -> Result<(), CliError> {
    use std::os::unix::process::CommandExt;
    let err = std::process::Command::new(binary).args(args).exec();
    Err(CliError::Io(err))
}

#[cfg(not(unix))]
fn exec(binary: &PathBuf, args: &[String]) -> Result<(), CliError> {
    let status = std::process::Command::new(binary).args(args).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::Command(format!(
            "{} exited with {status}",
            binary.display()
        )))
    }
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_commands_are_not_found() {
        assert!(find_external("definitely-not-a-real-subcommand-xyz").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn finds_binaries_with_the_prefix() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join("loft-hello");
        std::fs::write(&bin, "#!/bin/sh\n").expect("write");
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).expect("perm");

        let found = find_in_path("hello", dir.path().as_os_str());
        assert_eq!(found, Some(bin));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_files_are_skipped() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join("loft-hello");
        std::fs::write(&bin, "").expect("write");
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o644)).expect("perm");

        assert!(find_in_path("hello", dir.path().as_os_str()).is_none());
    }
}
