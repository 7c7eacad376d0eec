//! Self-update: fetch the release manifest, pick the entry for this
//! OS/architecture, and hand the downloaded binary to the replacement
//! helper. The helper itself (swapping the running executable) is an
//! injectable collaborator.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::CliError;

/// Manifest of released binaries, one download URL per line.
pub const MANIFEST_URL: &str = "https://downloads.loftpaas.com/cli/manifest.txt";

/// Filename prefix of released binaries.
const RELEASE_PREFIX: &str = "loft-";

/// A manifest entry matched to this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Download URL.
    pub url: String,
    /// Version encoded in the filename.
    pub version: String,
}

/// Pick the manifest line for `<os>-<arch>` and extract its version.
pub fn select_entry(manifest: &str, os: &str, arch: &str) -> Option<ReleaseEntry> {
    let suffix = format!("-{os}-{arch}");
    for line in manifest.lines() {
        let line = line.trim();
        if line.is_empty() || !line.ends_with(&suffix) {
            continue;
        }
        let filename = line.rsplit('/').next()?;
        let version = filename
            .strip_prefix(RELEASE_PREFIX)?
            .strip_suffix(&suffix)?
            .to_string();
        return Some(ReleaseEntry { url: line.to_string(), version });
    }
    None
}

/// Dotted-numeric version comparison; non-numeric segments compare as 0.
#[must_use]
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.parse().unwrap_or(0))
            .collect()
    };
    parse(candidate) > parse(current)
}

/// Run the update. `replace` installs the downloaded binary over the
/// running one; a dry run reports intent without downloading.
pub async fn run<W, F>(out: &mut W, dry_run: bool, replace: F) -> Result<(), CliError>
where
    W: Write,
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let current = env!("CARGO_PKG_VERSION");
    let manifest = fetch_text(MANIFEST_URL).await?;
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    let Some(entry) = select_entry(&manifest, os, arch) else {
        return Err(CliError::Command(format!(
            "no release available for {os}-{arch}"
        )));
    };
    debug!(version = %entry.version, url = %entry.url, "manifest entry selected");

    if !is_newer(&entry.version, current) {
        writeln!(out, "Client v{current} is up to date.")?;
        return Ok(());
    }
    if dry_run {
        writeln!(out, "Would update loft from v{current} to v{}.", entry.version)?;
        return Ok(());
    }

    writeln!(out, "Downloading loft v{}...", entry.version)?;
    let bytes = fetch_bytes(&entry.url).await?;
    let dir = std::env::temp_dir();
    let staged = dir.join(format!("loft-{}", entry.version));
    std::fs::write(&staged, bytes)?;
    replace(&staged)?;
    writeln!(out, "done, now running v{}.", entry.version)?;
    Ok(())
}

async fn fetch_text(url: &str) -> Result<String, CliError> {
    reqwest::get(url)
        .await
        .map_err(|e| CliError::Command(format!("could not fetch {url}: {e}")))?
        .error_for_status()
        .map_err(|e| CliError::Command(format!("could not fetch {url}: {e}")))?
        .text()
        .await
        .map_err(|e| CliError::Command(format!("could not read {url}: {e}")))
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, CliError> {
    Ok(reqwest::get(url)
        .await
        .map_err(|e| CliError::Command(format!("could not fetch {url}: {e}")))?
        .error_for_status()
        .map_err(|e| CliError::Command(format!("could not fetch {url}: {e}")))?
        .bytes()
        .await
        .map_err(|e| CliError::Command(format!("could not read {url}: {e}")))?
        .to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
https://downloads.loftpaas.com/cli/loft-1.5.0-linux-x86_64
https://downloads.loftpaas.com/cli/loft-1.5.0-darwin-aarch64
https://downloads.loftpaas.com/cli/loft-1.5.0-windows-x86_64
";

    #[test]
    fn selects_matching_os_arch_line() {
        let entry = select_entry(MANIFEST, "linux", "x86_64").expect("entry");
        assert_eq!(entry.version, "1.5.0");
        assert!(entry.url.ends_with("loft-1.5.0-linux-x86_64"));
    }

    #[test]
    fn no_entry_for_unknown_platform() {
        assert!(select_entry(MANIFEST, "plan9", "mips").is_none());
    }

    #[test]
    fn version_comparison_is_numeric() {
        assert!(is_newer("1.10.0", "1.9.3"));
        assert!(!is_newer("1.4.0", "1.4.0"));
        assert!(!is_newer("1.3.9", "1.4.0"));
        assert!(is_newer("2.0", "1.99.99"));
    }
}
