//! Git remote helper.
//!
//! Commands never parse git output directly; they go through these
//! operations. The builder remote URL is derived from the controller
//! host: the first `loft` label becomes `loft-builder`, and pushes go
//! over SSH on port 2222.

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::CliError;

const BUILDER_PORT: u16 = 2222;

/// Derive the git builder host from the controller host.
#[must_use]
pub fn builder_host(host: &str) -> String {
    if host.contains("loft") {
        host.replacen("loft", "loft-builder", 1)
    } else {
        format!("loft-builder.{host}")
    }
}

/// The builder remote URL for an app.
#[must_use]
pub fn builder_url(host: &str, app: &str) -> String {
    format!("ssh://git@{}:{BUILDER_PORT}/{app}.git", builder_host(host))
}

fn git(args: &[&str]) -> Result<String, CliError> {
    debug!(?args, "running git");
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|e| CliError::Git(format!("could not run git: {e}")))?;
    if !output.status.success() {
        return Err(CliError::Git(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Add a remote pointing at the app's builder URL.
pub fn create_remote(host: &str, remote: &str, app: &str) -> Result<(), CliError> {
    git(&["remote", "add", remote, &builder_url(host, app)])?;
    Ok(())
}

/// Remote names in the current repository whose URL is the app's builder
/// URL.
pub fn app_remotes(host: &str, app: &str) -> Result<Vec<String>, CliError> {
    let wanted = builder_url(host, app);
    let listing = git(&["remote", "-v"])?;
    let mut names: Vec<String> = listing
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let url = fields.next()?;
            (url == wanted).then(|| name.to_string())
        })
        .collect();
    names.dedup();
    Ok(names)
}

/// Remove every remote pointing at the app's builder URL.
pub fn delete_app_remotes(host: &str, app: &str) -> Result<(), CliError> {
    for name in app_remotes(host, app)? {
        git(&["remote", "remove", &name])?;
    }
    Ok(())
}

/// Detect the app the working directory belongs to: the remote matching
/// the builder host wins, else the lowercased directory name.
pub fn detect_app_name(host: &str) -> Result<String, CliError> {
    let builder = builder_host(host);
    if let Ok(listing) = git(&["remote", "-v"]) {
        for line in listing.lines() {
            let mut fields = line.split_whitespace();
            let (Some(_name), Some(url)) = (fields.next(), fields.next()) else {
                continue;
            };
            if url.contains(&builder) {
                if let Some(app) = app_from_url(url) {
                    return Ok(app);
                }
            }
        }
    }
    let dir = env::current_dir()?;
    dir.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .ok_or_else(|| {
            CliError::Validation(
                "no app given, no builder remote found and no directory name to fall back on; \
                 use --app"
                    .into(),
            )
        })
}

/// URL of a named remote.
pub fn remote_url(name: &str) -> Result<String, CliError> {
    Ok(git(&["remote", "get-url", name])?.trim().to_string())
}

fn app_from_url(url: &str) -> Option<String> {
    url.rsplit('/')
        .next()?
        .strip_suffix(".git")
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_host_replaces_first_label() {
        assert_eq!(builder_host("loft.example.com"), "loft-builder.example.com");
        assert_eq!(builder_host("api.example.com"), "loft-builder.api.example.com");
    }

    #[test]
    fn builder_url_shape() {
        assert_eq!(
            builder_url("loft.example.com", "lorem-ipsum"),
            "ssh://git@loft-builder.example.com:2222/lorem-ipsum.git"
        );
    }

    #[test]
    fn app_from_url_strips_suffix() {
        assert_eq!(
            app_from_url("ssh://git@loft-builder.example.com:2222/lorem-ipsum.git"),
            Some("lorem-ipsum".to_string())
        );
        assert_eq!(app_from_url("https://example.com/no-suffix"), None);
    }
}
