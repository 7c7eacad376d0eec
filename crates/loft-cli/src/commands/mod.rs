//! Command runners, one module per command group.
//!
//! Every runner follows the same pattern: parse the group's verbs with
//! clap, load the profile into a [`Session`], resolve the app context,
//! print an action sentence, run the SDK call under a spinner, pass the
//! response through the API compatibility check, then print `done` and
//! any result table.

pub mod apps;
pub mod auth;
pub mod autoscale;
pub mod builds;
pub mod canary;
pub mod certs;
pub mod config;
pub mod domains;
pub mod gateways;
pub mod healthchecks;
pub mod keys;
pub mod labels;
pub mod limits;
pub mod misc;
pub mod perms;
pub mod ps;
pub mod pts;
pub mod registry;
pub mod releases;
pub mod resources;
pub mod routes;
pub mod services;
pub mod settings;
pub mod tags;
pub mod timeouts;
pub mod tls;
pub mod tokens;
pub mod users;
pub mod volumes;

use std::env;
use std::future::Future;
use std::io::{self, BufRead, Write};

use clap::Parser;
use clap::error::ErrorKind;

use loft_api::{ApiError, Client};

use crate::error::CliError;
use crate::git;
use crate::parser::{self, Invocation};
use crate::profile::{self, Profile};
use crate::progress::Spinner;

/// Per-invocation session: profile, controller client and the
/// warn-once state for API version mismatches.
#[derive(Debug)]
pub struct Session {
    /// The loaded profile.
    pub profile: Profile,
    /// Profile name/path the session was loaded from (`--config`).
    pub config: Option<String>,
    /// Controller client.
    pub client: Client,
    warned: bool,
}

impl Session {
    /// Load the profile and build a client, failing with `NoSession`
    /// when the user has not logged in.
    pub fn load(config: Option<&str>) -> Result<Self, CliError> {
        let profile = profile::load(config)?;
        let client = Client::new(
            &profile.controller,
            &profile.token,
            profile.ssl_verify,
            profile.response_limit,
        )?;
        Ok(Self {
            profile,
            config: config.map(ToString::to_string),
            client,
            warned: false,
        })
    }

    /// Resolve the app a command operates on: the `--app` flag wins,
    /// else the builder remote of the working directory.
    pub fn app(&self, flag: Option<&String>) -> Result<String, CliError> {
        match flag {
            Some(app) => Ok(app.clone()),
            None => git::detect_app_name(&self.client.hostname()),
        }
    }

    /// Emit the API mismatch warning to stderr at most once per
    /// invocation.
    pub fn check_api_compat(&mut self) {
        self.check_api_compat_to(&mut io::stderr());
    }

    /// Writer-injectable form of [`Session::check_api_compat`]. The
    /// warning is best-effort; write failures are swallowed.
    pub fn check_api_compat_to<W: Write>(&mut self, err: &mut W) {
        if self.warned || !self.client.version_mismatch() {
            return;
        }
        self.warned = true;
        let _ = writeln!(
            err,
            "WARNING: Client and server API versions do not match. Please consider upgrading."
        );
        let _ = writeln!(err, "Client version: {}", loft_api::API_VERSION);
        let _ = writeln!(err, "Server version: {}", self.client.api_version);
        let _ = err.flush();
    }
}

/// Parse a group's verbs from the normalised argv.
///
/// `Ok(None)` means help/version was rendered and the command is done.
pub fn parse_group<T: Parser>(invocation: &Invocation) -> Result<Option<T>, CliError> {
    match T::try_parse_from(parser::clap_args(invocation)) {
        Ok(cli) => Ok(Some(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            Ok(None)
        }
        Err(e) => Err(CliError::Usage(e.render().to_string())),
    }
}

/// Run a controller call with a spinner on stdout. The spinner is
/// stopped, and its clear sequence flushed, on both paths.
pub async fn with_spinner<T, F>(call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let spinner = Spinner::start(io::stdout());
    let result = call.await;
    spinner.stop().await;
    result
}

/// Match a destructive confirmation against the expected value, either
/// from a `--confirm` flag or interactively.
pub fn confirm_destroy(
    kind: &str,
    expected: &str,
    provided: Option<&String>,
) -> Result<(), CliError> {
    let given = match provided {
        Some(value) => value.clone(),
        None => {
            println!(
                " !    WARNING: Potentially Destructive Action\n \
                 !    This command will destroy the {kind} {expected}\n \
                 !    To proceed, type \"{expected}\" or re-run this command with --confirm={expected}"
            );
            prompt("> ")?
        }
    };
    if given == expected {
        Ok(())
    } else {
        Err(CliError::Cancelled(format!(
            "{kind} {expected} does not match confirm {given}, aborting"
        )))
    }
}

/// Ask a yes/no question; anything but `y`/`yes` declines.
pub fn prompt_yes_no(question: &str) -> Result<bool, CliError> {
    let answer = prompt(&format!("{question} (y/N): "))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// Print a prompt and read one trimmed line from stdin.
pub fn prompt(text: &str) -> Result<String, CliError> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// The user's drink of choice, consulted by cosmetic messages.
#[must_use]
pub fn drink() -> String {
    env::var("LOFT_DRINK_OF_CHOICE").unwrap_or_else(|_| "coffee".to_string())
}

/// Open a URL in the user's browser; falls back to printing the URL.
pub fn open_browser(url: &str) -> Result<(), CliError> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    let spawned = std::process::Command::new(opener)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn();
    if spawned.is_err() {
        println!("Please open this URL in your browser:\n{url}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drink_defaults_to_coffee() {
        // The variable is unset in the test environment.
        if env::var("LOFT_DRINK_OF_CHOICE").is_err() {
            assert_eq!(drink(), "coffee");
        }
    }

    #[test]
    fn confirm_flag_mismatch_aborts_with_message() {
        let err = confirm_destroy("app", "lorem-ipsum", Some(&"bad-confirm".to_string()))
            .expect_err("mismatch");
        assert_eq!(
            err.to_string(),
            "app lorem-ipsum does not match confirm bad-confirm, aborting"
        );
    }

    #[test]
    fn confirm_flag_match_passes() {
        assert!(confirm_destroy("app", "lorem-ipsum", Some(&"lorem-ipsum".to_string())).is_ok());
    }

    fn mismatching_session() -> Session {
        let profile = Profile::new("https://loft.example.com", true);
        let mut client = Client::new(&profile.controller, "", true, 100).expect("client");
        client.api_version = "9.9".to_string();
        Session { profile, config: None, client, warned: false }
    }

    #[test]
    fn api_mismatch_warns_exactly_once() {
        let mut session = mismatching_session();
        let mut err = Vec::new();
        session.check_api_compat_to(&mut err);
        session.check_api_compat_to(&mut err);
        let text = String::from_utf8(err).expect("utf8");
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("WARNING: Client and server API versions do not match."));
        assert!(text.contains(&format!("Client version: {}", loft_api::API_VERSION)));
        assert!(text.contains("Server version: 9.9"));
    }

    #[test]
    fn matching_versions_stay_silent() {
        let mut session = mismatching_session();
        session.client.api_version = loft_api::API_VERSION.to_string();
        let mut err = Vec::new();
        session.check_api_compat_to(&mut err);
        assert!(err.is_empty());
    }
}
