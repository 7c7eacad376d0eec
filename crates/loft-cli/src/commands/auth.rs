//! `auth` command group: login, logout, whoami.

use std::io::Write;

use clap::{Parser, Subcommand};
use tokio::time::{Duration, sleep};
use url::Url;

use loft_api::auth::{self, TokenGrant};
use loft_api::Client;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::profile::{self, Profile};
use crate::table::KvBlock;

/// Polling schedule for the browser login flow.
const LOGIN_POLL_ATTEMPTS: u32 = 120;
const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct AuthCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Log in to a controller and save the session.
    #[command(name = "auth:login")]
    Login {
        /// Controller URL, e.g. https://loft.example.com.
        controller: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Verify the controller's TLS certificate.
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        ssl_verify: bool,
    },
    /// Remove the saved session.
    #[command(name = "auth:logout")]
    Logout,
    /// Print the logged-in user.
    #[command(name = "auth:whoami")]
    Whoami {
        /// Fetch the full account record from the controller.
        #[arg(long)]
        all: bool,
    },
}

/// Dispatch a `auth` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<AuthCli>(invocation)? else {
        return Ok(());
    };
    match cli.cmd {
        Cmd::Login { controller, username, password, ssl_verify } => {
            login(invocation, out, &controller, username, password, ssl_verify).await
        }
        Cmd::Logout => logout(invocation, out),
        Cmd::Whoami { all } => whoami(invocation, out, all).await,
    }
}

async fn login<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    controller: &str,
    username: Option<String>,
    password: Option<String>,
    ssl_verify: bool,
) -> Result<(), CliError> {
    let mut profile = Profile::new(controller, ssl_verify);
    let mut client = Client::new(&profile.controller, "", ssl_verify, profile.response_limit)?;

    let grant = match (username, password) {
        (Some(username), Some(password)) => {
            auth::login(&mut client, &username, &password).await?
        }
        (None, None) => browser_login(&mut client, out, "").await?,
        _ => {
            return Err(CliError::Usage(
                "--username and --password must be given together".into(),
            ));
        }
    };

    profile.username = grant.username.clone();
    profile.token = grant.token;
    let path = profile::save(&profile, invocation.config.as_deref())?;
    writeln!(out, "Logged in as {}", grant.username)?;
    writeln!(out, "Configuration file written to {}", path.display())?;
    Ok(())
}

/// Browser-mediated token grant: open the controller's login page and
/// poll until the token has been issued.
pub async fn browser_login<W: Write>(
    client: &mut Client,
    out: &mut W,
    alias: &str,
) -> Result<TokenGrant, CliError> {
    let login_url = auth::login_url(client).await?;
    let key = key_param(&login_url)?;

    writeln!(out, "Opening browser to {login_url}")?;
    commands::open_browser(&login_url)?;
    writeln!(out, "Waiting for login... but first, {}!", commands::drink())?;
    out.flush()?;

    for _ in 0..LOGIN_POLL_ATTEMPTS {
        if let Some(grant) = auth::token_status(client, &key, alias).await? {
            return Ok(grant);
        }
        sleep(LOGIN_POLL_INTERVAL).await;
    }
    Err(CliError::Command(
        "timed out waiting for the browser login to complete".into(),
    ))
}

fn key_param(login_url: &str) -> Result<String, CliError> {
    let parsed = Url::parse(login_url)
        .map_err(|e| CliError::Command(format!("controller sent a bad login URL: {e}")))?;
    parsed
        .query_pairs()
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            CliError::Command("controller login URL is missing the key parameter".into())
        })
}

fn logout<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    profile::delete(invocation.config.as_deref())?;
    writeln!(out, "Logged out")?;
    Ok(())
}

async fn whoami<W: Write>(invocation: &Invocation, out: &mut W, all: bool) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    if !all {
        writeln!(
            out,
            "You are {} at {}",
            session.profile.username, session.profile.controller
        )?;
        return Ok(());
    }
    let fetched = auth::whoami(&mut session.client).await;
    session.check_api_compat();
    let user = fetched?;
    writeln!(out, "=== User")?;
    let mut block = KvBlock::new();
    block.push("username", user.username);
    block.push("email", user.email);
    block.push("superuser", user.is_superuser.to_string());
    block.push("joined", user.date_joined);
    block.render(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_param_extraction() {
        let key = key_param("https://loft.example.com/v2/login/?key=abc123").expect("key");
        assert_eq!(key, "abc123");
        assert!(key_param("https://loft.example.com/v2/login/").is_err());
        assert!(key_param("not a url").is_err());
    }

    #[test]
    fn login_requires_both_credentials() {
        let cli = AuthCli::try_parse_from([
            "loft",
            "auth:login",
            "https://loft.example.com",
            "--username=ada",
        ])
        .expect("parse");
        let Cmd::Login { username, password, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(username.as_deref(), Some("ada"));
        assert!(password.is_none());
    }

    #[test]
    fn ssl_verify_accepts_explicit_false() {
        let cli = AuthCli::try_parse_from([
            "loft",
            "auth:login",
            "https://loft.example.com",
            "--ssl-verify=false",
        ])
        .expect("parse");
        let Cmd::Login { ssl_verify, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert!(!ssl_verify);
    }
}
