//! `tls` command group: HTTPS enforcement and automatic certificate
//! issuance.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::json;

use loft_api::appsettings;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::KvBlock;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct TlsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print TLS settings.
    #[command(name = "tls:info")]
    Info {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Redirect all HTTP traffic to HTTPS.
    #[command(name = "tls:force:enable")]
    ForceEnable {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Stop redirecting HTTP traffic.
    #[command(name = "tls:force:disable")]
    ForceDisable {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Issue certificates automatically via ACME.
    #[command(name = "tls:auto:enable")]
    AutoEnable {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Stop issuing certificates automatically.
    #[command(name = "tls:auto:disable")]
    AutoDisable {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Configure the ACME issuer account.
    #[command(name = "tls:auto:issuer")]
    AutoIssuer {
        #[arg(long)]
        email: String,
        #[arg(long)]
        server: String,
        #[arg(long, default_value = "")]
        key_id: String,
        #[arg(long, default_value = "")]
        key_secret: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `tls` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<TlsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::Info { app } => {
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(appsettings::tls_get(&mut session.client, &app)).await;
            session.check_api_compat();
            let tls = fetched?;
            writeln!(out, "=== {app} TLS")?;
            let mut block = KvBlock::new();
            block.push("https enforced", option_state(tls.https_enforced));
            block.push("certs auto", option_state(tls.certs_auto_enabled));
            if let Some(issuer) = &tls.issuer {
                block.push("issuer email", issuer.email.clone());
                block.push("issuer server", issuer.server.clone());
            }
            block.render(out)?;
        }
        Cmd::ForceEnable { app } => {
            set(&mut session, out, app.as_ref(), json!({ "https_enforced": true }),
                "Enabling https-only requests").await?;
        }
        Cmd::ForceDisable { app } => {
            set(&mut session, out, app.as_ref(), json!({ "https_enforced": false }),
                "Disabling https-only requests").await?;
        }
        Cmd::AutoEnable { app } => {
            set(&mut session, out, app.as_ref(), json!({ "certs_auto_enabled": true }),
                "Enabling automatic certificates").await?;
        }
        Cmd::AutoDisable { app } => {
            set(&mut session, out, app.as_ref(), json!({ "certs_auto_enabled": false }),
                "Disabling automatic certificates").await?;
        }
        Cmd::AutoIssuer { email, server, key_id, key_secret, app } => {
            let body = json!({
                "issuer": {
                    "email": email,
                    "server": server,
                    "key_id": key_id,
                    "key_secret": key_secret,
                }
            });
            set(&mut session, out, app.as_ref(), body, "Configuring certificate issuer").await?;
        }
    }
    Ok(())
}

async fn set<W: Write>(
    session: &mut Session,
    out: &mut W,
    app_flag: Option<&String>,
    body: serde_json::Value,
    action: &str,
) -> Result<(), CliError> {
    let app = session.app(app_flag)?;
    write!(out, "{action} for {app}... ")?;
    out.flush()?;
    let applied =
        commands::with_spinner(appsettings::tls_set(&mut session.client, &app, body)).await;
    session.check_api_compat();
    applied?;
    writeln!(out, "done")?;
    Ok(())
}

fn option_state(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "enabled",
        Some(false) => "disabled",
        None => "not set",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_verbs_parse() {
        let cli = TlsCli::try_parse_from(["loft", "tls:force:enable", "--app=shop"])
            .expect("parse");
        assert!(matches!(cli.cmd, Cmd::ForceEnable { .. }));
    }

    #[test]
    fn issuer_requires_email_and_server() {
        assert!(TlsCli::try_parse_from(["loft", "tls:auto:issuer", "--email=a@b.c"]).is_err());
    }

    #[test]
    fn tri_state_rendering() {
        assert_eq!(option_state(None), "not set");
        assert_eq!(option_state(Some(true)), "enabled");
    }
}
