//! `registry` command group: private registry credentials per process
//! type, stored on the config document.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};

use loft_api::config;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::KvBlock;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct RegistryCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List registry credentials.
    #[command(name = "registry:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long, default_value = "web")]
        ptype: String,
    },
    /// Set credentials as username=... password=... pairs.
    #[command(name = "registry:set")]
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long, default_value = "web")]
        ptype: String,
    },
    /// Remove credentials.
    #[command(name = "registry:unset")]
    Unset {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long, default_value = "web")]
        ptype: String,
    },
}

/// Dispatch a `registry` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<RegistryCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app, ptype } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
            session.check_api_compat();
            let config = fetched?;
            writeln!(out, "=== {app} Registry")?;
            let creds = config.registry.get(&ptype).cloned().unwrap_or_default();
            KvBlock::from_map(&creds).render(out)?;
        }
        Cmd::Set { pairs, app, ptype } => {
            let app = session.app(app.as_ref())?;
            let parsed = parsers::parse_key_values(&pairs)?;
            for key in parsed.keys() {
                if key != "username" && key != "password" {
                    return Err(CliError::Validation(format!(
                        "{key} is not a registry field; use username and password"
                    )));
                }
            }
            let mut creds = Map::new();
            for (key, value) in parsed {
                creds.insert(key, Value::String(value));
            }
            write!(out, "Applying registry information... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "registry": { &ptype: creds } }),
            ))
            .await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
        Cmd::Unset { keys, app, ptype } => {
            let app = session.app(app.as_ref())?;
            let mut creds = Map::new();
            for key in keys {
                creds.insert(key, Value::Null);
            }
            write!(out, "Applying registry information... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "registry": { &ptype: creds } }),
            ))
            .await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_credential_pairs() {
        let cli = RegistryCli::try_parse_from([
            "loft",
            "registry:set",
            "username=ada",
            "password=hunter2",
            "--app=shop",
        ])
        .expect("parse");
        let Cmd::Set { pairs, ptype, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(ptype, "web");
    }
}
