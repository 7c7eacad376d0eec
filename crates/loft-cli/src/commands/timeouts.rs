//! `timeouts` command group: termination grace periods per process
//! type.

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
struct TimeoutsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List termination grace periods.
    #[command(name = "timeouts:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Set grace periods as ptype=seconds pairs.
    #[command(name = "timeouts:set")]
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Reset process types to the default grace period.
    #[command(name = "timeouts:unset")]
    Unset {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `timeouts` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<TimeoutsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
            session.check_api_compat();
            let config = fetched?;
            writeln!(out, "=== {app} Timeouts")?;
            if config.termination_grace_period.is_empty() {
                writeln!(out, "default (30s) for all process types")?;
            } else {
                KvBlock::from_map(&config.termination_grace_period).render(out)?;
            }
        }
        Cmd::Set { pairs, app } => {
            let app = session.app(app.as_ref())?;
            let mut periods = Map::new();
            for token in &pairs {
                let (ptype, seconds) = parsers::parse_timeout(token)?;
                periods.insert(ptype, json!(seconds));
            }
            write!(out, "Applying timeouts... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "termination_grace_period": periods }),
            ))
            .await;
            session.check_api_compat();
            let config = applied?;
            writeln!(out, "done\n")?;
            writeln!(out, "=== {app} Timeouts")?;
            KvBlock::from_map(&config.termination_grace_period).render(out)?;
        }
        Cmd::Unset { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            let mut periods = Map::new();
            for ptype in ptypes {
                periods.insert(ptype, Value::Null);
            }
            write!(out, "Applying timeouts... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "termination_grace_period": periods }),
            ))
            .await;
            session.check_api_compat();
            let config = applied?;
            writeln!(out, "done\n")?;
            writeln!(out, "=== {app} Timeouts")?;
            KvBlock::from_map(&config.termination_grace_period).render(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_accepts_seconds_tokens() {
        let cli = TimeoutsCli::try_parse_from(["loft", "timeouts:set", "web=30", "--app=shop"])
            .expect("parse");
        let Cmd::Set { pairs, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(pairs, vec!["web=30"]);
    }
}
