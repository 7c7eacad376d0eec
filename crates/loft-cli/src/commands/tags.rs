//! `tags` command group: scheduling tags on the config document.

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
struct TagsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List scheduling tags.
    #[command(name = "tags:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Set tags as key=value pairs.
    #[command(name = "tags:set")]
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove tags.
    #[command(name = "tags:unset")]
    Unset {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `tags` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<TagsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
            session.check_api_compat();
            let config = fetched?;
            writeln!(out, "=== {app} Tags")?;
            KvBlock::from_map(&config.tags).render(out)?;
        }
        Cmd::Set { pairs, app } => {
            let app = session.app(app.as_ref())?;
            let parsed = parsers::parse_key_values(&pairs)?;
            let mut tags = Map::new();
            for (key, value) in parsed {
                tags.insert(key, Value::String(value));
            }
            write!(out, "Applying tags... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "tags": tags }),
            ))
            .await;
            session.check_api_compat();
            let config = applied?;
            writeln!(out, "done\n")?;
            writeln!(out, "=== {app} Tags")?;
            KvBlock::from_map(&config.tags).render(out)?;
        }
        Cmd::Unset { keys, app } => {
            let app = session.app(app.as_ref())?;
            let mut tags = Map::new();
            for key in keys {
                tags.insert(key, Value::Null);
            }
            write!(out, "Applying tags... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "tags": tags }),
            ))
            .await;
            session.check_api_compat();
            let config = applied?;
            writeln!(out, "done\n")?;
            writeln!(out, "=== {app} Tags")?;
            KvBlock::from_map(&config.tags).render(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_requires_pairs() {
        assert!(TagsCli::try_parse_from(["loft", "tags:set", "--app=shop"]).is_err());
    }
}
