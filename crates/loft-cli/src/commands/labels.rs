//! `labels` command group: free-form labels on the app settings
//! document.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};

use loft_api::appsettings;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::KvBlock;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct LabelsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List labels.
    #[command(name = "labels:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Set labels as key=value pairs.
    #[command(name = "labels:set")]
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove labels.
    #[command(name = "labels:unset")]
    Unset {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `labels` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<LabelsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(appsettings::get(&mut session.client, &app)).await;
            session.check_api_compat();
            let settings = fetched?;
            writeln!(out, "=== {app} Labels")?;
            let mut block = KvBlock::new();
            for (key, value) in &settings.label {
                block.push(key.clone(), display(value));
            }
            block.render(out)?;
        }
        Cmd::Set { pairs, app } => {
            let app = session.app(app.as_ref())?;
            let parsed = parsers::parse_key_values(&pairs)?;
            let mut label = Map::new();
            for (key, value) in parsed {
                label.insert(key, Value::String(value));
            }
            write!(out, "Applying labels on {app}... ")?;
            out.flush()?;
            let applied = commands::with_spinner(appsettings::set(
                &mut session.client,
                &app,
                json!({ "label": label }),
            ))
            .await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
        Cmd::Unset { keys, app } => {
            let app = session.app(app.as_ref())?;
            let mut label = Map::new();
            for key in keys {
                label.insert(key, Value::Null);
            }
            write!(out, "Removing labels on {app}... ")?;
            out.flush()?;
            let removed = commands::with_spinner(appsettings::set(
                &mut session.client,
                &app,
                json!({ "label": label }),
            ))
            .await;
            session.check_api_compat();
            removed?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

/// Labels are arbitrary JSON; strings render without quotes.
fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_render_unquoted() {
        assert_eq!(display(&Value::String("team-a".into())), "team-a");
        assert_eq!(display(&json!(42)), "42");
    }
}
