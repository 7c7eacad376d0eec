//! `canary` command group: process types deployed as canaries.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::json;

use loft_api::appsettings;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct CanaryCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List canary process types.
    #[command(name = "canary:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Mark process types as canaries.
    #[command(name = "canary:create")]
    Create {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Unmark canary process types.
    #[command(name = "canary:remove")]
    Remove {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `canary` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<CanaryCli>(invocation)? else {
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
            writeln!(out, "=== {app} Canaries")?;
            for ptype in &settings.canaries {
                writeln!(out, "{ptype}")?;
            }
        }
        Cmd::Create { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            let current = appsettings::get(&mut session.client, &app).await?;
            let mut canaries = current.canaries;
            for ptype in ptypes {
                if !canaries.contains(&ptype) {
                    canaries.push(ptype);
                }
            }
            write!(out, "Applying canary settings for {app}... ")?;
            out.flush()?;
            let applied = commands::with_spinner(appsettings::set(
                &mut session.client,
                &app,
                json!({ "canaries": canaries }),
            ))
            .await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            let current = appsettings::get(&mut session.client, &app).await?;
            let canaries: Vec<String> = current
                .canaries
                .into_iter()
                .filter(|existing| !ptypes.contains(existing))
                .collect();
            write!(out, "Applying canary settings for {app}... ")?;
            out.flush()?;
            let applied = commands::with_spinner(appsettings::set(
                &mut session.client,
                &app,
                json!({ "canaries": canaries }),
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
    fn create_requires_ptypes() {
        assert!(CanaryCli::try_parse_from(["loft", "canary:create", "--app=shop"]).is_err());
    }
}
