//! `pts` command group: process types (deployments).

use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand};

use loft_api::ps;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct PtsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List process types.
    #[command(name = "pts:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Print the deployed spec of one process type.
    #[command(name = "pts:describe")]
    Describe {
        ptype: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Restart whole process types.
    #[command(name = "pts:restart")]
    Restart {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Scale process types up from zero.
    #[command(name = "pts:start")]
    Start {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Scale process types to zero.
    #[command(name = "pts:stop")]
    Stop {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove idle, scaled-to-zero process types.
    #[command(name = "pts:clean")]
    Clean {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `pts` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<PtsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(ps::ptypes(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Process Types{}", page.page_note())?;
            let mut table =
                Table::new(&["NAME", "RELEASE", "READY", "UP-TO-DATE", "AVAILABLE", "STARTED"]);
            for ptype in &page.results {
                table.add_row([
                    ptype.name.clone(),
                    ptype.release.clone(),
                    ptype.ready.clone(),
                    ptype.up_to_date.to_string(),
                    ptype.available.to_string(),
                    ptype.started.clone(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Describe { ptype, app } => {
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(ps::ptype_describe(&mut session.client, &app, &ptype))
                    .await;
            session.check_api_compat();
            let spec = fetched?;
            writeln!(out, "=== {app} Process Type {ptype}")?;
            let rendered = serde_yaml::to_string(&spec)
                .map_err(|e| CliError::Command(format!("could not render spec: {e}")))?;
            write!(out, "{rendered}")?;
        }
        Cmd::Restart { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            writeln!(out, "Restarting process types... but first, {}!", commands::drink())?;
            out.flush()?;
            let started = Instant::now();
            let restarted =
                commands::with_spinner(ps::restart(&mut session.client, &app, &ptypes, &[]))
                    .await;
            session.check_api_compat();
            restarted?;
            writeln!(out, "done in {}s", started.elapsed().as_secs())?;
        }
        Cmd::Start { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Starting {}... ", ptypes.join(", "))?;
            out.flush()?;
            let done = commands::with_spinner(ps::start(&mut session.client, &app, &ptypes)).await;
            session.check_api_compat();
            done?;
            writeln!(out, "done")?;
        }
        Cmd::Stop { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Stopping {}... ", ptypes.join(", "))?;
            out.flush()?;
            let done = commands::with_spinner(ps::stop(&mut session.client, &app, &ptypes)).await;
            session.check_api_compat();
            done?;
            writeln!(out, "done")?;
        }
        Cmd::Clean { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Cleaning {}... ", ptypes.join(", "))?;
            out.flush()?;
            let done = commands::with_spinner(ps::clean(&mut session.client, &app, &ptypes)).await;
            session.check_api_compat();
            done?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_requires_ptypes() {
        assert!(PtsCli::try_parse_from(["loft", "pts:start", "--app=shop"]).is_err());
        let cli = PtsCli::try_parse_from(["loft", "pts:stop", "web", "worker", "--app=shop"])
            .expect("parse");
        let Cmd::Stop { ptypes, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(ptypes, vec!["web", "worker"]);
    }
}
