//! `ps` command group: running processes.

use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand};

use loft_api::ps;

use crate::commands::{self, Session};
use crate::dispatch;
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct PsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List processes.
    #[command(name = "ps:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
        /// Only processes of this type.
        #[arg(long)]
        ptype: Option<String>,
    },
    /// Print scheduler events for one process.
    #[command(name = "ps:describe")]
    Describe {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Scale process types as ptype=count pairs.
    #[command(name = "ps:scale")]
    Scale {
        #[arg(required = true)]
        targets: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Restart processes; without arguments, all of them.
    #[command(name = "ps:restart")]
    Restart {
        /// Process types or process names to restart.
        targets: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
        /// Skip the restart-everything prompt.
        #[arg(long)]
        confirm: bool,
    },
    /// Run a command inside a running process.
    #[command(name = "ps:exec")]
    Exec {
        name: String,
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `ps` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<PsCli>(invocation)? else {
        return Ok(());
    };
    match cli.cmd {
        Cmd::List { app, ptype } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            print_processes(out, &mut session, &app, ptype.as_deref()).await
        }
        Cmd::Describe { name, app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(ps::describe(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {name} Events")?;
            let mut table = Table::new(&["REASON", "MESSAGE", "CREATED"]);
            for event in &page.results {
                table.add_row([
                    event.reason.clone(),
                    event.message.clone(),
                    event.created.clone(),
                ]);
            }
            table.render(out)?;
            Ok(())
        }
        Cmd::Scale { targets, app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            let mut counts = std::collections::BTreeMap::new();
            for token in &targets {
                let (ptype, count) = parsers::parse_scale(token)?;
                counts.insert(ptype, count);
            }
            writeln!(out, "Scaling processes... but first, {}!", commands::drink())?;
            out.flush()?;
            let started = Instant::now();
            let scaled =
                commands::with_spinner(ps::scale(&mut session.client, &app, &counts)).await;
            session.check_api_compat();
            scaled?;
            writeln!(out, "done in {}s", started.elapsed().as_secs())?;
            print_processes(out, &mut session, &app, None).await
        }
        Cmd::Restart { targets, app, confirm } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            if targets.is_empty() && !confirm {
                let proceed = commands::prompt_yes_no(&format!(
                    "This will restart all processes of {app}, proceed?"
                ))?;
                if !proceed {
                    return Err(CliError::Cancelled("restart aborted".into()));
                }
            }
            let (ptypes, names) = if targets.is_empty() {
                (Vec::new(), Vec::new())
            } else {
                let fetched =
                    commands::with_spinner(ps::ptypes(&mut session.client, &app)).await;
                session.check_api_compat();
                let known: Vec<String> =
                    fetched?.results.into_iter().map(|ptype| ptype.name).collect();
                split_targets(targets, &known)
            };
            writeln!(out, "Restarting processes... but first, {}!", commands::drink())?;
            out.flush()?;
            let started = Instant::now();
            let restarted = commands::with_spinner(ps::restart(
                &mut session.client,
                &app,
                &ptypes,
                &names,
            ))
            .await;
            session.check_api_compat();
            restarted?;
            writeln!(out, "done in {}s", started.elapsed().as_secs())?;
            Ok(())
        }
        Cmd::Exec { name, command, app } => exec(invocation, &name, &command, app.as_ref()),
    }
}

async fn print_processes<W: Write>(
    out: &mut W,
    session: &mut Session,
    app: &str,
    ptype: Option<&str>,
) -> Result<(), CliError> {
    let fetched = commands::with_spinner(ps::list(&mut session.client, app, ptype)).await;
    session.check_api_compat();
    let page = fetched?;
    writeln!(out, "=== {app} Processes{}", page.page_note())?;
    let mut table = Table::new(&["NAME", "RELEASE", "STATE", "PTYPE", "STARTED"]);
    for process in &page.results {
        table.add_row([
            process.name.clone(),
            process.release.clone(),
            process.state.clone(),
            process.ptype.clone(),
            process.started.clone(),
        ]);
    }
    table.render(out)?;
    Ok(())
}

/// Split restart targets into process types and pod names by checking
/// them against the app's declared process types. Hyphens alone cannot
/// tell the two apart: ptype names may contain them.
fn split_targets(targets: Vec<String>, known_ptypes: &[String]) -> (Vec<String>, Vec<String>) {
    targets
        .into_iter()
        .partition(|target| known_ptypes.iter().any(|ptype| ptype == target))
}

/// Interactive exec needs a TTY-capable transport, which lives in a
/// separate helper binary.
fn exec(
    invocation: &Invocation,
    name: &str,
    command: &[String],
    app_flag: Option<&String>,
) -> Result<(), CliError> {
    let Some(binary) = dispatch::find_external("ps-exec") else {
        return Err(CliError::Command(
            "ps:exec needs the loft-ps-exec helper on your PATH".into(),
        ));
    };
    let mut args = Vec::new();
    if let Some(config) = &invocation.config {
        args.push(format!("--config={config}"));
    }
    if let Some(app) = app_flag {
        args.push(format!("--app={app}"));
    }
    args.push(name.to_string());
    args.extend(command.iter().cloned());
    dispatch::run_external(&binary, &args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_requires_targets() {
        assert!(PsCli::try_parse_from(["loft", "ps:scale", "--app=shop"]).is_err());
    }

    #[test]
    fn restart_targets_are_optional() {
        let cli = PsCli::try_parse_from(["loft", "ps:restart", "--app=shop", "--confirm"])
            .expect("parse");
        let Cmd::Restart { targets, confirm, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert!(targets.is_empty());
        assert!(confirm);
    }

    #[test]
    fn pod_names_are_split_from_ptypes() {
        let known = vec!["web".to_string(), "worker-io-batch".to_string()];
        let targets = vec![
            "web".to_string(),
            "web-5c7b9f-x2x9k".to_string(),
            "worker-io-batch".to_string(),
        ];
        let (ptypes, names) = split_targets(targets, &known);
        assert_eq!(ptypes, vec!["web", "worker-io-batch"]);
        assert_eq!(names, vec!["web-5c7b9f-x2x9k"]);
    }
}
