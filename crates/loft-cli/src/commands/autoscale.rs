//! `autoscale` command group: CPU-driven horizontal scaling policies.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::appsettings::{self, AutoscalePolicy};

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct AutoscaleCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List autoscale policies.
    #[command(name = "autoscale:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Set the autoscale policy of a process type.
    #[command(name = "autoscale:set")]
    Set {
        ptype: String,
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
        /// Target CPU utilisation percentage.
        #[arg(long)]
        cpu_percent: u32,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove the autoscale policy of a process type.
    #[command(name = "autoscale:unset")]
    Unset {
        ptype: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `autoscale` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<AutoscaleCli>(invocation)? else {
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
            writeln!(out, "=== {app} Autoscale")?;
            let mut table = Table::new(&["PTYPE", "MIN", "MAX", "CPU%"]);
            for (ptype, policy) in &settings.autoscale {
                table.add_row([
                    ptype.clone(),
                    policy.min.to_string(),
                    policy.max.to_string(),
                    policy.cpu_percent.to_string(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Set { ptype, min, max, cpu_percent, app } => {
            if min > max {
                return Err(CliError::Validation(format!(
                    "--min {min} cannot exceed --max {max}"
                )));
            }
            let app = session.app(app.as_ref())?;
            write!(out, "Applying autoscale settings for process type {ptype} on {app}... ")?;
            out.flush()?;
            let policy = AutoscalePolicy { min, max, cpu_percent };
            let applied = commands::with_spinner(appsettings::autoscale_set(
                &mut session.client,
                &app,
                &ptype,
                policy,
            ))
            .await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
        Cmd::Unset { ptype, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Removing autoscale for process type {ptype} on {app}... ")?;
            out.flush()?;
            let removed = commands::with_spinner(appsettings::autoscale_unset(
                &mut session.client,
                &app,
                &ptype,
            ))
            .await;
            session.check_api_compat();
            removed?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_requires_all_three_bounds() {
        assert!(AutoscaleCli::try_parse_from([
            "loft",
            "autoscale:set",
            "web",
            "--min=2",
            "--max=8",
        ])
        .is_err());
        let cli = AutoscaleCli::try_parse_from([
            "loft",
            "autoscale:set",
            "web",
            "--min=2",
            "--max=8",
            "--cpu-percent=75",
        ])
        .expect("parse");
        let Cmd::Set { min, max, cpu_percent, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!((min, max, cpu_percent), (2, 8, 75));
    }
}
