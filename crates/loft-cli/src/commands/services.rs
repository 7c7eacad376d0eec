//! `services` command group: extra service ports on process types.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::services;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct ServicesCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List services.
    #[command(name = "services:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Expose a port on a process type.
    #[command(name = "services:add")]
    Add {
        #[arg(long)]
        ptype: String,
        #[arg(long)]
        port: u16,
        #[arg(long, default_value = "TCP")]
        protocol: String,
        #[arg(long)]
        target_port: u16,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove an exposed port.
    #[command(name = "services:remove")]
    Remove {
        #[arg(long)]
        ptype: String,
        #[arg(long)]
        port: u16,
        #[arg(long, default_value = "TCP")]
        protocol: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `services` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<ServicesCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(services::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let listing = fetched?;
            writeln!(out, "=== {app} Services")?;
            let mut table = Table::new(&["PTYPE", "PORT", "PROTOCOL", "TARGET-PORT"]);
            for service in &listing {
                table.add_row([
                    service.ptype.clone(),
                    service.port.to_string(),
                    service.protocol.clone(),
                    service.target_port.to_string(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Add { ptype, port, protocol, target_port, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Creating service for {app}... ")?;
            out.flush()?;
            let added = commands::with_spinner(services::add(
                &mut session.client,
                &app,
                &ptype,
                port,
                &protocol,
                target_port,
            ))
            .await;
            session.check_api_compat();
            added?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { ptype, port, protocol, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Deleting service from {app}... ")?;
            out.flush()?;
            let removed = commands::with_spinner(services::remove(
                &mut session.client,
                &app,
                &ptype,
                port,
                &protocol,
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
    fn add_needs_ptype_port_and_target() {
        assert!(ServicesCli::try_parse_from([
            "loft",
            "services:add",
            "--ptype=worker",
            "--port=9090",
        ])
        .is_err());
        let cli = ServicesCli::try_parse_from([
            "loft",
            "services:add",
            "--ptype=worker",
            "--port=9090",
            "--target-port=9090",
        ])
        .expect("parse");
        let Cmd::Add { protocol, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(protocol, "TCP");
    }
}
