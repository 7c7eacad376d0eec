//! `gateways` command group.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::gateways;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct GatewaysCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List gateways.
    #[command(name = "gateways:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Create a gateway, or add a listener to an existing one.
    #[command(name = "gateways:add")]
    Add {
        name: String,
        #[arg(long)]
        port: u16,
        #[arg(long, default_value = "HTTP")]
        protocol: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove a listener, or the whole gateway when it was the last one.
    #[command(name = "gateways:remove")]
    Remove {
        name: String,
        #[arg(long)]
        port: u16,
        #[arg(long, default_value = "HTTP")]
        protocol: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `gateways` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<GatewaysCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(gateways::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Gateways{}", page.page_note())?;
            let mut table = Table::new(&["NAME", "LISTENERS", "ADDRESSES"]);
            for gateway in &page.results {
                let listeners = gateway
                    .listeners
                    .iter()
                    .map(|l| format!("{}:{}/{}", l.name, l.port, l.protocol))
                    .collect::<Vec<_>>()
                    .join(",");
                let addresses = gateway
                    .addresses
                    .iter()
                    .map(|a| a.value.clone())
                    .collect::<Vec<_>>()
                    .join(",");
                table.add_row([gateway.name.clone(), listeners, addresses]);
            }
            table.render(out)?;
        }
        Cmd::Add { name, port, protocol, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Adding gateway {name} to {app}... ")?;
            out.flush()?;
            let added = commands::with_spinner(gateways::add(
                &mut session.client,
                &app,
                &name,
                port,
                &protocol,
            ))
            .await;
            session.check_api_compat();
            added?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { name, port, protocol, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Removing gateway {name} from {app}... ")?;
            out.flush()?;
            let removed = commands::with_spinner(gateways::remove(
                &mut session.client,
                &app,
                &name,
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
    fn add_requires_port() {
        assert!(GatewaysCli::try_parse_from(["loft", "gateways:add", "gw", "--app=a"]).is_err());
        let cli =
            GatewaysCli::try_parse_from(["loft", "gateways:add", "gw", "--port=443", "--app=a"])
                .expect("parse");
        let Cmd::Add { port, protocol, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(port, 443);
        assert_eq!(protocol, "HTTP");
    }
}
