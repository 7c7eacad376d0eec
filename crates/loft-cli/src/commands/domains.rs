//! `domains` command group.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::domains;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct DomainsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List domains bound to an application.
    #[command(name = "domains:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Bind a domain.
    #[command(name = "domains:add")]
    Add {
        domain: String,
        #[arg(short, long)]
        app: Option<String>,
        /// Process type the domain routes to.
        #[arg(long, default_value = "web")]
        ptype: String,
    },
    /// Unbind a domain.
    #[command(name = "domains:remove")]
    Remove {
        domain: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `domains` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<DomainsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(domains::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Domains{}", page.page_note())?;
            let mut table = Table::new(&["DOMAIN", "PTYPE", "CREATED"]);
            for domain in &page.results {
                table.add_row([
                    domain.domain.clone(),
                    domain.ptype.clone(),
                    domain.created.clone(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Add { domain, app, ptype } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Adding {domain} to {app}... ")?;
            out.flush()?;
            let added = commands::with_spinner(domains::add(
                &mut session.client,
                &app,
                &domain,
                &ptype,
            ))
            .await;
            session.check_api_compat();
            added?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { domain, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Removing {domain} from {app}... ")?;
            out.flush()?;
            let removed =
                commands::with_spinner(domains::remove(&mut session.client, &app, &domain)).await;
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
    fn add_defaults_ptype_to_web() {
        let cli =
            DomainsCli::try_parse_from(["loft", "domains:add", "shop.example.com", "--app=shop"])
                .expect("parse");
        let Cmd::Add { ptype, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(ptype, "web");
    }
}
