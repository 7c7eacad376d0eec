//! `releases` command group.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::releases;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::{KvBlock, Table};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct ReleasesCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List an application's releases.
    #[command(name = "releases:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Print details about one release.
    #[command(name = "releases:info")]
    Info {
        /// Release version, as v3 or 3.
        version: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Deploy the latest release to its process types.
    #[command(name = "releases:deploy")]
    Deploy {
        /// Process types to deploy; all when omitted.
        ptypes: Vec<String>,
        #[arg(long)]
        force: bool,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Roll back to a previous release.
    #[command(name = "releases:rollback")]
    Rollback {
        /// Release version to roll back to; previous when omitted.
        version: Option<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `releases` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<ReleasesCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(releases::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Releases{}", page.page_note())?;
            let mut table = Table::new(&["VERSION", "STATE", "OWNER", "CREATED", "SUMMARY"]);
            for release in &page.results {
                table.add_row([
                    format!("v{}", release.version),
                    release.state.clone(),
                    release.owner.clone(),
                    release.created.clone(),
                    release.summary.clone(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Info { version, app } => {
            let app = session.app(app.as_ref())?;
            let version = parsers::parse_version(&version)?;
            let fetched =
                commands::with_spinner(releases::get(&mut session.client, &app, version)).await;
            session.check_api_compat();
            let release = fetched?;
            writeln!(out, "=== {app} Release v{version}")?;
            let mut block = KvBlock::new();
            block.push("uuid", release.uuid);
            block.push("state", release.state);
            block.push("owner", release.owner);
            block.push("summary", release.summary);
            if !release.exception.is_empty() {
                block.push("exception", release.exception);
            }
            block.push("created", release.created);
            block.push("updated", release.updated);
            block.render(out)?;
        }
        Cmd::Deploy { ptypes, force, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Deploying {app}... ")?;
            out.flush()?;
            let deployed = commands::with_spinner(releases::deploy(
                &mut session.client,
                &app,
                &ptypes,
                force,
            ))
            .await;
            session.check_api_compat();
            deployed?;
            writeln!(out, "done")?;
        }
        Cmd::Rollback { version, app } => {
            let app = session.app(app.as_ref())?;
            let target = match &version {
                Some(token) => Some(parsers::parse_version(token)?),
                None => None,
            };
            match target {
                Some(version) => write!(out, "Rolling back to v{version}... ")?,
                None => write!(out, "Rolling back one release... ")?,
            }
            out.flush()?;
            let rolled =
                commands::with_spinner(releases::rollback(&mut session.client, &app, target))
                    .await;
            session.check_api_compat();
            let new_version = rolled?;
            writeln!(out, "done, v{new_version}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_version_is_optional() {
        let cli = ReleasesCli::try_parse_from(["loft", "releases:rollback", "--app=shop"])
            .expect("parse");
        let Cmd::Rollback { version, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert!(version.is_none());

        let cli = ReleasesCli::try_parse_from(["loft", "releases:rollback", "v3", "--app=shop"])
            .expect("parse");
        let Cmd::Rollback { version, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(version.as_deref(), Some("v3"));
    }
}
