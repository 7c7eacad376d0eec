//! `perms` command group: per-app user permissions and cluster admins.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::perms;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct PermsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List permissions on an app, or cluster admins.
    #[command(name = "perms:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
        /// Operate on cluster administrators instead of an app.
        #[arg(long)]
        admin: bool,
    },
    /// Grant permissions to a user.
    #[command(name = "perms:add")]
    Add {
        username: String,
        /// Comma-separated permissions, e.g. view,change,delete.
        permissions: Option<String>,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long)]
        admin: bool,
    },
    /// Replace a user's permissions.
    #[command(name = "perms:update")]
    Update {
        username: String,
        /// Comma-separated permissions.
        permissions: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Revoke a user's permissions.
    #[command(name = "perms:remove")]
    Remove {
        username: String,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long)]
        admin: bool,
    },
}

/// Dispatch a `perms` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<PermsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app, admin } => {
            if admin {
                let fetched = commands::with_spinner(perms::list_admins(&mut session.client)).await;
                session.check_api_compat();
                let page = fetched?;
                writeln!(out, "=== Administrators{}", page.page_note())?;
                for admin in &page.results {
                    writeln!(out, "{}", admin.username)?;
                }
            } else {
                let app = session.app(app.as_ref())?;
                let fetched =
                    commands::with_spinner(perms::list(&mut session.client, &app)).await;
                session.check_api_compat();
                let page = fetched?;
                writeln!(out, "=== {app}'s Users{}", page.page_note())?;
                let mut table = Table::new(&["USERNAME", "PERMISSIONS"]);
                for perm in &page.results {
                    table.add_row([perm.username.clone(), perm.permissions.join(",")]);
                }
                table.render(out)?;
            }
        }
        Cmd::Add { username, permissions, app, admin } => {
            if admin {
                write!(out, "Adding {username} to system administrators... ")?;
                out.flush()?;
                let added =
                    commands::with_spinner(perms::add_admin(&mut session.client, &username)).await;
                session.check_api_compat();
                added?;
                writeln!(out, "done")?;
            } else {
                let app = session.app(app.as_ref())?;
                let permissions = split(permissions.as_deref().unwrap_or("view"));
                write!(out, "Adding {username} to {app} collaborators... ")?;
                out.flush()?;
                let added = commands::with_spinner(perms::create(
                    &mut session.client,
                    &app,
                    &username,
                    &permissions,
                ))
                .await;
                session.check_api_compat();
                added?;
                writeln!(out, "done")?;
            }
        }
        Cmd::Update { username, permissions, app } => {
            let app = session.app(app.as_ref())?;
            let permissions = split(&permissions);
            write!(out, "Updating {username}'s permissions on {app}... ")?;
            out.flush()?;
            let updated = commands::with_spinner(perms::update(
                &mut session.client,
                &app,
                &username,
                &permissions,
            ))
            .await;
            session.check_api_compat();
            updated?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { username, app, admin } => {
            if admin {
                write!(out, "Removing {username} from system administrators... ")?;
                out.flush()?;
                let removed =
                    commands::with_spinner(perms::remove_admin(&mut session.client, &username))
                        .await;
                session.check_api_compat();
                removed?;
                writeln!(out, "done")?;
            } else {
                let app = session.app(app.as_ref())?;
                write!(out, "Removing {username} from {app}... ")?;
                out.flush()?;
                let removed = commands::with_spinner(perms::remove(
                    &mut session.client,
                    &app,
                    &username,
                ))
                .await;
                session.check_api_compat();
                removed?;
                writeln!(out, "done")?;
            }
        }
    }
    Ok(())
}

fn split(permissions: &str) -> Vec<String> {
    permissions
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_split_on_commas() {
        assert_eq!(split("view,change , delete"), vec!["view", "change", "delete"]);
        assert_eq!(split("view"), vec!["view"]);
    }

    #[test]
    fn add_defaults_to_view_permission() {
        let cli = PermsCli::try_parse_from(["loft", "perms:add", "ada", "--app=shop"])
            .expect("parse");
        let Cmd::Add { permissions, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert!(permissions.is_none());
    }
}
