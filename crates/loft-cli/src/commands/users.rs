//! `users` command group: administrator-only account management.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::users;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct UsersCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List all accounts.
    #[command(name = "users:list")]
    List,
    /// Re-enable a disabled account.
    #[command(name = "users:enable")]
    Enable { username: String },
    /// Disable an account.
    #[command(name = "users:disable")]
    Disable { username: String },
}

/// Dispatch a `users` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<UsersCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List => {
            let fetched = commands::with_spinner(users::list(&mut session.client)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== Users{}", page.page_note())?;
            let mut table = Table::new(&["USERNAME", "EMAIL", "ACTIVE", "SUPERUSER"]);
            for user in &page.results {
                table.add_row([
                    user.username.clone(),
                    user.email.clone(),
                    user.is_active.to_string(),
                    user.is_superuser.to_string(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Enable { username } => {
            write!(out, "Enabling {username}... ")?;
            out.flush()?;
            let enabled =
                commands::with_spinner(users::enable(&mut session.client, &username)).await;
            session.check_api_compat();
            enabled?;
            writeln!(out, "done")?;
        }
        Cmd::Disable { username } => {
            write!(out, "Disabling {username}... ")?;
            out.flush()?;
            let disabled =
                commands::with_spinner(users::disable(&mut session.client, &username)).await;
            session.check_api_compat();
            disabled?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_takes_a_username() {
        let cli = UsersCli::try_parse_from(["loft", "users:enable", "ada"]).expect("parse");
        assert!(matches!(cli.cmd, Cmd::Enable { username } if username == "ada"));
    }
}
