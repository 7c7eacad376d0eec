//! `tokens` command group: long-lived API tokens.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::tokens;

use crate::commands::{self, Session, auth};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct TokensCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List your API tokens.
    #[command(name = "tokens:list")]
    List,
    /// Mint a new API token via the browser login flow.
    #[command(name = "tokens:add")]
    Add {
        /// Alias to remember the token by.
        alias: String,
    },
    /// Revoke an API token.
    #[command(name = "tokens:remove")]
    Remove {
        id: String,
        /// Skip the interactive prompt.
        #[arg(long)]
        confirm: bool,
    },
}

/// Dispatch a `tokens` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<TokensCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List => {
            let fetched = commands::with_spinner(tokens::list(&mut session.client)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== Tokens{}", page.page_note())?;
            let mut table = Table::new(&["UUID", "ALIAS", "KEY", "CREATED"]);
            for token in &page.results {
                table.add_row([
                    token.uuid.clone(),
                    token.alias.clone(),
                    token.fuzzy_key.clone(),
                    token.created.clone(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Add { alias } => {
            let grant = auth::browser_login(&mut session.client, out, &alias).await?;
            session.check_api_compat();
            writeln!(out, "done, token {alias} created for {}", grant.username)?;
        }
        Cmd::Remove { id, confirm } => {
            if !confirm {
                let proceed = commands::prompt_yes_no(&format!(
                    "This will revoke token {id}, proceed?"
                ))?;
                if !proceed {
                    return Err(CliError::Cancelled("token not revoked".into()));
                }
            }
            write!(out, "Removing token {id}... ")?;
            out.flush()?;
            let removed = commands::with_spinner(tokens::remove(&mut session.client, &id)).await;
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
    fn add_requires_an_alias() {
        assert!(TokensCli::try_parse_from(["loft", "tokens:add"]).is_err());
        let cli = TokensCli::try_parse_from(["loft", "tokens:add", "ci"]).expect("parse");
        assert!(matches!(cli.cmd, Cmd::Add { alias } if alias == "ci"));
    }
}
