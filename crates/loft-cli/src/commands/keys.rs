//! `keys` command group: SSH public keys for git push access.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use loft_api::keys;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct KeysCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List your SSH keys.
    #[command(name = "keys:list")]
    List,
    /// Upload an SSH public key.
    #[command(name = "keys:add")]
    Add {
        /// Path to the public key; omitted, ~/.ssh is scanned.
        file: Option<String>,
    },
    /// Remove an SSH key.
    #[command(name = "keys:remove")]
    Remove { id: String },
}

/// Dispatch a `keys` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<KeysCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List => {
            let fetched = commands::with_spinner(keys::list(&mut session.client)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== SSH Keys{}", page.page_note())?;
            let mut table = Table::new(&["ID", "KEY"]);
            for key in &page.results {
                table.add_row([key.id.clone(), abbreviate(&key.public)]);
            }
            table.render(out)?;
        }
        Cmd::Add { file } => {
            let path = match file {
                Some(file) => PathBuf::from(file),
                None => choose_key(out)?,
            };
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                CliError::Validation(format!("could not read {}: {e}", path.display()))
            })?;
            let (id, public) = parsers::parse_ssh_pubkey(&path, &contents)?;
            write!(out, "Uploading {id} to loft... ")?;
            out.flush()?;
            let added = commands::with_spinner(keys::add(&mut session.client, &id, &public)).await;
            session.check_api_compat();
            added?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { id } => {
            write!(out, "Removing {id}... ")?;
            out.flush()?;
            let removed = commands::with_spinner(keys::remove(&mut session.client, &id)).await;
            session.check_api_compat();
            removed?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

/// Scan ~/.ssh for public keys and let the user pick one.
fn choose_key<W: Write>(out: &mut W) -> Result<PathBuf, CliError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Validation("cannot locate your home directory".into()))?;
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(home.join(".ssh"))
        .map_err(|_| CliError::Validation("no ~/.ssh directory to scan; pass a key path".into()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "pub"))
        .collect();
    candidates.sort();
    if candidates.is_empty() {
        return Err(CliError::Validation(
            "no public keys found in ~/.ssh; pass a key path".into(),
        ));
    }

    writeln!(out, "Found the following SSH public keys:")?;
    for (index, path) in candidates.iter().enumerate() {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        writeln!(out, "{}) {}", index + 1, name.unwrap_or_default())?;
    }
    writeln!(out, "0) Enter path to pubfile (or use keys:add <key_path>)")?;
    out.flush()?;

    let answer = commands::prompt("Which would you like to use with Loft? ")?;
    if answer == "0" {
        let path = commands::prompt("Path to pubfile: ")?;
        return Ok(PathBuf::from(path));
    }
    let index: usize = answer
        .parse()
        .map_err(|_| CliError::Cancelled(format!("{answer} is not a valid selection")))?;
    candidates
        .get(index.wrapping_sub(1))
        .cloned()
        .ok_or_else(|| CliError::Cancelled(format!("{answer} is not a valid selection")))
}

/// Shorten key material for tabular display.
fn abbreviate(public: &str) -> String {
    let mut fields = public.split_whitespace();
    let (Some(algorithm), Some(material)) = (fields.next(), fields.next()) else {
        return public.to_string();
    };
    if material.len() <= 16 {
        return format!("{algorithm} {material}");
    }
    format!(
        "{algorithm} {}...{}",
        &material[..8],
        &material[material.len() - 8..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviate_keeps_ends_of_material() {
        let shortened = abbreviate("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIFtest1234 ada@laptop");
        assert_eq!(shortened, "ssh-ed25519 AAAAC3Nz...test1234");
    }

    #[test]
    fn abbreviate_passes_short_keys_through() {
        assert_eq!(abbreviate("ssh-rsa short"), "ssh-rsa short");
    }
}
