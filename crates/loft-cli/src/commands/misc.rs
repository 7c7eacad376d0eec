//! Small standalone commands: `version`, `shortcuts` and `update`.

use std::io::Write;

use clap::{Parser, Subcommand};

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::shortcuts::SHORTCUTS;
use crate::table::Table;
use crate::update;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft")]
struct VersionCli {
    /// Also print the controller's API version.
    #[arg(long)]
    all: bool,
}

/// Print the client version, and the API versions with `--all`.
pub async fn version<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let mut argv = invocation.argv.clone();
    // The bare `version` token is not a flag clap needs to see.
    if argv.first().map(String::as_str) == Some("version") {
        argv.remove(0);
    }
    let trimmed = Invocation {
        group: invocation.group.clone(),
        argv,
        config: invocation.config.clone(),
    };
    let Some(cli) = commands::parse_group::<VersionCli>(&trimmed)? else {
        return Ok(());
    };
    writeln!(out, "loft v{}", env!("CARGO_PKG_VERSION"))?;
    if cli.all {
        let mut session = Session::load(invocation.config.as_deref())?;
        // Any cheap call populates the server's reported version.
        let _ = loft_api::apps::list(&mut session.client).await;
        writeln!(out, "client API version: {}", loft_api::API_VERSION)?;
        writeln!(out, "server API version: {}", session.client.api_version)?;
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct ShortcutsCli {
    #[command(subcommand)]
    cmd: ShortcutsCmd,
}

#[derive(Subcommand)]
enum ShortcutsCmd {
    /// List command shortcuts.
    #[command(name = "shortcuts:list")]
    List,
}

/// Print the table of single-word command shortcuts.
pub fn shortcuts<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<ShortcutsCli>(invocation)? else {
        return Ok(());
    };
    let ShortcutsCmd::List = cli.cmd;
    writeln!(out, "=== Shortcuts")?;
    let mut table = Table::new(&["SHORTCUT", "COMMAND"]);
    for (short, full) in SHORTCUTS {
        table.add_row([(*short).to_string(), (*full).to_string()]);
    }
    table.render(out)?;
    Ok(())
}

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft")]
struct UpdateCli {
    /// The update token itself.
    #[arg(hide = true)]
    _command: Option<String>,
    /// Report the available version without installing it.
    #[arg(long)]
    dry_run: bool,
}

/// Replace the running binary with the latest published release.
pub async fn self_update<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<UpdateCli>(invocation)? else {
        return Ok(());
    };
    update::run(out, cli.dry_run, replace_running_binary).await
}

/// Swap the running executable for the staged download, keeping its
/// permission bits.
fn replace_running_binary(staged: &std::path::Path) -> std::io::Result<()> {
    let current = std::env::current_exe()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(staged, std::fs::Permissions::from_mode(0o755))?;
    }
    // Rename over the live binary fails across filesystems; fall back
    // to copy-then-rename next to it.
    if std::fs::rename(staged, &current).is_err() {
        let sibling = current.with_extension("new");
        std::fs::copy(staged, &sibling)?;
        std::fs::rename(&sibling, &current)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn shortcuts_list_renders_all_entries() {
        let argv: Vec<String> = vec!["shortcuts:list".into()];
        let invocation = parser::normalize(&argv);
        let mut buffer = Vec::new();
        shortcuts(&invocation, &mut buffer).expect("render");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.starts_with("=== Shortcuts\n"));
        for (short, full) in SHORTCUTS {
            assert!(text.contains(short), "{short}");
            assert!(text.contains(full), "{full}");
        }
    }
}
