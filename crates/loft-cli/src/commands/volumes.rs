//! `volumes` command group: persistent volumes and their mounts.

use std::collections::BTreeMap;
use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::Value;

use loft_api::volumes;

use crate::commands::{self, Session};
use crate::dispatch;
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::{KvBlock, Table};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct VolumesCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create a volume.
    #[command(name = "volumes:create")]
    Create {
        name: String,
        /// Size like 500G.
        size: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Grow a volume.
    #[command(name = "volumes:expand")]
    Expand {
        name: String,
        /// New size like 500G.
        size: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// List volumes.
    #[command(name = "volumes:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Print details about a volume.
    #[command(name = "volumes:info")]
    Info {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Delete a volume.
    #[command(name = "volumes:delete")]
    Delete {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Mount a volume into process types as ptype=/path pairs.
    #[command(name = "volumes:mount")]
    Mount {
        name: String,
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Unmount a volume from process types.
    #[command(name = "volumes:unmount")]
    Unmount {
        name: String,
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Browse volume contents (ls, cp, rm) via the filer helper.
    #[command(name = "volumes:client")]
    Client {
        #[arg(trailing_var_arg = true, required = true)]
        args: Vec<String>,
    },
}

/// Dispatch a `volumes` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<VolumesCli>(invocation)? else {
        return Ok(());
    };
    match cli.cmd {
        Cmd::Create { name, size, app } => {
            parsers::parse_volume_size(&size)?;
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            write!(out, "Creating {name} for {app}... ")?;
            out.flush()?;
            let created = commands::with_spinner(volumes::create(
                &mut session.client,
                &app,
                &name,
                &size,
            ))
            .await;
            session.check_api_compat();
            created?;
            writeln!(out, "done")?;
        }
        Cmd::Expand { name, size, app } => {
            parsers::parse_volume_size(&size)?;
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            write!(out, "Expanding {name} to {size}... ")?;
            out.flush()?;
            let expanded = commands::with_spinner(volumes::expand(
                &mut session.client,
                &app,
                &name,
                &size,
            ))
            .await;
            session.check_api_compat();
            let volume = expanded?;
            writeln!(out, "done, size {}", volume.size)?;
        }
        Cmd::List { app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(volumes::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Volumes{}", page.page_note())?;
            let mut table = Table::new(&["NAME", "SIZE", "TYPE", "OWNER"]);
            for volume in &page.results {
                table.add_row([
                    volume.name.clone(),
                    volume.size.clone(),
                    volume.kind.clone(),
                    volume.owner.clone(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Info { name, app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(volumes::get(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            let volume = fetched?;
            writeln!(out, "=== {app} Volume {name}")?;
            let mut block = KvBlock::new();
            block.push("size", volume.size);
            block.push("type", volume.kind);
            block.push("owner", volume.owner);
            for (ptype, path) in &volume.path {
                block.push(format!("mount.{ptype}"), path.clone());
            }
            block.push("created", volume.created);
            block.push("updated", volume.updated);
            block.render(out)?;
        }
        Cmd::Delete { name, app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            write!(out, "Deleting {name} from {app}... ")?;
            out.flush()?;
            let deleted =
                commands::with_spinner(volumes::delete(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            deleted?;
            writeln!(out, "done")?;
        }
        Cmd::Mount { name, pairs, app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            let parsed = parsers::parse_key_values(&pairs)?;
            let mut path: BTreeMap<String, Value> = BTreeMap::new();
            for (ptype, mount) in parsed {
                if !mount.starts_with('/') {
                    return Err(CliError::Validation(format!(
                        "{mount} is not an absolute mount path"
                    )));
                }
                path.insert(ptype, Value::String(mount));
            }
            write!(out, "Mounting {name}... ")?;
            out.flush()?;
            let mounted = commands::with_spinner(volumes::patch_path(
                &mut session.client,
                &app,
                &name,
                &path,
            ))
            .await;
            session.check_api_compat();
            mounted?;
            writeln!(out, "done")?;
        }
        Cmd::Unmount { name, ptypes, app } => {
            let mut session = Session::load(invocation.config.as_deref())?;
            let app = session.app(app.as_ref())?;
            let mut path: BTreeMap<String, Value> = BTreeMap::new();
            for ptype in ptypes {
                path.insert(ptype, Value::Null);
            }
            write!(out, "Unmounting {name}... ")?;
            out.flush()?;
            let unmounted = commands::with_spinner(volumes::patch_path(
                &mut session.client,
                &app,
                &name,
                &path,
            ))
            .await;
            session.check_api_compat();
            unmounted?;
            writeln!(out, "done")?;
        }
        Cmd::Client { args } => {
            let Some(binary) = dispatch::find_external("volumes-client") else {
                return Err(CliError::Command(
                    "volumes:client needs the loft-volumes-client helper on your PATH".into(),
                ));
            };
            dispatch::run_external(&binary, &args)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_validates_size_before_any_call() {
        let cli = VolumesCli::try_parse_from([
            "loft",
            "volumes:create",
            "myvol",
            "500K",
            "--app=shop",
        ])
        .expect("parse");
        let Cmd::Create { size, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        let err = parsers::parse_volume_size(&size).expect_err("err");
        assert!(err.to_string().starts_with("500K doesn't fit format"));
    }

    #[test]
    fn client_collects_raw_args() {
        let cli = VolumesCli::try_parse_from([
            "loft",
            "volumes:client",
            "ls",
            "vol://myvol/",
        ])
        .expect("parse");
        let Cmd::Client { args } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(args, vec!["ls", "vol://myvol/"]);
    }
}
