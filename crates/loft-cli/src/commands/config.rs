//! `config` command group: environment variables, app-wide or scoped to
//! one process type.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};

use loft_api::config;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::KvBlock;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct ConfigCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List environment variables.
    #[command(name = "config:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
        /// Show variables scoped to one process type.
        #[arg(long)]
        ptype: Option<String>,
    },
    /// Set environment variables.
    #[command(name = "config:set")]
    Set {
        /// Variables as KEY=value pairs.
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
        /// Scope the variables to one process type.
        #[arg(long)]
        ptype: Option<String>,
    },
    /// Unset environment variables.
    #[command(name = "config:unset")]
    Unset {
        /// Variable names.
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long)]
        ptype: Option<String>,
    },
    /// Extract environment variables to a file.
    #[command(name = "config:pull")]
    Pull {
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long)]
        ptype: Option<String>,
        /// Destination file.
        #[arg(long, default_value = ".env")]
        path: String,
        /// Overwrite an existing file without prompting.
        #[arg(short, long)]
        overwrite: bool,
    },
    /// Set environment variables from a file.
    #[command(name = "config:push")]
    Push {
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long)]
        ptype: Option<String>,
        /// Source file; `-` reads standard input.
        #[arg(long, default_value = ".env")]
        path: String,
    },
}

/// Dispatch a `config` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<ConfigCli>(invocation)? else {
        return Ok(());
    };
    match cli.cmd {
        Cmd::List { app, ptype } => list(invocation, out, app.as_ref(), ptype.as_deref()).await,
        Cmd::Set { pairs, app, ptype } => {
            set(invocation, out, &pairs, app.as_ref(), ptype.as_deref()).await
        }
        Cmd::Unset { keys, app, ptype } => {
            unset(invocation, out, &keys, app.as_ref(), ptype.as_deref()).await
        }
        Cmd::Pull { app, ptype, path, overwrite } => {
            pull(invocation, out, app.as_ref(), ptype.as_deref(), &path, overwrite).await
        }
        Cmd::Push { app, ptype, path } => {
            push(invocation, out, app.as_ref(), ptype.as_deref(), &path).await
        }
    }
}

/// Values visible at the requested scope.
fn scoped(config: &config::Config, ptype: Option<&str>) -> BTreeMap<String, String> {
    match ptype {
        Some(ptype) => config.typed_values.get(ptype).cloned().unwrap_or_default(),
        None => config.values.clone(),
    }
}

fn body(pairs: Map<String, Value>, ptype: Option<&str>) -> Value {
    match ptype {
        Some(ptype) => json!({ "typed_values": { ptype: pairs } }),
        None => json!({ "values": pairs }),
    }
}

async fn list<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
    ptype: Option<&str>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
    session.check_api_compat();
    let config = fetched?;
    writeln!(out, "=== {app} Config")?;
    KvBlock::from_map(&scoped(&config, ptype)).render(out)?;
    Ok(())
}

async fn set<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    tokens: &[String],
    app_flag: Option<&String>,
    ptype: Option<&str>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    let parsed = parsers::parse_key_values(tokens)?;

    for key in parsed.keys().filter(|key| key.starts_with("HEALTHCHECK_")) {
        writeln!(
            out,
            "Warning: {key} is deprecated, set healthchecks with `loft healthchecks:set` instead"
        )?;
    }

    let mut pairs = Map::new();
    for (key, value) in parsed {
        // Private keys may be given as PEM text, base64 or a file path;
        // the controller expects base64 PEM.
        let value = if key == "SSH_KEY" {
            parsers::parse_ssh_private_key(&value)?
        } else {
            value
        };
        pairs.insert(key, Value::String(value));
    }

    write!(out, "Creating config... ")?;
    out.flush()?;
    let updated =
        commands::with_spinner(config::set(&mut session.client, &app, body(pairs, ptype))).await;
    session.check_api_compat();
    let config = updated?;
    writeln!(out, "done\n")?;
    writeln!(out, "=== {app} Config")?;
    KvBlock::from_map(&scoped(&config, ptype)).render(out)?;
    Ok(())
}

async fn unset<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    keys: &[String],
    app_flag: Option<&String>,
    ptype: Option<&str>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;

    let mut pairs = Map::new();
    for key in keys {
        pairs.insert(key.clone(), Value::Null);
    }

    write!(out, "Removing config... ")?;
    out.flush()?;
    let updated =
        commands::with_spinner(config::set(&mut session.client, &app, body(pairs, ptype))).await;
    session.check_api_compat();
    let config = updated?;
    writeln!(out, "done\n")?;
    writeln!(out, "=== {app} Config")?;
    KvBlock::from_map(&scoped(&config, ptype)).render(out)?;
    Ok(())
}

async fn pull<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
    ptype: Option<&str>,
    path: &str,
    overwrite: bool,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;

    if Path::new(path).exists() && !overwrite {
        let keep = commands::prompt_yes_no(&format!("{path} already exists, overwrite?"))?;
        if !keep {
            return Err(CliError::Cancelled(format!("{path} not overwritten")));
        }
    }

    let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
    session.check_api_compat();
    let config = fetched?;

    let mut file = std::fs::File::create(path)?;
    for (key, value) in scoped(&config, ptype) {
        writeln!(file, "{key}={value}")?;
    }
    writeln!(out, "Config for {app} written to {path}")?;
    Ok(())
}

async fn push<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
    ptype: Option<&str>,
    path: &str,
) -> Result<(), CliError> {
    let text = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().lock().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| CliError::Validation(format!("could not read {path}: {e}")))?
    };
    let tokens: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect();
    set(invocation, out, &tokens, app_flag, ptype).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_reads_typed_values() {
        let mut config = config::Config::default();
        config.values.insert("GLOBAL".into(), "1".into());
        config
            .typed_values
            .entry("web".into())
            .or_default()
            .insert("WEB_ONLY".into(), "2".into());

        assert_eq!(scoped(&config, None).get("GLOBAL").map(String::as_str), Some("1"));
        let web = scoped(&config, Some("web"));
        assert_eq!(web.get("WEB_ONLY").map(String::as_str), Some("2"));
        assert!(web.get("GLOBAL").is_none());
        assert!(scoped(&config, Some("worker")).is_empty());
    }

    #[test]
    fn body_scopes_to_ptype() {
        let mut pairs = Map::new();
        pairs.insert("DEBUG".into(), Value::String("1".into()));
        assert_eq!(
            body(pairs.clone(), None),
            json!({"values": {"DEBUG": "1"}})
        );
        assert_eq!(
            body(pairs, Some("web")),
            json!({"typed_values": {"web": {"DEBUG": "1"}}})
        );
    }

    #[test]
    fn set_requires_at_least_one_pair() {
        assert!(ConfigCli::try_parse_from(["loft", "config:set", "--app=a"]).is_err());
    }
}
