//! `builds` command group: list builds and submit prebuilt images.

use std::io::Write;
use std::path::Path;

use clap::{Parser, Subcommand};

use loft_api::builds;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct BuildsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List an application's builds.
    #[command(name = "builds:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Deploy a prebuilt image.
    #[command(name = "builds:create")]
    Create {
        /// Fully-qualified image reference.
        image: String,
        #[arg(short, long)]
        app: Option<String>,
        /// Base stack the image targets.
        #[arg(long)]
        stack: Option<String>,
        /// Path to a Procfile; defaults to ./Procfile when present.
        #[arg(long)]
        procfile: Option<String>,
        /// Path to a loft.yaml; defaults to ./loft.yaml when present.
        #[arg(long)]
        loftfile: Option<String>,
    },
}

/// Dispatch a `builds` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<BuildsCli>(invocation)? else {
        return Ok(());
    };
    match cli.cmd {
        Cmd::List { app } => list(invocation, out, app.as_ref()).await,
        Cmd::Create { image, app, stack, procfile, loftfile } => {
            create(
                invocation,
                out,
                &image,
                app.as_ref(),
                stack.as_deref(),
                procfile.as_deref(),
                loftfile.as_deref(),
            )
            .await
        }
    }
}

async fn list<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    let fetched = commands::with_spinner(builds::list(&mut session.client, &app)).await;
    session.check_api_compat();
    let page = fetched?;
    writeln!(out, "=== {app} Builds{}", page.page_note())?;
    let mut table = Table::new(&["UUID", "OWNER", "SHA", "CREATED"]);
    for build in &page.results {
        table.add_row([
            build.uuid.clone(),
            build.owner.clone(),
            build.sha.clone(),
            build.created.clone(),
        ]);
    }
    table.render(out)?;
    Ok(())
}

async fn create<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    image: &str,
    app_flag: Option<&String>,
    stack: Option<&str>,
    procfile_path: Option<&str>,
    loftfile_path: Option<&str>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;

    let procfile = match resolve_file(procfile_path, "Procfile")? {
        Some(text) => Some(parsers::parse_procfile(&text)?),
        None => None,
    };
    let loftfile = match resolve_file(loftfile_path, "loft.yaml")? {
        Some(text) => Some(serde_yaml::from_str(&text).map_err(|e| {
            CliError::Validation(format!("could not parse loft.yaml: {e}"))
        })?),
        None => None,
    };

    write!(out, "Creating build... ")?;
    out.flush()?;
    let created = commands::with_spinner(builds::create(
        &mut session.client,
        &app,
        image,
        stack,
        procfile.as_ref(),
        loftfile.as_ref(),
    ))
    .await;
    session.check_api_compat();
    created?;
    writeln!(out, "done")?;
    Ok(())
}

/// Read an explicitly-given file, else the conventional file in the
/// working directory when it exists.
fn resolve_file(explicit: Option<&str>, conventional: &str) -> Result<Option<String>, CliError> {
    if let Some(path) = explicit {
        return Ok(Some(std::fs::read_to_string(path).map_err(|e| {
            CliError::Validation(format!("could not read {path}: {e}"))
        })?));
    }
    if Path::new(conventional).is_file() {
        return Ok(Some(std::fs::read_to_string(conventional)?));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_parses_image_and_stack() {
        let cli = BuildsCli::try_parse_from([
            "loft",
            "builds:create",
            "registry.example.com/scenic:v7",
            "--app=scenic",
            "--stack=container",
        ])
        .expect("parse");
        let Cmd::Create { image, stack, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(image, "registry.example.com/scenic:v7");
        assert_eq!(stack.as_deref(), Some("container"));
    }

    #[test]
    fn explicit_missing_procfile_is_an_error() {
        let err = resolve_file(Some("/nonexistent/Procfile"), "Procfile").expect_err("err");
        assert!(err.to_string().contains("/nonexistent/Procfile"));
    }
}
