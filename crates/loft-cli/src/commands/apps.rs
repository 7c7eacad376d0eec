//! `apps` command group: lifecycle of applications.

use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tokio::time::{Duration, sleep};

use loft_api::{apps, domains, ps};

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::git;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::{KvBlock, Table};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct AppsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create a new application.
    #[command(name = "apps:create")]
    Create {
        /// Application id; the controller generates one when omitted.
        id: Option<String>,
        /// Name of the git remote to create.
        #[arg(long, default_value = "loft")]
        remote: String,
        /// Skip creating a git remote.
        #[arg(long)]
        no_remote: bool,
    },
    /// List applications visible to the current user.
    #[command(name = "apps:list")]
    List,
    /// Print details about an application.
    #[command(name = "apps:info")]
    Info {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Open the application in the default browser.
    #[command(name = "apps:open")]
    Open {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Retrieve the most recent log entries.
    #[command(name = "apps:logs")]
    Logs {
        #[arg(short, long)]
        app: Option<String>,
        /// Number of lines to retrieve.
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: i64,
        /// Keep the stream open and follow new entries.
        #[arg(short, long)]
        follow: bool,
        /// Stop following after this many seconds.
        #[arg(short, long, default_value_t = 300)]
        timeout: u64,
    },
    /// Run an ephemeral command in the application image.
    #[command(name = "apps:run")]
    Run {
        #[arg(short, long)]
        app: Option<String>,
        /// Seconds the command may run before the controller kills it.
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
        /// Seconds the finished pod is retained for inspection.
        #[arg(long, default_value_t = 3600)]
        expires: u64,
        /// Volume mounts as volume=/path pairs.
        #[arg(long = "mount")]
        mounts: Vec<String>,
        /// The command to run.
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
    /// Destroy an application.
    #[command(name = "apps:destroy")]
    Destroy {
        #[arg(short, long)]
        app: Option<String>,
        /// Skip the interactive prompt by passing the app id.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Transfer ownership to another user.
    #[command(name = "apps:transfer")]
    Transfer {
        /// The receiving username.
        username: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `apps` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<AppsCli>(invocation)? else {
        return Ok(());
    };
    match cli.cmd {
        Cmd::Create { id, remote, no_remote } => {
            create(invocation, out, id.as_deref(), &remote, no_remote).await
        }
        Cmd::List => list(invocation, out).await,
        Cmd::Info { app } => info(invocation, out, app.as_ref()).await,
        Cmd::Open { app } => open(invocation, app.as_ref()).await,
        Cmd::Logs { app, lines, follow, timeout } => {
            logs(invocation, out, app.as_ref(), lines, follow, timeout).await
        }
        Cmd::Run { app, timeout, expires, mounts, command } => {
            run_cmd(invocation, out, app.as_ref(), timeout, expires, &mounts, &command).await
        }
        Cmd::Destroy { app, confirm } => {
            destroy(invocation, out, app.as_ref(), confirm.as_ref()).await
        }
        Cmd::Transfer { username, app } => {
            transfer(invocation, out, &username, app.as_ref()).await
        }
    }
}

async fn create<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    id: Option<&str>,
    remote: &str,
    no_remote: bool,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    write!(out, "Creating Application... ")?;
    out.flush()?;
    let created = commands::with_spinner(apps::create(&mut session.client, id)).await;
    session.check_api_compat();
    let app = created?;
    writeln!(out, "done, created {}", app.id)?;

    let host = session.client.hostname();
    if no_remote {
        writeln!(
            out,
            "If you deploy via git push, the builder remote is {}",
            git::builder_url(&host, &app.id)
        )?;
    } else {
        git::create_remote(&host, remote, &app.id)?;
        writeln!(out, "Git remote {remote} successfully created for app {}.", app.id)?;
    }
    Ok(())
}

async fn list<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let fetched = commands::with_spinner(apps::list(&mut session.client)).await;
    session.check_api_compat();
    let page = fetched?;
    writeln!(out, "=== Apps{}", page.page_note())?;
    for app in &page.results {
        writeln!(out, "{}", app.id)?;
    }
    Ok(())
}

async fn info<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;

    let fetched = commands::with_spinner(apps::get(&mut session.client, &app)).await;
    session.check_api_compat();
    let detail = fetched?;
    let ptypes = ps::ptypes(&mut session.client, &app).await?;
    let domains = domains::list(&mut session.client, &app).await?;
    let settings = loft_api::appsettings::get(&mut session.client, &app).await?;

    writeln!(out, "=== {app} Application")?;
    let mut block = KvBlock::new();
    block.push("url", detail.url);
    block.push("uuid", detail.uuid);
    block.push("owner", detail.owner);
    block.push("created", detail.created);
    block.push("updated", detail.updated);
    block.render(out)?;

    writeln!(out, "\n=== {app} Processes")?;
    let mut table = Table::new(&["NAME", "RELEASE", "READY", "AVAILABLE", "STARTED"]);
    for ptype in &ptypes.results {
        table.add_row([
            ptype.name.clone(),
            ptype.release.clone(),
            ptype.ready.clone(),
            ptype.available.to_string(),
            ptype.started.clone(),
        ]);
    }
    table.render(out)?;

    writeln!(out, "\n=== {app} Domains")?;
    for domain in &domains.results {
        writeln!(out, "{}", domain.domain)?;
    }

    if !settings.label.is_empty() {
        writeln!(out, "\n=== {app} Labels")?;
        let mut labels = KvBlock::new();
        for (key, value) in &settings.label {
            labels.push(key.clone(), value.to_string());
        }
        labels.render(out)?;
    }
    Ok(())
}

async fn open(invocation: &Invocation, app_flag: Option<&String>) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    let fetched = apps::get(&mut session.client, &app).await;
    session.check_api_compat();
    let detail = fetched?;
    if detail.url.is_empty() {
        return Err(CliError::Validation(format!(
            "app {app} has no URL; is it routable?"
        )));
    }
    let url = if detail.url.starts_with("http") {
        detail.url
    } else {
        format!("http://{}", detail.url)
    };
    commands::open_browser(&url)
}

async fn logs<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
    lines: i64,
    follow: bool,
    timeout: u64,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    let opened = apps::logs(&mut session.client, &app, lines, follow, timeout).await;
    session.check_api_compat();
    let mut response = opened?;

    // Following is bounded by --timeout; cancellation is soft, the
    // chunk in flight is written before the stream is dropped.
    let deadline = sleep(Duration::from_secs(timeout));
    tokio::pin!(deadline);
    loop {
        let chunk = tokio::select! {
            chunk = response.chunk() => chunk,
            () = &mut deadline, if follow => break,
        };
        match chunk {
            Ok(Some(bytes)) => {
                out.write_all(&bytes)?;
                out.flush()?;
            }
            Ok(None) => break,
            Err(e) => return Err(CliError::Command(format!("log stream failed: {e}"))),
        }
    }
    Ok(())
}

async fn run_cmd<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
    timeout: u64,
    expires: u64,
    mounts: &[String],
    command: &[String],
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    let mounts = parsers::parse_key_values(mounts)?;
    let command = command.join(" ");

    writeln!(out, "Running '{command}' in {app}...")?;
    out.flush()?;
    let ran = commands::with_spinner(apps::run(
        &mut session.client,
        &app,
        &command,
        timeout,
        expires,
        &mounts,
    ))
    .await;
    session.check_api_compat();
    let result = ran?;
    write!(out, "{}", result.output)?;
    if result.exit_code != 0 {
        return Err(CliError::Command(format!(
            "'{command}' exited with code {}",
            result.exit_code
        )));
    }
    Ok(())
}

async fn destroy<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    app_flag: Option<&String>,
    confirm: Option<&String>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    commands::confirm_destroy("app", &app, confirm)?;

    writeln!(out, "Destroying {app}...")?;
    out.flush()?;
    let started = Instant::now();
    let destroyed = commands::with_spinner(apps::destroy(&mut session.client, &app)).await;
    session.check_api_compat();
    destroyed?;
    writeln!(out, "done in {}s", started.elapsed().as_secs())?;

    // Stale builder remotes are best-effort cleanup.
    let _ = git::delete_app_remotes(&session.client.hostname(), &app);
    Ok(())
}

async fn transfer<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    username: &str,
    app_flag: Option<&String>,
) -> Result<(), CliError> {
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(app_flag)?;
    write!(out, "Transferring {app} to {username}... ")?;
    out.flush()?;
    let transferred =
        commands::with_spinner(apps::transfer(&mut session.client, &app, username)).await;
    session.check_api_compat();
    transferred?;
    writeln!(out, "done")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cmd {
        let mut full = vec!["loft"];
        full.extend_from_slice(argv);
        AppsCli::try_parse_from(full).expect("parse").cmd
    }

    #[test]
    fn destroy_parses_confirm_flag() {
        let Cmd::Destroy { app, confirm } =
            parse(&["apps:destroy", "--app=lorem-ipsum", "--confirm=bad-confirm"])
        else {
            panic!("wrong verb");
        };
        assert_eq!(app.as_deref(), Some("lorem-ipsum"));
        assert_eq!(confirm.as_deref(), Some("bad-confirm"));
    }

    #[test]
    fn logs_defaults() {
        let Cmd::Logs { lines, follow, timeout, .. } = parse(&["apps:logs"]) else {
            panic!("wrong verb");
        };
        assert_eq!(lines, 100);
        assert!(!follow);
        assert_eq!(timeout, 300);
    }

    #[test]
    fn run_collects_trailing_command() {
        let Cmd::Run { command, mounts, .. } =
            parse(&["apps:run", "--mount", "data=/data", "ls", "-la", "/data"])
        else {
            panic!("wrong verb");
        };
        assert_eq!(command, vec!["ls", "-la", "/data"]);
        assert_eq!(mounts, vec!["data=/data"]);
    }

    #[test]
    fn create_remote_defaults_to_loft() {
        let Cmd::Create { remote, no_remote, .. } = parse(&["apps:create", "scenic"]) else {
            panic!("wrong verb");
        };
        assert_eq!(remote, "loft");
        assert!(!no_remote);
    }
}
