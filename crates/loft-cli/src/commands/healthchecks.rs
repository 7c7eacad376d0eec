//! `healthchecks` command group: startup, liveness and readiness probes
//! per process type.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use loft_api::config::{self, ExecProbe, HttpGetProbe, Probe, TcpSocketProbe};
use loft_api::types::KvPair;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;

const KINDS: &[&str] = &["startup", "liveness", "readiness"];

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct HealthchecksCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List configured probes.
    #[command(name = "healthchecks:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long)]
        ptype: Option<String>,
    },
    /// Configure a probe.
    ///
    /// httpGet and tcpSocket take a port argument; exec takes the
    /// command to run.
    #[command(name = "healthchecks:set")]
    Set {
        /// Probe kind: startup, liveness or readiness.
        kind: String,
        /// Probe type: httpGet, exec or tcpSocket.
        probe_type: String,
        /// Port (httpGet, tcpSocket) or command (exec).
        #[arg(required = true)]
        args: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long, default_value = "web")]
        ptype: String,
        /// Request path for httpGet probes.
        #[arg(long, default_value = "/")]
        path: String,
        /// Extra httpGet headers as `Name: value`.
        #[arg(long = "header")]
        headers: Vec<String>,
        #[arg(long, default_value_t = 50)]
        initial_delay: u32,
        #[arg(long, default_value_t = 10)]
        period: u32,
        #[arg(long, default_value_t = 50)]
        timeout: u32,
        #[arg(long, default_value_t = 1)]
        success_threshold: u32,
        #[arg(long, default_value_t = 3)]
        failure_threshold: u32,
    },
    /// Remove a probe.
    #[command(name = "healthchecks:unset")]
    Unset {
        /// Probe kind: startup, liveness or readiness.
        kind: String,
        #[arg(short, long)]
        app: Option<String>,
        #[arg(long, default_value = "web")]
        ptype: String,
    },
}

/// Dispatch a `healthchecks` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<HealthchecksCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app, ptype } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
            session.check_api_compat();
            let config = fetched?;
            writeln!(out, "=== {app} Healthchecks")?;
            for (name, checks) in &config.healthcheck {
                if ptype.as_deref().is_some_and(|wanted| wanted != name) {
                    continue;
                }
                writeln!(out, "\n{name}:")?;
                let rendered = serde_yaml::to_string(checks)
                    .map_err(|e| CliError::Command(format!("could not render probes: {e}")))?;
                write!(out, "{rendered}")?;
            }
        }
        Cmd::Set {
            kind,
            probe_type,
            args,
            app,
            ptype,
            path,
            headers,
            initial_delay,
            period,
            timeout,
            success_threshold,
            failure_threshold,
        } => {
            let app = session.app(app.as_ref())?;
            check_kind(&kind)?;
            let mut probe = Probe {
                initial_delay_seconds: initial_delay,
                period_seconds: period,
                timeout_seconds: timeout,
                success_threshold,
                failure_threshold,
                ..Probe::default()
            };
            fill_probe(&mut probe, &probe_type, &args, &path, &headers)?;

            write!(out, "Applying {kind} healthcheck... ")?;
            out.flush()?;
            let body = json!({ "healthcheck": { &ptype: { kind: probe } } });
            let applied =
                commands::with_spinner(config::set(&mut session.client, &app, body)).await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
        Cmd::Unset { kind, app, ptype } => {
            let app = session.app(app.as_ref())?;
            check_kind(&kind)?;
            write!(out, "Removing {kind} healthcheck... ")?;
            out.flush()?;
            let body = json!({ "healthcheck": { &ptype: { kind: Value::Null } } });
            let removed =
                commands::with_spinner(config::set(&mut session.client, &app, body)).await;
            session.check_api_compat();
            removed?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

fn check_kind(kind: &str) -> Result<(), CliError> {
    if KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "{kind} is not a probe kind; use startup, liveness or readiness"
        )))
    }
}

fn fill_probe(
    probe: &mut Probe,
    probe_type: &str,
    args: &[String],
    path: &str,
    headers: &[String],
) -> Result<(), CliError> {
    match probe_type {
        "httpGet" => {
            let port = parse_port(args)?;
            let http_headers = parsers::parse_headers(headers)?
                .into_iter()
                .map(|(name, value)| KvPair { name, value })
                .collect();
            probe.http_get = Some(HttpGetProbe {
                path: path.to_string(),
                port,
                http_headers,
            });
        }
        "exec" => {
            probe.exec = Some(ExecProbe { command: args.to_vec() });
        }
        "tcpSocket" => {
            let port = parse_port(args)?;
            probe.tcp_socket = Some(TcpSocketProbe { port });
        }
        other => {
            return Err(CliError::Validation(format!(
                "{other} is not a probe type; use httpGet, exec or tcpSocket"
            )));
        }
    }
    Ok(())
}

fn parse_port(args: &[String]) -> Result<u16, CliError> {
    let [port] = args else {
        return Err(CliError::Validation(
            "httpGet and tcpSocket probes take exactly one port argument".into(),
        ));
    };
    port.parse()
        .map_err(|_| CliError::Validation(format!("{port} is not a valid port")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_get_probe_takes_port_path_and_headers() {
        let mut probe = Probe::default();
        fill_probe(
            &mut probe,
            "httpGet",
            &["8080".into()],
            "/healthz",
            &["X-Forwarded-Proto: https".into()],
        )
        .expect("fill");
        let http = probe.http_get.expect("httpGet");
        assert_eq!(http.port, 8080);
        assert_eq!(http.path, "/healthz");
        assert_eq!(http.http_headers[0].name, "X-Forwarded-Proto");
    }

    #[test]
    fn exec_probe_keeps_the_command() {
        let mut probe = Probe::default();
        fill_probe(&mut probe, "exec", &["cat".into(), "/tmp/ok".into()], "/", &[])
            .expect("fill");
        assert_eq!(probe.exec.expect("exec").command, vec!["cat", "/tmp/ok"]);
    }

    #[test]
    fn unknown_kinds_and_types_are_rejected() {
        assert!(check_kind("liveness").is_ok());
        let err = check_kind("vitality").expect_err("err");
        assert!(err.to_string().contains("vitality"));
        let mut probe = Probe::default();
        assert!(fill_probe(&mut probe, "udpSocket", &["1".into()], "/", &[]).is_err());
    }
}
