//! The `loft` binary: normalise argv, route to a command group, print
//! errors and map them to the exit code.

use std::io::Write;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use loft_cli::commands::{self, settings};
use loft_cli::dispatch;
use loft_cli::error::CliError;
use loft_cli::parser::{self, Invocation};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parser::normalize(&argv);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(route(&invocation)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_usage() => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn route(invocation: &Invocation) -> Result<(), CliError> {
    let mut out = std::io::stdout();
    match invocation.group.as_str() {
        "help" => {
            print!("{}", parser::usage());
            out.flush()?;
            Ok(())
        }
        "version" => commands::misc::version(invocation, &mut out).await,
        "shortcuts" => commands::misc::shortcuts(invocation, &mut out),
        "update" => commands::misc::self_update(invocation, &mut out).await,
        "apps" => commands::apps::run(invocation, &mut out).await,
        "auth" => commands::auth::run(invocation, &mut out).await,
        "autodeploy" => settings::run(invocation, &mut out, &settings::AUTODEPLOY).await,
        "autorollback" => settings::run(invocation, &mut out, &settings::AUTOROLLBACK).await,
        "autoscale" => commands::autoscale::run(invocation, &mut out).await,
        "builds" => commands::builds::run(invocation, &mut out).await,
        "canary" => commands::canary::run(invocation, &mut out).await,
        "certs" => commands::certs::run(invocation, &mut out).await,
        "config" => commands::config::run(invocation, &mut out).await,
        "domains" => commands::domains::run(invocation, &mut out).await,
        "gateways" => commands::gateways::run(invocation, &mut out).await,
        "healthchecks" => commands::healthchecks::run(invocation, &mut out).await,
        "keys" => commands::keys::run(invocation, &mut out).await,
        "labels" => commands::labels::run(invocation, &mut out).await,
        "limits" => commands::limits::run(invocation, &mut out).await,
        "maintenance" => settings::run(invocation, &mut out, &settings::MAINTENANCE).await,
        "perms" => commands::perms::run(invocation, &mut out).await,
        "ps" => commands::ps::run(invocation, &mut out).await,
        "pts" => commands::pts::run(invocation, &mut out).await,
        "registry" => commands::registry::run(invocation, &mut out).await,
        "releases" => commands::releases::run(invocation, &mut out).await,
        "resources" => commands::resources::run(invocation, &mut out).await,
        "routes" => commands::routes::run(invocation, &mut out).await,
        "routing" => settings::run(invocation, &mut out, &settings::ROUTING).await,
        "services" => commands::services::run(invocation, &mut out).await,
        "tags" => commands::tags::run(invocation, &mut out).await,
        "timeouts" => commands::timeouts::run(invocation, &mut out).await,
        "tls" => commands::tls::run(invocation, &mut out).await,
        "tokens" => commands::tokens::run(invocation, &mut out).await,
        "users" => commands::users::run(invocation, &mut out).await,
        "volumes" => commands::volumes::run(invocation, &mut out).await,
        other => external(other, invocation),
    }
}

/// Unknown groups fall through to `loft-<command>` binaries on PATH.
fn external(command: &str, invocation: &Invocation) -> Result<(), CliError> {
    match dispatch::find_external(command) {
        Some(binary) => {
            let args: Vec<String> = invocation.argv.iter().skip(1).cloned().collect();
            dispatch::run_external(&binary, &args)
        }
        None => Err(CliError::Usage(format!(
            "unknown command: {command}\n\n{}",
            parser::usage()
        ))),
    }
}
