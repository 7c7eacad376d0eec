//! `routes` command group: Gateway-API routes, including raw rule
//! editing with YAML on the CLI side and JSON on the wire.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::Value;

use loft_api::routes;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::Table;

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct RoutesCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List routes.
    #[command(name = "routes:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Create a route targeting a process type's service port.
    #[command(name = "routes:add")]
    Add {
        name: String,
        /// Route kind, e.g. HTTPRoute or TCPRoute.
        #[arg(long, default_value = "HTTPRoute")]
        kind: String,
        #[arg(long, default_value = "web")]
        ptype: String,
        #[arg(long)]
        port: u16,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Print a route's rules as YAML.
    #[command(name = "routes:get")]
    Get {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Replace a route's rules from a YAML file.
    #[command(name = "routes:set")]
    Set {
        name: String,
        /// Path to the rules file; `-` reads standard input.
        #[arg(long, default_value = "-")]
        rules_file: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Attach a route to a gateway listener.
    #[command(name = "routes:attach")]
    Attach {
        name: String,
        #[arg(long)]
        gateway: String,
        #[arg(long)]
        port: u16,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Detach a route from a gateway listener.
    #[command(name = "routes:detach")]
    Detach {
        name: String,
        #[arg(long)]
        gateway: String,
        #[arg(long)]
        port: u16,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove a route.
    #[command(name = "routes:remove")]
    Remove {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `routes` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<RoutesCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(routes::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Routes{}", page.page_note())?;
            let mut table = Table::new(&["NAME", "KIND", "GATEWAYS"]);
            for route in &page.results {
                let parents = route
                    .parent_refs
                    .iter()
                    .map(|p| format!("{}:{}", p.name, p.port))
                    .collect::<Vec<_>>()
                    .join(",");
                table.add_row([route.name.clone(), route.kind.clone(), parents]);
            }
            table.render(out)?;
        }
        Cmd::Add { name, kind, ptype, port, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Adding route {name} to {app}... ")?;
            out.flush()?;
            let added = commands::with_spinner(routes::add(
                &mut session.client,
                &app,
                &name,
                &kind,
                &ptype,
                port,
            ))
            .await;
            session.check_api_compat();
            added?;
            writeln!(out, "done")?;
        }
        Cmd::Get { name, app } => {
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(routes::get_rules(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            let rules = fetched?;
            write!(out, "{}", rules_to_yaml(&rules)?)?;
        }
        Cmd::Set { name, rules_file, app } => {
            let app = session.app(app.as_ref())?;
            let text = if rules_file == "-" {
                let mut buffer = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin().lock(), &mut buffer)?;
                buffer
            } else {
                std::fs::read_to_string(&rules_file).map_err(|e| {
                    CliError::Validation(format!("could not read {rules_file}: {e}"))
                })?
            };
            let rules = rules_from_yaml(&text)?;
            write!(out, "Applying rules... ")?;
            out.flush()?;
            let applied = commands::with_spinner(routes::set_rules(
                &mut session.client,
                &app,
                &name,
                rules,
            ))
            .await;
            session.check_api_compat();
            applied?;
            writeln!(out, "done")?;
        }
        Cmd::Attach { name, gateway, port, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Attaching route {name} to gateway {gateway}... ")?;
            out.flush()?;
            let attached = commands::with_spinner(routes::attach(
                &mut session.client,
                &app,
                &name,
                &gateway,
                port,
            ))
            .await;
            session.check_api_compat();
            attached?;
            writeln!(out, "done")?;
        }
        Cmd::Detach { name, gateway, port, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Detaching route {name} from gateway {gateway}... ")?;
            out.flush()?;
            let detached = commands::with_spinner(routes::detach(
                &mut session.client,
                &app,
                &name,
                &gateway,
                port,
            ))
            .await;
            session.check_api_compat();
            detached?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { name, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Removing route {name} from {app}... ")?;
            out.flush()?;
            let removed =
                commands::with_spinner(routes::remove(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            removed?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

fn rules_to_yaml(rules: &Value) -> Result<String, CliError> {
    serde_yaml::to_string(rules)
        .map_err(|e| CliError::Command(format!("could not render rules as YAML: {e}")))
}

fn rules_from_yaml(text: &str) -> Result<Value, CliError> {
    serde_yaml::from_str(text)
        .map_err(|e| CliError::Validation(format!("could not parse rules as YAML: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rules_convert_between_yaml_and_json() {
        let yaml = "- backendRefs:\n  - name: web\n    port: 8000\n";
        let value = rules_from_yaml(yaml).expect("parse");
        assert_eq!(value, json!([{"backendRefs": [{"name": "web", "port": 8000}]}]));
        let back = rules_to_yaml(&value).expect("render");
        assert_eq!(rules_from_yaml(&back).expect("reparse"), value);
    }

    #[test]
    fn add_defaults() {
        let cli = RoutesCli::try_parse_from([
            "loft",
            "routes:add",
            "main",
            "--port=8000",
            "--app=shop",
        ])
        .expect("parse");
        let Cmd::Add { kind, ptype, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(kind, "HTTPRoute");
        assert_eq!(ptype, "web");
    }
}
