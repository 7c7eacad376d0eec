//! `resources` command group: broker-provisioned services bound to
//! applications.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::resources;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::{KvBlock, Table};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct ResourcesCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List services offered by the broker.
    #[command(name = "resources:services")]
    Services,
    /// List plans of a broker service.
    #[command(name = "resources:plans")]
    Plans { service: String },
    /// Provision a resource.
    #[command(name = "resources:create")]
    Create {
        /// Plan as service:plan.
        plan: String,
        name: String,
        /// Provisioning options as key=value pairs.
        options: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// List resources of an application.
    #[command(name = "resources:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Print details about a resource.
    #[command(name = "resources:describe")]
    Describe {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Change a resource's plan or options.
    #[command(name = "resources:update")]
    Update {
        plan: String,
        name: String,
        options: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Deprovision a resource.
    #[command(name = "resources:destroy")]
    Destroy {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
        /// Skip the interactive prompt by passing the resource name.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Bind a resource to its application.
    #[command(name = "resources:bind")]
    Bind {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Unbind a resource from its application.
    #[command(name = "resources:unbind")]
    Unbind {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `resources` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<ResourcesCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::Services => {
            let fetched = commands::with_spinner(resources::services(&mut session.client)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== Broker Services{}", page.page_note())?;
            let mut table = Table::new(&["ID", "NAME", "UPDATEABLE"]);
            for service in &page.results {
                table.add_row([
                    service.id.clone(),
                    service.name.clone(),
                    service.updateable.to_string(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Plans { service } => {
            let fetched =
                commands::with_spinner(resources::plans(&mut session.client, &service)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {service} Plans{}", page.page_note())?;
            let mut table = Table::new(&["ID", "NAME", "DESCRIPTION"]);
            for plan in &page.results {
                table.add_row([plan.id.clone(), plan.name.clone(), plan.description.clone()]);
            }
            table.render(out)?;
        }
        Cmd::Create { plan, name, options, app } => {
            let app = session.app(app.as_ref())?;
            let options = parsers::parse_key_values(&options)?;
            write!(out, "Creating {name} for {app}... ")?;
            out.flush()?;
            let created = commands::with_spinner(resources::create(
                &mut session.client,
                &app,
                &name,
                &plan,
                &options,
            ))
            .await;
            session.check_api_compat();
            created?;
            writeln!(out, "done")?;
        }
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(resources::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Resources{}", page.page_note())?;
            let mut table = Table::new(&["NAME", "PLAN", "STATUS", "BINDING"]);
            for resource in &page.results {
                table.add_row([
                    resource.name.clone(),
                    resource.plan.clone(),
                    resource.status.clone(),
                    resource.binding.clone(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Describe { name, app } => {
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(resources::get(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            let resource = fetched?;
            writeln!(out, "=== {app} Resource {name}")?;
            let mut block = KvBlock::new();
            block.push("plan", resource.plan);
            block.push("status", resource.status);
            block.push("binding", resource.binding);
            block.push("owner", resource.owner);
            for (key, value) in &resource.data {
                block.push(format!("data.{key}"), value.to_string());
            }
            for (key, value) in &resource.options {
                block.push(format!("options.{key}"), value.to_string());
            }
            block.push("created", resource.created);
            block.push("updated", resource.updated);
            block.render(out)?;
        }
        Cmd::Update { plan, name, options, app } => {
            let app = session.app(app.as_ref())?;
            let options = parsers::parse_key_values(&options)?;
            write!(out, "Updating {name}... ")?;
            out.flush()?;
            let updated = commands::with_spinner(resources::update(
                &mut session.client,
                &app,
                &name,
                &plan,
                &options,
            ))
            .await;
            session.check_api_compat();
            updated?;
            writeln!(out, "done")?;
        }
        Cmd::Destroy { name, app, confirm } => {
            let app = session.app(app.as_ref())?;
            commands::confirm_destroy("resource", &name, confirm.as_ref())?;
            write!(out, "Deleting {name} from {app}... ")?;
            out.flush()?;
            let destroyed =
                commands::with_spinner(resources::destroy(&mut session.client, &app, &name))
                    .await;
            session.check_api_compat();
            destroyed?;
            writeln!(out, "done")?;
        }
        Cmd::Bind { name, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Binding {name} to {app}... ")?;
            out.flush()?;
            let bound =
                commands::with_spinner(resources::bind(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            bound?;
            writeln!(out, "done")?;
        }
        Cmd::Unbind { name, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Unbinding {name} from {app}... ")?;
            out.flush()?;
            let unbound =
                commands::with_spinner(resources::unbind(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            unbound?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_takes_plan_then_name_then_options() {
        let cli = ResourcesCli::try_parse_from([
            "loft",
            "resources:create",
            "postgres:standard",
            "maindb",
            "size=20G",
            "--app=shop",
        ])
        .expect("parse");
        let Cmd::Create { plan, name, options, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(plan, "postgres:standard");
        assert_eq!(name, "maindb");
        assert_eq!(options, vec!["size=20G"]);
    }
}
