//! `limits` command group: per-ptype resource plans and the catalogue
//! of available specs and plans.

use std::io::Write;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};

use loft_api::{config, limits};

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::parsers;
use crate::table::{KvBlock, Table};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct LimitsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the limit plan of each process type.
    #[command(name = "limits:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Assign limit plans as ptype=plan pairs.
    #[command(name = "limits:set")]
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Reset process types to the default plan.
    #[command(name = "limits:unset")]
    Unset {
        #[arg(required = true)]
        ptypes: Vec<String>,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// List hardware specs offered by the cluster.
    #[command(name = "limits:specs")]
    Specs,
    /// List limit plans, optionally filtered.
    #[command(name = "limits:plans")]
    Plans {
        /// Only plans for this spec.
        #[arg(long)]
        spec: Option<String>,
        /// Only plans with this many CPU cores.
        #[arg(long)]
        cpu: Option<u32>,
        /// Only plans with this much memory, in gigabytes.
        #[arg(long)]
        memory: Option<u32>,
    },
}

/// Dispatch a `limits` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<LimitsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(config::get(&mut session.client, &app)).await;
            session.check_api_compat();
            let config = fetched?;
            writeln!(out, "=== {app} Limits")?;
            KvBlock::from_map(&config.limits).render(out)?;
        }
        Cmd::Set { pairs, app } => {
            let app = session.app(app.as_ref())?;
            let mut limits = Map::new();
            for token in &pairs {
                let (ptype, plan) = parsers::parse_limit(token)?;
                limits.insert(ptype, Value::String(plan));
            }
            write!(out, "Applying limits... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "limits": limits }),
            ))
            .await;
            session.check_api_compat();
            let config = applied?;
            writeln!(out, "done\n")?;
            writeln!(out, "=== {app} Limits")?;
            KvBlock::from_map(&config.limits).render(out)?;
        }
        Cmd::Unset { ptypes, app } => {
            let app = session.app(app.as_ref())?;
            let mut limits = Map::new();
            for ptype in ptypes {
                limits.insert(ptype, Value::Null);
            }
            write!(out, "Applying limits... ")?;
            out.flush()?;
            let applied = commands::with_spinner(config::set(
                &mut session.client,
                &app,
                json!({ "limits": limits }),
            ))
            .await;
            session.check_api_compat();
            let config = applied?;
            writeln!(out, "done\n")?;
            writeln!(out, "=== {app} Limits")?;
            KvBlock::from_map(&config.limits).render(out)?;
        }
        Cmd::Specs => {
            let fetched = commands::with_spinner(limits::specs(&mut session.client)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== Specs{}", page.page_note())?;
            let mut table = Table::new(&["ID", "CPU", "MEMORY", "FEATURES"]);
            for spec in &page.results {
                table.add_row([
                    spec.id.clone(),
                    spec.cpu.to_string(),
                    spec.memory.to_string(),
                    spec.features.to_string(),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Plans { spec, cpu, memory } => {
            let fetched = commands::with_spinner(limits::plans(
                &mut session.client,
                spec.as_deref(),
                cpu,
                memory,
            ))
            .await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== Plans{}", page.page_note())?;
            let mut table = Table::new(&["ID", "SPEC", "CPU", "MEMORY"]);
            for plan in &page.results {
                table.add_row([
                    plan.id.clone(),
                    plan.spec.as_ref().map(|s| s.id.clone()).unwrap_or_default(),
                    plan.cpu.to_string(),
                    format!("{}G", plan.memory),
                ]);
            }
            table.render(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_accepts_plan_tokens() {
        let cli = LimitsCli::try_parse_from([
            "loft",
            "limits:set",
            "web=std1.large.c1m1",
            "--app=shop",
        ])
        .expect("parse");
        let Cmd::Set { pairs, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(pairs, vec!["web=std1.large.c1m1"]);
    }

    #[test]
    fn plans_filters_are_optional() {
        let cli = LimitsCli::try_parse_from(["loft", "limits:plans", "--cpu=2"]).expect("parse");
        let Cmd::Plans { spec, cpu, memory } = cli.cmd else {
            panic!("wrong verb");
        };
        assert!(spec.is_none());
        assert_eq!(cpu, Some(2));
        assert!(memory.is_none());
    }
}
