//! `certs` command group: TLS certificates and their domain bindings.

use std::io::Write;

use clap::{Parser, Subcommand};

use loft_api::certs;

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;
use crate::table::{KvBlock, NONE, Table};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft", disable_help_subcommand = true)]
struct CertsCli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List certificates.
    #[command(name = "certs:list")]
    List {
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Upload a certificate and its private key.
    #[command(name = "certs:add")]
    Add {
        /// Name for the certificate.
        name: String,
        /// Path to the PEM certificate.
        cert: String,
        /// Path to the PEM private key.
        key: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Remove a certificate.
    #[command(name = "certs:remove")]
    Remove {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Print details about a certificate.
    #[command(name = "certs:info")]
    Info {
        name: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Bind a certificate to a domain.
    #[command(name = "certs:attach")]
    Attach {
        name: String,
        domain: String,
        #[arg(short, long)]
        app: Option<String>,
    },
    /// Unbind a certificate from a domain.
    #[command(name = "certs:detach")]
    Detach {
        name: String,
        domain: String,
        #[arg(short, long)]
        app: Option<String>,
    },
}

/// Dispatch a `certs` group invocation.
pub async fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<CertsCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    match cli.cmd {
        Cmd::List { app } => {
            let app = session.app(app.as_ref())?;
            let fetched = commands::with_spinner(certs::list(&mut session.client, &app)).await;
            session.check_api_compat();
            let page = fetched?;
            writeln!(out, "=== {app} Certs{}", page.page_note())?;
            let mut table = Table::new(&["NAME", "COMMON-NAME", "EXPIRES", "DOMAINS"]);
            for cert in &page.results {
                table.add_row([
                    cert.name.clone(),
                    cert.common_name.clone(),
                    cert.expires.clone(),
                    cert.domains.join(","),
                ]);
            }
            table.render(out)?;
        }
        Cmd::Add { name, cert, key, app } => {
            let app = session.app(app.as_ref())?;
            let certificate = std::fs::read_to_string(&cert)
                .map_err(|e| CliError::Validation(format!("could not read {cert}: {e}")))?;
            let key = std::fs::read_to_string(&key)
                .map_err(|e| CliError::Validation(format!("could not read {key}: {e}")))?;
            write!(out, "Adding SSL endpoint... ")?;
            out.flush()?;
            let added = commands::with_spinner(certs::add(
                &mut session.client,
                &app,
                &name,
                &certificate,
                &key,
            ))
            .await;
            session.check_api_compat();
            added?;
            writeln!(out, "done")?;
        }
        Cmd::Remove { name, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Removing {name}... ")?;
            out.flush()?;
            let removed =
                commands::with_spinner(certs::remove(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            removed?;
            writeln!(out, "done")?;
        }
        Cmd::Info { name, app } => {
            let app = session.app(app.as_ref())?;
            let fetched =
                commands::with_spinner(certs::get(&mut session.client, &app, &name)).await;
            session.check_api_compat();
            let cert = fetched?;
            writeln!(out, "=== {name} Certificate")?;
            let mut block = KvBlock::new();
            block.push("common name", cert.common_name);
            block.push("subject", cert.subject);
            block.push("issuer", cert.issuer);
            block.push("starts", cert.starts);
            block.push("expires", cert.expires);
            block.push("fingerprint", cert.fingerprint);
            block.push(
                "san",
                if cert.san.is_empty() { NONE.to_string() } else { cert.san.join(",") },
            );
            block.push(
                "domains",
                if cert.domains.is_empty() { NONE.to_string() } else { cert.domains.join(",") },
            );
            block.render(out)?;
        }
        Cmd::Attach { name, domain, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Attaching certificate {name} to domain {domain}... ")?;
            out.flush()?;
            let attached = commands::with_spinner(certs::attach(
                &mut session.client,
                &app,
                &name,
                &domain,
            ))
            .await;
            session.check_api_compat();
            attached?;
            writeln!(out, "done")?;
        }
        Cmd::Detach { name, domain, app } => {
            let app = session.app(app.as_ref())?;
            write!(out, "Detaching certificate {name} from domain {domain}... ")?;
            out.flush()?;
            let detached = commands::with_spinner(certs::detach(
                &mut session.client,
                &app,
                &name,
                &domain,
            ))
            .await;
            session.check_api_compat();
            detached?;
            writeln!(out, "done")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_takes_name_then_domain() {
        let cli = CertsCli::try_parse_from([
            "loft",
            "certs:attach",
            "shop-cert",
            "shop.example.com",
            "--app=shop",
        ])
        .expect("parse");
        let Cmd::Attach { name, domain, .. } = cli.cmd else {
            panic!("wrong verb");
        };
        assert_eq!(name, "shop-cert");
        assert_eq!(domain, "shop.example.com");
    }
}
