//! Boolean app-settings groups: `maintenance`, `routing`, `autodeploy`
//! and `autorollback` share one runner parameterised by the settings
//! field they toggle.

use std::io::Write;

use clap::Parser;
use serde_json::json;

use loft_api::appsettings::{self, AppSettings};

use crate::commands::{self, Session};
use crate::error::CliError;
use crate::parser::Invocation;

/// One toggleable settings field.
pub struct Toggle {
    /// Command group name.
    pub group: &'static str,
    /// Field on the settings document.
    pub field: &'static str,
    /// Verb that turns the setting on.
    pub on: &'static str,
    /// Verb that turns it off.
    pub off: &'static str,
    /// Word used in human-readable output.
    pub label: &'static str,
    /// How the states read in `info` output.
    pub states: (&'static str, &'static str),
}

/// The `maintenance` group.
pub const MAINTENANCE: Toggle = Toggle {
    group: "maintenance",
    field: "maintenance",
    on: "on",
    off: "off",
    label: "Maintenance Mode",
    states: ("on", "off"),
};

/// The `routing` group.
pub const ROUTING: Toggle = Toggle {
    group: "routing",
    field: "routable",
    on: "enable",
    off: "disable",
    label: "Routing",
    states: ("enabled", "disabled"),
};

/// The `autodeploy` group.
pub const AUTODEPLOY: Toggle = Toggle {
    group: "autodeploy",
    field: "autodeploy",
    on: "enable",
    off: "disable",
    label: "Autodeploy",
    states: ("enabled", "disabled"),
};

/// The `autorollback` group.
pub const AUTOROLLBACK: Toggle = Toggle {
    group: "autorollback",
    field: "autorollback",
    on: "enable",
    off: "disable",
    label: "Autorollback",
    states: ("enabled", "disabled"),
};

#[derive(Parser)]
#[command(name = "loft", bin_name = "loft")]
struct ToggleCli {
    /// The group:verb token.
    verb: String,
    #[arg(short, long)]
    app: Option<String>,
}

/// Dispatch an invocation of one of the toggle groups.
pub async fn run<W: Write>(
    invocation: &Invocation,
    out: &mut W,
    toggle: &Toggle,
) -> Result<(), CliError> {
    let Some(cli) = commands::parse_group::<ToggleCli>(invocation)? else {
        return Ok(());
    };
    let mut session = Session::load(invocation.config.as_deref())?;
    let app = session.app(cli.app.as_ref())?;

    let verb = cli
        .verb
        .split_once(':')
        .map_or("info", |(_, verb)| verb);
    if verb == "info" {
        let fetched = commands::with_spinner(appsettings::get(&mut session.client, &app)).await;
        session.check_api_compat();
        let settings = fetched?;
        writeln!(out, "=== {app} {}", toggle.label)?;
        writeln!(out, "{}", state(&settings, toggle))?;
        return Ok(());
    }

    let enable = if verb == toggle.on {
        true
    } else if verb == toggle.off {
        false
    } else {
        return Err(CliError::Usage(format!(
            "{verb} is not a {} verb; use info, {} or {}",
            toggle.group, toggle.on, toggle.off
        )));
    };

    let action = if enable { "Enabling" } else { "Disabling" };
    write!(out, "{action} {} for {app}... ", toggle.label.to_lowercase())?;
    out.flush()?;
    let applied = commands::with_spinner(appsettings::set(
        &mut session.client,
        &app,
        json!({ toggle.field: enable }),
    ))
    .await;
    session.check_api_compat();
    applied?;
    writeln!(out, "done")?;
    Ok(())
}

fn state(settings: &AppSettings, toggle: &Toggle) -> &'static str {
    let value = match toggle.field {
        "maintenance" => settings.maintenance,
        "routable" => settings.routable,
        "autodeploy" => settings.autodeploy,
        "autorollback" => settings.autorollback,
        _ => None,
    };
    match value {
        Some(true) => toggle.states.0,
        Some(false) => toggle.states.1,
        None => "not set",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintenance_states_read_on_off() {
        let mut settings = AppSettings::default();
        assert_eq!(state(&settings, &MAINTENANCE), "not set");
        settings.maintenance = Some(true);
        assert_eq!(state(&settings, &MAINTENANCE), "on");
        settings.maintenance = Some(false);
        assert_eq!(state(&settings, &MAINTENANCE), "off");
    }

    #[test]
    fn routing_states_read_enabled_disabled() {
        let settings = AppSettings { routable: Some(true), ..AppSettings::default() };
        assert_eq!(state(&settings, &ROUTING), "enabled");
    }
}
