//! Argument normalisation.
//!
//! Runs before clap: rewrites help/version spellings, moves `help <cmd>`
//! into `<cmd> --help`, expands shortcuts, splits the `group:verb` command
//! token and extracts the global `--config` flag from anywhere in argv.

use crate::shortcuts;

/// A normalised invocation ready for group dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Group portion of the command token (before the first `:`).
    pub group: String,
    /// Normalised argv; `argv[0]` is the command token.
    pub argv: Vec<String>,
    /// Value of `--config`/`-c`, removed from `argv`.
    pub config: Option<String>,
}

/// Normalise raw argv (program name already stripped).
#[must_use]
pub fn normalize(argv: &[String]) -> Invocation {
    let mut argv: Vec<String> = argv.to_vec();

    if argv.is_empty() {
        argv = vec!["help".to_string()];
    }
    if argv.len() == 1 {
        match argv[0].as_str() {
            "--help" | "-h" => argv[0] = "help".to_string(),
            "--version" | "-v" => argv[0] = "version".to_string(),
            _ => {}
        }
    }
    if argv.len() > 1 && matches!(argv[0].as_str(), "help" | "--help" | "-h") {
        argv.remove(0);
        argv.push("--help".to_string());
    }

    argv[0] = shortcuts::expand(&argv[0]).to_string();
    let group = argv[0].split(':').next().unwrap_or_default().to_string();
    let (argv, config) = extract_config(argv);

    Invocation { group, argv, config }
}

/// Pull `--config <v>` / `--config=<v>` / `-c <v>` / `-c=<v>` out of argv.
/// Tokens after a literal `--` separator are left untouched.
fn extract_config(argv: Vec<String>) -> (Vec<String>, Option<String>) {
    let mut out = Vec::with_capacity(argv.len());
    let mut config = None;
    let mut iter = argv.into_iter();
    while let Some(token) = iter.next() {
        if token == "--" {
            out.push(token);
            out.extend(iter);
            break;
        }
        if token == "--config" || token == "-c" {
            config = iter.next();
            continue;
        }
        if let Some(value) = token.strip_prefix("--config=") {
            config = Some(value.to_string());
            continue;
        }
        if let Some(value) = token.strip_prefix("-c=") {
            config = Some(value.to_string());
            continue;
        }
        out.push(token);
    }
    (out, config)
}

/// argv handed to a group's clap parser: the program name followed by the
/// normalised tokens.
#[must_use]
pub fn clap_args(invocation: &Invocation) -> Vec<String> {
    let mut args = Vec::with_capacity(invocation.argv.len() + 1);
    args.push("loft".to_string());
    args.extend(invocation.argv.iter().cloned());
    args
}

/// Top-level usage, printed for `help` and for unroutable commands.
#[must_use]
pub fn usage() -> String {
    let mut text = String::from(
        "Usage: loft <command> [arguments] [flags]\n\
         \n\
         The Loft command-line client, for applications on a Loft controller.\n\
         \n\
         Commands take the form <group>:<verb>, for example `loft apps:list`.\n\
         Run `loft <group> --help` to list a group's verbs.\n\
         \n\
         Groups:\n\
         \x20 apps          manage applications\n\
         \x20 auth          log in, log out, whoami\n\
         \x20 autodeploy    deploy automatically after builds\n\
         \x20 autorollback  roll back automatically on failed deploys\n\
         \x20 autoscale     per-process-type autoscaling\n\
         \x20 builds        list and submit builds\n\
         \x20 canary        canary process types\n\
         \x20 certs         TLS certificates\n\
         \x20 config        environment variables\n\
         \x20 domains       custom domains\n\
         \x20 gateways      inbound gateways\n\
         \x20 healthchecks  health probes\n\
         \x20 keys          SSH keys for git push\n\
         \x20 labels        app labels\n\
         \x20 limits        hardware limit plans\n\
         \x20 maintenance   maintenance mode\n\
         \x20 perms         per-app user permissions\n\
         \x20 ps            running processes\n\
         \x20 pts           process types\n\
         \x20 registry      private registry credentials\n\
         \x20 releases      releases, deploy and rollback\n\
         \x20 resources     backing services\n\
         \x20 routes        routing rules\n\
         \x20 routing       app routability\n\
         \x20 services      extra service ports\n\
         \x20 shortcuts     list command shortcuts\n\
         \x20 tags          scheduling tags\n\
         \x20 timeouts      termination grace periods\n\
         \x20 tls           TLS settings\n\
         \x20 tokens        session tokens\n\
         \x20 update        update this client\n\
         \x20 users         platform users\n\
         \x20 version       client and API version\n\
         \x20 volumes       persistent volumes\n\
         \n\
         Shortcuts:\n",
    );
    for (short, full) in shortcuts::SHORTCUTS {
        text.push_str(&format!("  {short:<10} -> {full}\n"));
    }
    text.push_str(
        "\nGlobal flags:\n\
         \x20 -c, --config <path>  use another profile\n\
         \x20 -h, --help           show help\n\
         \x20 -v, --version        show version\n",
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_argv_becomes_help() {
        let inv = normalize(&[]);
        assert_eq!(inv.group, "help");
    }

    #[test]
    fn lone_help_and_version_flags_rewrite() {
        assert_eq!(normalize(&args(&["--help"])).group, "help");
        assert_eq!(normalize(&args(&["-h"])).group, "help");
        assert_eq!(normalize(&args(&["--version"])).group, "version");
        assert_eq!(normalize(&args(&["-v"])).group, "version");
    }

    #[test]
    fn help_prefix_moves_to_trailing_flag() {
        let inv = normalize(&args(&["help", "apps:list"]));
        assert_eq!(inv.argv, args(&["apps:list", "--help"]));
        assert_eq!(inv.group, "apps");
    }

    #[test]
    fn shortcuts_expand_before_group_split() {
        let inv = normalize(&args(&["scale", "web=3"]));
        assert_eq!(inv.group, "ps");
        assert_eq!(inv.argv[0], "ps:scale");
    }

    #[test]
    fn group_is_token_before_first_colon() {
        assert_eq!(normalize(&args(&["releases:rollback", "v3"])).group, "releases");
        assert_eq!(normalize(&args(&["version"])).group, "version");
    }

    #[test]
    fn config_flag_is_extracted_anywhere() {
        let inv = normalize(&args(&["apps:list", "--config", "work"]));
        assert_eq!(inv.config.as_deref(), Some("work"));
        assert_eq!(inv.argv, args(&["apps:list"]));

        let inv = normalize(&args(&["apps:list", "--config=work.json"]));
        assert_eq!(inv.config.as_deref(), Some("work.json"));

        let inv = normalize(&args(&["-c", "work", "apps:list"]));
        assert_eq!(inv.config.as_deref(), Some("work"));
        assert_eq!(inv.argv, args(&["apps:list"]));
    }

    #[test]
    fn config_after_double_dash_is_untouched() {
        let inv = normalize(&args(&["apps:run", "--", "env", "--config", "x"]));
        assert_eq!(inv.config, None);
        assert_eq!(inv.argv, args(&["apps:run", "--", "env", "--config", "x"]));
    }

    #[test]
    fn clap_args_prepends_program_name() {
        let inv = normalize(&args(&["apps:list"]));
        assert_eq!(clap_args(&inv), args(&["loft", "apps:list"]));
    }

    #[test]
    fn usage_mentions_every_shortcut() {
        let usage = usage();
        for (short, full) in crate::shortcuts::SHORTCUTS {
            assert!(usage.contains(short), "missing {short}");
            assert!(usage.contains(full), "missing {full}");
        }
    }
}
