use crate::cli::{
    actions::Action,
    globals::{default_state_file, GlobalArgs},
};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let api_url = matches
        .get_one::<String>("api-url")
        .map(|s| s.to_string())
        .context("missing required argument: --api-url")?;

    let state_file = matches
        .get_one::<String>("state-file")
        .map_or_else(default_state_file, PathBuf::from);

    let globals = GlobalArgs::new(api_url, state_file);

    // Closure to return subcommand matches
    let sub_m = |subcommand| -> Result<&clap::ArgMatches> {
        matches
            .subcommand_matches(subcommand)
            .context("arguments not found")
    };

    let action = match matches.subcommand_name() {
        Some("login") => {
            let m = sub_m("login")?;
            Action::Login {
                email: string_arg(m, "email")?,
                password: string_arg(m, "password")?,
            }
        }
        Some("register") => {
            let m = sub_m("register")?;
            Action::Register {
                name: string_arg(m, "name")?,
                email: string_arg(m, "email")?,
                password: string_arg(m, "password")?,
            }
        }
        Some("verify") => {
            let m = sub_m("verify")?;
            Action::Verify {
                code: string_arg(m, "code")?,
            }
        }
        Some("2fa") => {
            let m = sub_m("2fa")?;
            match m.subcommand_name() {
                Some("setup") => Action::TwoFactorSetup,
                Some("enable") => Action::TwoFactorEnable {
                    code: string_arg(
                        m.subcommand_matches("enable").context("arguments not found")?,
                        "code",
                    )?,
                },
                Some("disable") => Action::TwoFactorDisable {
                    code: string_arg(
                        m.subcommand_matches("disable")
                            .context("arguments not found")?,
                        "code",
                    )?,
                },
                _ => return Err(anyhow::anyhow!("missing 2fa subcommand")),
            }
        }
        Some("logout") => Action::Logout,
        Some("status") => Action::Status,
        _ => return Err(anyhow::anyhow!("missing subcommand")),
    };

    Ok((action, globals))
}

fn string_arg(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .map(|s| s.to_string())
        .with_context(|| format!("missing required argument: --{name}"))
}
