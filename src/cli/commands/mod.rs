use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn code_arg() -> Arg {
    Arg::new("code")
        .short('c')
        .long("code")
        .help("Six-digit authenticator code")
        .required(true)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("graphflix")
        .about("GraphFlix movie platform client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .short('u')
                .long("api-url")
                .help("Base URL of the GraphFlix API gateway")
                .default_value("http://localhost:8080")
                .env("GRAPHFLIX_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("state-file")
                .short('s')
                .long("state-file")
                .help("Where to persist session state (default: platform data dir)")
                .env("GRAPHFLIX_STATE_FILE")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("GRAPHFLIX_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Log in with email and password")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .env("GRAPHFLIX_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("GRAPHFLIX_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create a new account")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name")
                        .required(true),
                )
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .env("GRAPHFLIX_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("GRAPHFLIX_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Complete a pending two-factor login")
                .arg(code_arg()),
        )
        .subcommand(
            Command::new("2fa")
                .about("Manage two-factor authentication for the account")
                .subcommand_required(true)
                .subcommand(
                    Command::new("setup")
                        .about("Generate an authenticator enrollment URL and secret"),
                )
                .subcommand(
                    Command::new("enable")
                        .about("Confirm enrollment and turn 2FA on")
                        .arg(code_arg()),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Turn 2FA off")
                        .arg(code_arg()),
                ),
        )
        .subcommand(Command::new("logout").about("Log out and clear stored credentials"))
        .subcommand(Command::new("status").about("Show the current session phase"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "graphflix");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "GraphFlix movie platform client"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_login_args() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "graphflix",
            "login",
            "--email",
            "ada@example.com",
            "--password",
            "hunter2hunter2",
            "--api-url",
            "https://api.graphflix.dev",
        ]);

        assert_eq!(
            matches.get_one::<String>("api-url").map(|s| s.to_string()),
            Some("https://api.graphflix.dev".to_string())
        );

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "login");
        assert_eq!(
            sub.get_one::<String>("email").map(|s| s.to_string()),
            Some("ada@example.com".to_string())
        );
        assert_eq!(
            sub.get_one::<String>("password").map(|s| s.to_string()),
            Some("hunter2hunter2".to_string())
        );
    }

    #[test]
    fn test_api_url_default() {
        let command = new();
        let matches = command.get_matches_from(vec!["graphflix", "status"]);

        assert_eq!(
            matches.get_one::<String>("api-url").map(|s| s.to_string()),
            Some("http://localhost:8080".to_string())
        );
        assert!(matches.get_one::<String>("state-file").is_none());
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("GRAPHFLIX_API_URL", Some("https://api.graphflix.dev")),
                ("GRAPHFLIX_STATE_FILE", Some("/tmp/graphflix.json")),
                ("GRAPHFLIX_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["graphflix", "status"]);

                assert_eq!(
                    matches.get_one::<String>("api-url").map(|s| s.to_string()),
                    Some("https://api.graphflix.dev".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<String>("state-file")
                        .map(|s| s.to_string()),
                    Some("/tmp/graphflix.json".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("GRAPHFLIX_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["graphflix", "status"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_two_factor_subcommands() {
        let command = new();
        let matches =
            command.get_matches_from(vec!["graphflix", "2fa", "enable", "--code", "123456"]);

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "2fa");
        let (name, sub) = sub.subcommand().unwrap();
        assert_eq!(name, "enable");
        assert_eq!(
            sub.get_one::<String>("code").map(|s| s.to_string()),
            Some("123456".to_string())
        );
    }
}
