use crate::provider::DEFAULT_PROVIDER_URL;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_VERBOSITY: &str = "verbosity";

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

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("idrelay")
        .about("Identity provider relay")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("IDRELAY_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("provider-url")
                .long("provider-url")
                .help("Identity provider REST API base URL")
                .default_value(DEFAULT_PROVIDER_URL)
                .env("IDRELAY_PROVIDER_URL"),
        )
        .arg(
            Arg::new("provider-timeout")
                .long("provider-timeout")
                .help("Timeout in seconds for calls to the identity provider")
                .default_value("10")
                .env("IDRELAY_PROVIDER_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("cookie-secure")
                .long("cookie-secure")
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("IDRELAY_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .next_help_heading("Identity provider project")
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .help("Web API key of the identity provider project")
                .env("apiKey")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("auth-domain")
                .long("auth-domain")
                .help("Auth domain of the project")
                .env("authDomain"),
        )
        .arg(
            Arg::new("database-url")
                .long("database-url")
                .help("Realtime database URL of the project")
                .env("databaseURL"),
        )
        .arg(
            Arg::new("project-id")
                .long("project-id")
                .help("Project id")
                .env("projectId"),
        )
        .arg(
            Arg::new("storage-bucket")
                .long("storage-bucket")
                .help("Storage bucket of the project")
                .env("storageBucket"),
        )
        .arg(
            Arg::new("messaging-sender-id")
                .long("messaging-sender-id")
                .help("Messaging sender id")
                .env("messagingSenderId"),
        )
        .arg(
            Arg::new("app-id")
                .long("app-id")
                .help("App id")
                .env("appId"),
        )
        .arg(
            Arg::new("measurement-id")
                .long("measurement-id")
                .help("Measurement id")
                .env("measurementId"),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("IDRELAY_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
