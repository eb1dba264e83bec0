use crate::{
    cli::actions::{server::Args, Action},
    idrelay::CookieConfig,
    provider::ProviderConfig,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let provider_url = matches
        .get_one::<String>("provider-url")
        .cloned()
        .context("missing required argument: --provider-url")?;

    let provider_timeout = matches
        .get_one::<u64>("provider-timeout")
        .copied()
        .unwrap_or(10);

    let api_key = matches
        .get_one::<String>("api-key")
        .cloned()
        .context("missing required argument: --api-key")?;

    let optional = |name: &str| matches.get_one::<String>(name).cloned();

    let provider = ProviderConfig {
        api_key: SecretString::from(api_key),
        auth_domain: optional("auth-domain"),
        database_url: optional("database-url"),
        project_id: optional("project-id"),
        storage_bucket: optional("storage-bucket"),
        messaging_sender_id: optional("messaging-sender-id"),
        app_id: optional("app-id"),
        measurement_id: optional("measurement-id"),
    };

    let cookies = CookieConfig {
        secure: matches.get_flag("cookie-secure"),
    };

    Ok(Action::Server(Args {
        port,
        provider_url,
        provider_timeout,
        provider,
        cookies,
    }))
}
