use crate::{
    idrelay::{self, CookieConfig},
    provider::{IdentityProvider, ProviderConfig},
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub provider_url: String,
    pub provider_timeout: u64,
    pub provider: ProviderConfig,
    pub cookies: CookieConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let provider = IdentityProvider::new(
        &args.provider_url,
        args.provider,
        Duration::from_secs(args.provider_timeout),
    )
    .context("Could not build the identity provider client")?;

    let entries = startup_entries(args.port, args.provider_timeout, args.cookies, &provider);
    info!("{}", format_entries("Startup configuration", &entries));

    idrelay::new(args.port, provider, args.cookies).await
}

fn startup_entries(
    port: u16,
    provider_timeout: u64,
    cookies: CookieConfig,
    provider: &IdentityProvider,
) -> Vec<(&'static str, String)> {
    let config = provider.config();
    let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "unset".to_string());

    vec![
        ("listen", format!("tcp:{port}")),
        ("provider_url", provider.base_url().to_string()),
        ("provider_timeout", format!("{provider_timeout}s")),
        ("api_key", "REDACTED".to_string()),
        ("auth_domain", or_unset(&config.auth_domain)),
        ("database_url", or_unset(&config.database_url)),
        ("project_id", or_unset(&config.project_id)),
        ("storage_bucket", or_unset(&config.storage_bucket)),
        ("messaging_sender_id", or_unset(&config.messaging_sender_id)),
        ("app_id", or_unset(&config.app_id)),
        ("measurement_id", or_unset(&config.measurement_id)),
        ("cookie_secure", cookies.secure.to_string()),
    ]
}

fn format_entries(title: &str, entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    message
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const BANNER: &str = r"
  client --> [ I D R E L A Y ] --> identity provider{VERSION}";

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit(" abc "), "abc");
        assert_eq!(short_commit("unknown"), "unknown");
    }

    #[test]
    fn test_format_entries_aligns_keys() {
        let entries = [("port", "8080".to_string()), ("api_key", "REDACTED".to_string())];
        let message = format_entries("Startup configuration", &entries);
        assert!(message.contains("Startup configuration:"));
        assert!(message.contains("\n  port:    8080"));
        assert!(message.contains("\n  api_key: REDACTED"));
        assert!(message.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_startup_entries_describe_provider() {
        let mut config = ProviderConfig::new(SecretString::from("AIza-secret".to_string()));
        config.project_id = Some("demo-project".to_string());
        let provider =
            IdentityProvider::new("http://localhost:9099/", config, Duration::from_secs(3))
                .unwrap();

        let entries = startup_entries(8080, 3, CookieConfig { secure: true }, &provider);
        let value = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };

        assert_eq!(value("listen").as_deref(), Some("tcp:8080"));
        assert_eq!(value("provider_url").as_deref(), Some("http://localhost:9099"));
        assert_eq!(value("project_id").as_deref(), Some("demo-project"));
        assert_eq!(value("app_id").as_deref(), Some("unset"));
        assert_eq!(value("api_key").as_deref(), Some("REDACTED"));
        assert_eq!(value("cookie_secure").as_deref(), Some("true"));
        assert!(entries.iter().all(|(_, v)| !v.contains("AIza-secret")));
    }
}
