//! Client for the identity provider's `accounts:*` REST API.
//!
//! Everything stateful lives on the provider side; this client only shapes the
//! requests and classifies the answers.

pub mod error;
pub use self::error::{Error, ErrorCode};

use self::error::ErrorEnvelope;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_PROVIDER_URL: &str = "https://identitytoolkit.googleapis.com";

/// Project credentials for the identity provider.
///
/// Only `api_key` is needed by the REST API, the rest identify the project and
/// show up in the startup banner.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub auth_domain: Option<String>,
    pub database_url: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }
}

/// Tokens issued by the provider after sign-up, sign-in or a profile update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    // seconds, sent as a string
    #[serde(default)]
    pub expires_in: Option<String>,
    #[serde(default)]
    pub local_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Session {
    #[must_use]
    pub fn expires_in_seconds(&self) -> Option<u64> {
        self.expires_in.as_deref()?.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdate {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    local_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Lookup {
    #[serde(default)]
    users: Vec<Account>,
}

#[derive(Debug, Clone)]
pub struct IdentityProvider {
    client: Client,
    base_url: String,
    config: ProviderConfig,
}

impl IdentityProvider {
    /// Build a client for the provider at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, config: ProviderConfig, timeout: Duration) -> Result<Self, Error> {
        let url = Url::parse(base_url)?;

        match url.scheme() {
            "http" | "https" => (),
            scheme => return Err(Error::UnsupportedScheme(scheme.to_string())),
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, operation: &str) -> String {
        format!("{}/v1/accounts:{operation}", self.base_url)
    }

    /// Create an account with email and password.
    ///
    /// # Errors
    /// Returns [`Error::Rejected`] with the provider's code, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, Error> {
        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        self.call("signUp", &payload).await
    }

    /// Set the display name of the account behind `id_token`.
    ///
    /// Returns the refreshed tokens when the provider issues new ones.
    ///
    /// # Errors
    /// Returns [`Error::Rejected`] with the provider's code, or a transport error.
    #[instrument(skip(self, id_token))]
    pub async fn update_profile(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<Option<Session>, Error> {
        let payload = json!({
            "idToken": id_token,
            "displayName": display_name,
            "returnSecureToken": true,
        });

        let update: ProfileUpdate = self.call("update", &payload).await?;

        Ok(update.id_token.map(|id_token| Session {
            id_token,
            refresh_token: update.refresh_token,
            expires_in: update.expires_in,
            local_id: update.local_id,
            email: update.email,
            display_name: update.display_name,
        }))
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    /// Returns [`Error::Rejected`] with the provider's code, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        self.call("signInWithPassword", &payload).await
    }

    /// Look up the account behind `id_token`.
    ///
    /// # Errors
    /// Returns [`Error::Rejected`] for invalid or expired tokens, or a transport error.
    #[instrument(skip(self, id_token))]
    pub async fn lookup(&self, id_token: &str) -> Result<Option<Account>, Error> {
        let payload = json!({ "idToken": id_token });

        let lookup: Lookup = self.call("lookup", &payload).await?;

        Ok(lookup.users.into_iter().next())
    }

    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint_url(operation);

        debug!("provider URL: {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.expose_secret())])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let bytes = response.bytes().await?;

            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();

            debug!("{} - {}, {}", operation, status, message);

            return Err(Error::Rejected(ErrorCode::from_message(&message)));
        }

        let bytes = response.bytes().await?;

        serde_json::from_slice::<R>(&bytes)
            .map_err(|e| Error::InvalidResponse(format!("{operation}: {e}")))
    }
}
