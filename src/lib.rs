//! # idrelay (Identity Provider Relay)
//!
//! `idrelay` is a thin HTTP front for a hosted identity provider. It relays
//! account creation, password sign-in and session lookups to the provider's
//! `accounts:*` REST API and translates the answers into short response strings.
//!
//! ## What lives where
//!
//! The provider owns everything stateful: credential storage, password hashing,
//! token issuance and verification. This service never persists a user, a
//! password or a token. A session is whatever `idToken` the client presents in
//! its `token` cookie, checked against the provider on every request.
//!
//! ## Error translation
//!
//! Provider failures are classified into a closed set of error codes by exact
//! match (see [`provider::ErrorCode`]). Each endpoint maps the codes it knows to
//! fixed `ERROR: ...` strings; everything else becomes `ERROR: Something went wrong`.

pub mod cli;
pub mod idrelay;
pub mod provider;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
