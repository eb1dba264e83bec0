use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Failure codes reported by the identity provider.
///
/// The provider answers with messages like `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`. Only the code in
/// front of the ` : ` separator is significant and it is matched exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    EmailExists,
    InvalidEmail,
    WeakPassword,
    UserNotFound,
    InvalidPassword,
    EmailNotFound,
    InvalidIdToken,
    TokenExpired,
    Unrecognized(String),
}

impl ErrorCode {
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or_default().trim();

        match code {
            "EMAIL_EXISTS" => Self::EmailExists,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::InvalidPassword,
            "EMAIL_NOT_FOUND" => Self::EmailNotFound,
            "INVALID_ID_TOKEN" => Self::InvalidIdToken,
            "TOKEN_EXPIRED" => Self::TokenExpired,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::EmailExists => "EMAIL_EXISTS",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::InvalidIdToken => "INVALID_ID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Unrecognized(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("identity provider rejected the request: {0}")]
    Rejected(ErrorCode),
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),
    #[error("invalid identity provider URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported identity provider URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl Error {
    /// The provider error code, if the provider answered with one.
    #[must_use]
    pub const fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Rejected(code) => Some(code),
            _ => None,
        }
    }
}

// {"error": {"code": 400, "message": "EMAIL_EXISTS", "errors": [...]}}
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_known_codes() {
        let cases = [
            ("EMAIL_EXISTS", ErrorCode::EmailExists),
            ("INVALID_EMAIL", ErrorCode::InvalidEmail),
            ("WEAK_PASSWORD", ErrorCode::WeakPassword),
            ("USER_NOT_FOUND", ErrorCode::UserNotFound),
            ("INVALID_PASSWORD", ErrorCode::InvalidPassword),
            ("EMAIL_NOT_FOUND", ErrorCode::EmailNotFound),
            ("INVALID_ID_TOKEN", ErrorCode::InvalidIdToken),
            ("TOKEN_EXPIRED", ErrorCode::TokenExpired),
        ];

        for (message, expected) in cases {
            assert_eq!(ErrorCode::from_message(message), expected);
            assert_eq!(expected.as_str(), message);
        }
    }

    #[test]
    fn test_from_message_strips_detail() {
        assert_eq!(
            ErrorCode::from_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            ErrorCode::WeakPassword
        );
    }

    #[test]
    fn test_from_message_is_exact() {
        // Substrings of a known code are not the code.
        assert_eq!(
            ErrorCode::from_message("NOT_EMAIL_EXISTS"),
            ErrorCode::Unrecognized("NOT_EMAIL_EXISTS".to_string())
        );
        assert_eq!(
            ErrorCode::from_message("email_exists"),
            ErrorCode::Unrecognized("email_exists".to_string())
        );
        assert_eq!(
            ErrorCode::from_message(""),
            ErrorCode::Unrecognized(String::new())
        );
    }

    #[test]
    fn test_error_code_accessor() {
        let err = Error::Rejected(ErrorCode::EmailExists);
        assert_eq!(err.code(), Some(&ErrorCode::EmailExists));
        assert_eq!(
            err.to_string(),
            "identity provider rejected the request: EMAIL_EXISTS"
        );

        let err = Error::InvalidResponse("missing idToken".to_string());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_error_envelope_parse() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[{"message":"EMAIL_NOT_FOUND","domain":"global","reason":"invalid"}]}}"#,
        )
        .unwrap();
        assert_eq!(envelope.error.message, "EMAIL_NOT_FOUND");
    }
}
