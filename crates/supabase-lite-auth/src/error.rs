use serde::Deserialize;
use std::fmt;
use supabase_lite_core::SupabaseError;

/// Error response format from the GoTrue API.
///
/// GoTrue may return errors in different shapes; this covers the common fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoTrueErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl GoTrueErrorResponse {
    /// Extract the most informative error message from the response.
    pub fn error_message(&self) -> Option<String> {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
            .map(str::to_string)
    }
}

/// Auth-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Transport failure, exhausted retries or malformed JSON from the shared executor.
    #[error(transparent)]
    Core(#[from] SupabaseError),

    /// GoTrue API returned an error response.
    #[error("Auth API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<AuthErrorCode>,
    },

    /// Well-formed JSON missing a required field or of the wrong shape.
    #[error("Invalid auth response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Core(err) => err.status(),
            Self::InvalidResponse(_) => None,
        }
    }
}

/// Known GoTrue error codes for programmatic matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidCredentials,
    UserNotFound,
    UserAlreadyExists,
    EmailNotConfirmed,
    EmailExists,
    SessionNotFound,
    RefreshTokenNotFound,
    RefreshTokenAlreadyUsed,
    BadJwt,
    WeakPassword,
    SamePassword,
    ValidationFailed,
    OverRequestRateLimit,
    OverEmailSendRateLimit,
    Unknown(String),
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserNotFound => "user_not_found",
            Self::UserAlreadyExists => "user_already_exists",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::EmailExists => "email_exists",
            Self::SessionNotFound => "session_not_found",
            Self::RefreshTokenNotFound => "refresh_token_not_found",
            Self::RefreshTokenAlreadyUsed => "refresh_token_already_used",
            Self::BadJwt => "bad_jwt",
            Self::WeakPassword => "weak_password",
            Self::SamePassword => "same_password",
            Self::ValidationFailed => "validation_failed",
            Self::OverRequestRateLimit => "over_request_rate_limit",
            Self::OverEmailSendRateLimit => "over_email_send_rate_limit",
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AuthErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "invalid_credentials" => Self::InvalidCredentials,
            "user_not_found" => Self::UserNotFound,
            "user_already_exists" => Self::UserAlreadyExists,
            "email_not_confirmed" => Self::EmailNotConfirmed,
            "email_exists" => Self::EmailExists,
            "session_not_found" => Self::SessionNotFound,
            "refresh_token_not_found" => Self::RefreshTokenNotFound,
            "refresh_token_already_used" => Self::RefreshTokenAlreadyUsed,
            "bad_jwt" => Self::BadJwt,
            "weak_password" => Self::WeakPassword,
            "same_password" => Self::SamePassword,
            "validation_failed" => Self::ValidationFailed,
            "over_request_rate_limit" => Self::OverRequestRateLimit,
            "over_email_send_rate_limit" => Self::OverEmailSendRateLimit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<AuthError> for SupabaseError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Core(inner) => inner,
            other => SupabaseError::Auth(other.to_string()),
        }
    }
}
