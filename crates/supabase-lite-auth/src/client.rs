use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use supabase_lite_core::{
    object, HttpRequest, JsonValue, RawResponse, SupabaseClient, SupabaseError,
};

use crate::error::{AuthError, GoTrueErrorResponse};
use crate::types::{AuthResponse, Session, User, UserAttributes};

/// HTTP client for the Supabase GoTrue auth API at `/auth/v1/...`.
///
/// Requests go through the shared client, so they carry the `apikey` header and obey the
/// configured retry policy. Calls made on behalf of a user take that user's access token.
///
/// # Example
/// ```ignore
/// use supabase_lite_auth::SupabaseClientAuthExt;
///
/// let auth = client.auth();
/// let session = auth.sign_in_with_password("user@example.com", "password").await?;
/// let user = auth.get_user(&session.access_token).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: SupabaseClient,
}

impl AuthClient {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Base URL of the auth API.
    pub fn base_url(&self) -> String {
        self.client.endpoint("auth/v1")
    }

    /// Sign up a new user with email and password.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let body = object![("email", email), ("password", password)];
        let resp = self.send(Method::POST, "signup", None, Some(&body)).await?;
        let value = JsonValue::from_slice(&resp.body)?;

        // Autoconfirm projects answer with a session, others with the bare user.
        if value.get("access_token").is_some() {
            let session: Session = into_typed(value)?;
            let user = session.user.clone();
            Ok(AuthResponse {
                session: Some(session),
                user: Some(user),
            })
        } else if value.get("id").is_some() {
            Ok(AuthResponse {
                session: None,
                user: Some(into_typed(value)?),
            })
        } else if value.get("session").is_some() || value.get("user").is_some() {
            into_typed(value)
        } else {
            Err(AuthError::InvalidResponse(
                "sign-up response carries neither a session nor a user".to_string(),
            ))
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let body = object![("email", email), ("password", password)];
        let resp = self
            .send(Method::POST, "token?grant_type=password", None, Some(&body))
            .await?;
        decode(&resp)
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let body = object![("refresh_token", refresh_token)];
        let resp = self
            .send(Method::POST, "token?grant_type=refresh_token", None, Some(&body))
            .await?;
        decode(&resp)
    }

    /// Get the user owning `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let resp = self.send(Method::GET, "user", Some(access_token), None).await?;
        decode(&resp)
    }

    /// Update the user owning `access_token`.
    pub async fn update_user(
        &self,
        access_token: &str,
        attributes: &UserAttributes,
    ) -> Result<User, AuthError> {
        let body = JsonValue::from_serializable(attributes)?;
        let resp = self
            .send(Method::PUT, "user", Some(access_token), Some(&body))
            .await?;
        decode(&resp)
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.send(Method::POST, "logout", Some(access_token), None)
            .await?;
        Ok(())
    }

    /// Send a password recovery email.
    pub async fn reset_password_for_email(&self, email: &str) -> Result<(), AuthError> {
        let body = object![("email", email)];
        self.send(Method::POST, "recover", None, Some(&body)).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        action: &str,
        access_token: Option<&str>,
        body: Option<&JsonValue>,
    ) -> Result<RawResponse, AuthError> {
        debug!(%method, action, "Auth request");

        let mut request: HttpRequest =
            self.client.request(method, &format!("auth/v1/{}", action))?;
        if let Some(token) = access_token {
            request = request.header("Authorization", &format!("Bearer {}", token))?;
        }
        if let Some(body) = body {
            request = request.json(body)?;
        }

        let resp = self.client.send(request).await?;
        if !resp.is_success() {
            return Err(parse_error(&resp));
        }
        Ok(resp)
    }
}

/// Decode a success body. Malformed JSON is a parse error; a valid document of the wrong
/// shape is an invalid response.
fn decode<T: DeserializeOwned>(resp: &RawResponse) -> Result<T, AuthError> {
    into_typed(JsonValue::from_slice(&resp.body)?)
}

fn into_typed<T: DeserializeOwned>(value: JsonValue) -> Result<T, AuthError> {
    value.deserialize_into().map_err(|e| match e {
        SupabaseError::InvalidResponse(message) => AuthError::InvalidResponse(message),
        other => AuthError::Core(other),
    })
}

fn parse_error(resp: &RawResponse) -> AuthError {
    let body: GoTrueErrorResponse = serde_json::from_slice(&resp.body).unwrap_or_default();
    let message = body
        .error_message()
        .unwrap_or_else(|| format!("HTTP {} {}", resp.status, resp.status_text));
    AuthError::Api {
        status: resp.status,
        message,
        error_code: body.error_code.as_deref().map(Into::into),
    }
}
