//! Reqwest-backed identity provider using the Identity Toolkit REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{AccountResponseDto, ErrorEnvelopeDto, OobCodeRequestDto, PasswordRequestDto};
use crate::domain::ports::{AuthenticatedIdentity, IdentityProvider, IdentityProviderError};
use crate::domain::{Email, LoginCredentials, UserId};
use crate::outbound::http_preview::status_message;

const PASSWORD_RESET: &str = "PASSWORD_RESET";

/// Connection settings for [`FirebaseIdentityProvider`].
pub struct FirebaseConfig {
    /// API base, e.g. `https://identitytoolkit.googleapis.com/`.
    pub endpoint: Url,
    /// Web API key sent as the `key` query parameter.
    pub api_key: Zeroizing<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Email/password identity provider.
pub struct FirebaseIdentityProvider {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl FirebaseIdentityProvider {
    /// Build a provider with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error when the HTTP client cannot be built.
    pub fn new(config: FirebaseConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        action: &str,
        payload: &B,
    ) -> Result<Vec<u8>, IdentityProviderError> {
        let mut url = self
            .endpoint
            .join(&format!("v1/accounts:{action}"))
            .map_err(|err| IdentityProviderError::upstream(format!("invalid endpoint: {err}")))?;
        url.query_pairs_mut().append_pair("key", self.api_key.as_str());

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|err| IdentityProviderError::upstream(err.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| IdentityProviderError::upstream(err.without_url().to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        debug!(action, "identity provider call succeeded");
        Ok(body.to_vec())
    }

    async fn password_call(
        &self,
        action: &str,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        let payload = PasswordRequestDto {
            email: credentials.email().as_ref(),
            password: credentials.password(),
            return_secure_token: true,
        };
        let body = self.post(action, &payload).await?;
        parse_identity(&body)
    }
}

fn parse_identity(body: &[u8]) -> Result<AuthenticatedIdentity, IdentityProviderError> {
    let account: AccountResponseDto = serde_json::from_slice(body)
        .map_err(|err| IdentityProviderError::decode(format!("invalid account payload: {err}")))?;
    let uid = UserId::new(account.local_id)
        .map_err(|err| IdentityProviderError::decode(format!("invalid uid: {err}")))?;
    let email = Email::new(&account.email)
        .map_err(|err| IdentityProviderError::decode(format!("invalid email: {err}")))?;
    Ok(AuthenticatedIdentity { uid, email })
}

/// Map provider error codes such as `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let code = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|env| env.error.message)
        .unwrap_or_default();
    let (head, detail) = match code.split_once(':') {
        Some((head, detail)) => (head.trim(), detail.trim()),
        None => (code.trim(), ""),
    };
    match head {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED"
        | "INVALID_EMAIL" => IdentityProviderError::invalid_credentials(),
        "EMAIL_EXISTS" => IdentityProviderError::email_taken(),
        "WEAK_PASSWORD" => IdentityProviderError::weak_password(if detail.is_empty() {
            "password is too weak"
        } else {
            detail
        }),
        _ => IdentityProviderError::upstream(status_message(status, body)),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        self.password_call("signInWithPassword", credentials).await
    }

    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedIdentity, IdentityProviderError> {
        self.password_call("signUp", credentials).await
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityProviderError> {
        let payload = OobCodeRequestDto {
            request_type: PASSWORD_RESET,
            email: email.as_ref(),
        };
        self.post("sendOobCode", &payload).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn error_body(code: &str) -> Vec<u8> {
        format!(r#"{{"error":{{"code":400,"message":"{code}"}}}}"#).into_bytes()
    }

    #[rstest]
    #[case("EMAIL_NOT_FOUND")]
    #[case("INVALID_PASSWORD")]
    #[case("INVALID_LOGIN_CREDENTIALS")]
    #[case("USER_DISABLED")]
    fn credential_failures_are_indistinguishable(#[case] code: &str) {
        assert_eq!(
            map_status_error(StatusCode::BAD_REQUEST, &error_body(code)),
            IdentityProviderError::InvalidCredentials
        );
    }

    #[rstest]
    fn existing_email_is_taken() {
        assert_eq!(
            map_status_error(StatusCode::BAD_REQUEST, &error_body("EMAIL_EXISTS")),
            IdentityProviderError::EmailTaken
        );
    }

    #[rstest]
    fn weak_password_keeps_the_provider_hint() {
        let body = error_body("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(
            map_status_error(StatusCode::BAD_REQUEST, &body),
            IdentityProviderError::weak_password("Password should be at least 6 characters")
        );
    }

    #[rstest]
    fn unknown_failures_are_upstream() {
        assert!(matches!(
            map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"maintenance"),
            IdentityProviderError::Upstream { .. }
        ));
    }

    #[rstest]
    fn password_reset_request_uses_the_oob_shape() {
        let payload = OobCodeRequestDto {
            request_type: PASSWORD_RESET,
            email: "sam@example.com",
        };
        assert_eq!(
            serde_json::to_value(&payload).expect("json"),
            serde_json::json!({ "requestType": "PASSWORD_RESET", "email": "sam@example.com" })
        );
    }

    #[rstest]
    fn decodes_uid_and_normalised_email() {
        let identity =
            parse_identity(br#"{"localId":"kX9f2Lq0Ab","email":"Sam@Example.com","idToken":"t"}"#)
                .expect("identity");
        assert_eq!(identity.uid.as_ref(), "kX9f2Lq0Ab");
        assert_eq!(identity.email.as_ref(), "sam@example.com");
    }
}
