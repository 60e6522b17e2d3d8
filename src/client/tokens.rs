//! Token-based authentication: exchanging an identity-provider token for
//! a backend JWT, time-gated refresh, and revocation. While a token is
//! installed, requests carry it as a bearer header instead of a signature.

use chrono::Utc;
use serde_json::{json, Value};

use super::StrataClient;
use crate::config::{AccessToken, JWT_PATH};
use crate::errors::{ClientError, ClientResult};
use crate::object::GenericObject;
use crate::request::Operation;

impl StrataClient {
    /// Exchange an identity-provider access token for a backend JWT and
    /// the corresponding user object. With `remember` the JWT is installed
    /// on this client and refreshed automatically before later calls.
    pub async fn sign_in(
        &self,
        provider: &str,
        provider_token: &str,
        remember: bool,
    ) -> ClientResult<GenericObject> {
        let credentials = json!({
            "appid": self.access_key(),
            "provider": provider,
            "token": provider_token,
        });
        let value = self
            .get_value(Operation::post(JWT_PATH).body(credentials))
            .await?;

        match parse_auth_response(&value) {
            Some((user, token)) => {
                if remember {
                    self.update_config(|c| c.access_token = Some(token.clone()));
                }
                Ok(user)
            }
            None => {
                self.clear_access_token();
                Err(ClientError::Decode {
                    status: 200,
                    path: JWT_PATH.to_string(),
                    message: "sign-in response is missing user or jwt".to_string(),
                })
            }
        }
    }

    /// Forget the JWT. The token itself is not revoked; use
    /// [`revoke_all_tokens`](Self::revoke_all_tokens) for that.
    pub fn sign_out(&self) {
        self.clear_access_token();
    }

    /// Refresh the installed JWT. Requires a valid, unexpired token with a
    /// due refresh window; returns whether a refresh happened. A failed
    /// refresh clears the token.
    pub async fn refresh_token(&self) -> ClientResult<bool> {
        let config = self.snapshot();
        let Some(token) = &config.access_token else {
            return Ok(false);
        };
        if !refresh_due(token, Utc::now().timestamp_millis()) {
            return Ok(false);
        }

        let value = self.get_value(Operation::get(JWT_PATH)).await?;
        match parse_auth_response(&value) {
            Some((_, token)) => {
                self.update_config(|c| c.access_token = Some(token.clone()));
                Ok(true)
            }
            None => {
                self.clear_access_token();
                Ok(false)
            }
        }
    }

    /// Revoke all of the signed-in user's tokens, everywhere
    pub async fn revoke_all_tokens(&self) -> ClientResult<()> {
        self.invoke_delete(JWT_PATH, Vec::new()).await?;
        Ok(())
    }

    /// The authenticated user for an explicit JWT, without installing it
    pub async fn me_with_jwt(&self, jwt: &str) -> ClientResult<GenericObject> {
        let bearer = if jwt.starts_with("Bearer") {
            jwt.to_string()
        } else {
            format!("Bearer {}", jwt)
        };
        self.get_object(Operation::get("_me").header("authorization", &bearer))
            .await
    }

    /// Called before every non-token request while a token is installed.
    /// Refresh failures only log: the original request still goes out and
    /// fails with a proper auth error if the token is truly dead.
    pub(crate) async fn refresh_token_if_due(&self) {
        let config = self.snapshot();
        let Some(token) = &config.access_token else {
            return;
        };
        if !refresh_due(token, Utc::now().timestamp_millis()) {
            return;
        }
        if let Err(e) = self.refresh_token().await {
            tracing::warn!(error = %e, "token refresh failed");
        }
    }
}

/// A token is refreshable when it has not expired and its refresh instant
/// has passed (or is inconsistent with the expiry)
fn refresh_due(token: &AccessToken, now_ms: i64) -> bool {
    let not_expired = token.expires.is_some_and(|exp| exp > now_ms);
    let can_refresh = token
        .next_refresh
        .is_some_and(|r| r < now_ms || token.expires.is_some_and(|exp| r > exp));
    not_expired && can_refresh
}

/// Extract `(user, jwt)` from an auth response body
fn parse_auth_response(value: &Value) -> Option<(GenericObject, AccessToken)> {
    let user = GenericObject::from_value(value.get("user")?.clone()).ok()?;
    let jwt = value.get("jwt")?;
    let token = AccessToken {
        token: jwt.get("access_token")?.as_str()?.to_string(),
        expires: jwt.get("expires").and_then(Value::as_i64),
        next_refresh: jwt.get("refresh").and_then(Value::as_i64),
    };
    Some((user, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires: Option<i64>, next_refresh: Option<i64>) -> AccessToken {
        AccessToken {
            token: "t".to_string(),
            expires,
            next_refresh,
        }
    }

    #[test]
    fn test_refresh_due_windows() {
        // refresh instant passed, token still valid
        assert!(refresh_due(&token(Some(2000), Some(500)), 1000));
        // refresh instant in the future
        assert!(!refresh_due(&token(Some(2000), Some(1500)), 1000));
        // expired token is never refreshed
        assert!(!refresh_due(&token(Some(900), Some(500)), 1000));
        // no metadata, no refresh
        assert!(!refresh_due(&token(None, None), 1000));
        // inconsistent refresh-after-expiry still triggers
        assert!(refresh_due(&token(Some(2000), Some(3000)), 1000));
    }

    #[test]
    fn test_parse_auth_response() {
        let value = serde_json::json!({
            "user": {"id": "u1", "type": "user", "name": "John"},
            "jwt": {"access_token": "abc", "expires": 123, "refresh": 45}
        });
        let (user, token) = parse_auth_response(&value).unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(token.token, "abc");
        assert_eq!(token.expires, Some(123));
        assert_eq!(token.next_refresh, Some(45));

        assert!(parse_auth_response(&serde_json::json!({"user": null})).is_none());
    }
}
