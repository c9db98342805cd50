//! Access tokens for Google APIs.
//!
//! A static token is used as-is. A service account key is exchanged for a
//! short-lived token through the OAuth2 JWT-bearer grant, and the token is
//! cached until shortly before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{Credentials, ServiceAccountKey};
use crate::error::SearchError;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct TokenProvider {
    credentials: Credentials,
    http: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(credentials: Credentials, http: Client) -> Self {
        Self {
            credentials,
            http,
            cached: RwLock::new(None),
        }
    }

    /// Return a token valid for at least the next minute.
    pub async fn access_token(&self) -> Result<String, SearchError> {
        let key = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(key) => key,
        };

        {
            let cached = self.cached.read();
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        tracing::info!(client_email = %key.client_email, "Exchanging service account assertion for access token");
        let token = self.exchange(key).await?;
        let access_token = token.access_token.clone();
        *self.cached.write() = Some(token);
        Ok(access_token)
    }

    async fn exchange(&self, key: &ServiceAccountKey) -> Result<CachedToken, SearchError> {
        let now = Utc::now();
        let assertion = sign_assertion(key, now)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let resp = self
            .http
            .post(&key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("token request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            return Err(SearchError::Auth(format!(
                "token endpoint returned HTTP {}: {}",
                status, preview
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Decode(format!("token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

/// Build the RS256-signed JWT assertion for the JWT-bearer grant.
fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, SearchError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SearchError::Auth(format!("invalid service account private key: {}", e)))?;

    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| SearchError::Auth(format!("failed to sign assertion: {}", e)))
}
