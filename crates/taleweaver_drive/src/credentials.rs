//! OAuth credentials for an authorized user.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::Path;
use taleweaver_error::{DriveError, DriveErrorKind, TaleweaverResult};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Google's token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Authorized-user token file, as written by Google's client libraries.
#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Token endpoint; Google's when absent
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Last access token, if saved
    #[serde(default)]
    pub token: Option<String>,
    /// Expiry of `token`
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl AuthorizedUser {
    /// Parse a token file's JSON.
    pub fn from_json(json: &str) -> TaleweaverResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            DriveError::new(DriveErrorKind::Credentials(format!("invalid token file: {}", e))).into()
        })
    }

    /// Read a token file.
    pub async fn load(path: &Path) -> TaleweaverResult<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            DriveError::new(DriveErrorKind::Credentials(format!("{}: {}", path.display(), e)))
        })?;
        Self::from_json(&json)
    }

    /// Endpoint used for refreshing.
    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

/// Bearer token with its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Token value
    pub token: String,
    /// When the token stops working
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// True if the token is valid for at least another minute.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Hands out access tokens, refreshing when the cached one expires.
pub struct TokenSource {
    http: reqwest::Client,
    user: AuthorizedUser,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    /// Token source for `user`, seeded with the saved token if any.
    pub fn new(http: reqwest::Client, user: AuthorizedUser) -> Self {
        let cached = user
            .token
            .clone()
            .zip(user.expiry)
            .map(|(token, expires_at)| AccessToken { token, expires_at });
        Self {
            http,
            user,
            cached: Mutex::new(cached),
        }
    }

    /// A valid access token.
    pub async fn access_token(&self) -> TaleweaverResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.token.clone());
            }
        }
        let token = self.refresh().await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    #[instrument(skip_all, fields(token_uri = %self.user.token_uri()))]
    async fn refresh(&self) -> TaleweaverResult<AccessToken> {
        let refresh_error =
            |message: String| DriveError::new(DriveErrorKind::TokenRefresh(message));
        let response = self
            .http
            .post(self.user.token_uri())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.user.client_id.as_str()),
                ("client_secret", self.user.client_secret.as_str()),
                ("refresh_token", self.user.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| refresh_error(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| refresh_error(e.to_string()))?;
        if !status.is_success() {
            return Err(refresh_error(format!("HTTP {}: {}", status.as_u16(), body)).into());
        }
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| refresh_error(e.to_string()))?;
        let expires_in = parsed.expires_in.unwrap_or(3600);
        debug!(expires_in, "Refreshed Drive access token");
        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}
