//! Device-code authentication against Azure AD for Microsoft Graph.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::{Duration, SystemTime};

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{DeviceCodeResponse, TokenErrorResponse, TokenResponse};

/// Default Azure AD authority host.
pub(crate) const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// The fixed delegated scopes requested for every token.
///
/// `Files.ReadWrite` is the minimal read/write grant for drive contents;
/// `offline_access` yields the refresh token that backs in-process session
/// reuse. Callers cannot widen this set.
pub const FIXED_SCOPES: &str = "https://graph.microsoft.com/Files.ReadWrite offline_access";

/// Cached access token with expiration.
#[derive(Clone, Debug)]
struct CachedToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: SystemTime,
}

type TokenSlot = Arc<RwLock<Option<CachedToken>>>;

/// Process-wide token cache, keyed by (authority, tenant, app id).
///
/// Two authenticators for the same registration share one slot, so a second
/// `connect` in the same process reuses a still-valid credential instead of
/// prompting the user again.
static TOKEN_CACHE: LazyLock<Mutex<HashMap<(String, String, String), TokenSlot>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Authenticator for Microsoft Graph using the device-code flow.
#[derive(Clone, Debug)]
pub struct Authenticator {
    tenant: String,
    app_id: String,
    authority: String,
    client: Client,
    cached: TokenSlot,
}

impl Authenticator {
    /// Create an authenticator for an app registration in a tenant.
    pub fn new(tenant: &str, app_id: &str) -> Self {
        Self::with_authority(tenant, app_id, DEFAULT_AUTHORITY)
    }

    /// Create an authenticator against a non-default authority host
    /// (national clouds).
    pub fn with_authority(tenant: &str, app_id: &str, authority: &str) -> Self {
        let authority = authority.trim_end_matches('/').to_string();
        let key = (authority.clone(), tenant.to_string(), app_id.to_string());
        let cached = TOKEN_CACHE
            .lock()
            .expect("token cache lock poisoned")
            .entry(key)
            .or_default()
            .clone();
        Self {
            tenant: tenant.to_string(),
            app_id: app_id.to_string(),
            authority,
            client: Client::new(),
            cached,
        }
    }

    /// An authenticator that always yields the given token and never talks
    /// to an authority. Useful for offline work against pre-issued tokens
    /// and for tests.
    pub fn fixed(access_token: &str) -> Self {
        let token = CachedToken {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: SystemTime::now() + Duration::from_secs(24 * 3600),
        };
        Self {
            tenant: String::new(),
            app_id: String::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            client: Client::new(),
            cached: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Get a valid access token, reusing the cached one when possible.
    ///
    /// Order of preference: a cached token that has not expired, a silent
    /// refresh-token grant, and finally the interactive device-code flow.
    pub async fn get_access_token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                // 60 second buffer before expiration
                let buffer = Duration::from_secs(60);
                if token.expires_at > SystemTime::now() + buffer {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let refresh_token = {
            let cached = self.cached.read().await;
            cached.as_ref().and_then(|t| t.refresh_token.clone())
        };

        let new_token = match refresh_token {
            Some(refresh) => match self.refresh(&refresh).await {
                Ok(token) => token,
                Err(err) => {
                    warn!(error = %err, "silent refresh failed, falling back to interactive login");
                    self.device_code_flow().await?
                }
            },
            None => self.device_code_flow().await?,
        };

        let access_token = new_token.access_token.clone();
        {
            let mut cached = self.cached.write().await;
            *cached = Some(new_token);
        }

        Ok(access_token)
    }

    fn devicecode_endpoint(&self) -> String {
        format!("{}/{}/oauth2/v2.0/devicecode", self.authority, self.tenant)
    }

    fn token_endpoint(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant)
    }

    /// Run the interactive device-code exchange: request a user code, show
    /// the sign-in instructions, poll the token endpoint until the user
    /// completes the browser login.
    async fn device_code_flow(&self) -> Result<CachedToken> {
        let response = self
            .client
            .post(self.devicecode_endpoint())
            .form(&[
                ("client_id", self.app_id.as_str()),
                ("scope", FIXED_SCOPES),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "device authorization failed ({}): {}",
                status, body
            )));
        }

        let device: DeviceCodeResponse = response.json().await?;

        let message = device.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, open {} in a browser and enter the code {}",
                device.verification_uri, device.user_code
            )
        });
        eprintln!("{message}");
        info!(user_code = %device.user_code, "waiting for device sign-in");

        let mut interval = device.interval.unwrap_or(5);
        let deadline = SystemTime::now() + Duration::from_secs(device.expires_in);

        loop {
            tokio::time::sleep(Duration::from_secs(interval)).await;
            if SystemTime::now() > deadline {
                return Err(Error::Authentication(
                    "the device code expired before sign-in completed".to_string(),
                ));
            }

            let response = self
                .client
                .post(self.token_endpoint())
                .form(&[
                    ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                    ("client_id", self.app_id.as_str()),
                    ("device_code", device.device_code.as_str()),
                ])
                .send()
                .await?;

            if response.status().is_success() {
                let token: TokenResponse = response.json().await?;
                return Ok(self.accept(token));
            }

            let body = response.text().await.unwrap_or_default();
            let pending: TokenErrorResponse = match serde_json::from_str(&body) {
                Ok(parsed) => parsed,
                Err(_) => return Err(Error::Authentication(body)),
            };
            match pending.error.as_str() {
                "authorization_pending" => continue,
                "slow_down" => interval += 5,
                _ => {
                    return Err(Error::Authentication(
                        pending.error_description.unwrap_or(pending.error),
                    ))
                }
            }
        }
    }

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<CachedToken> {
        debug!("refreshing access token");

        let response = self
            .client
            .post(self.token_endpoint())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.app_id.as_str()),
                ("refresh_token", refresh_token),
                ("scope", FIXED_SCOPES),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh(format!(
                "status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(self.accept(token))
    }

    /// Record a token grant, logging the granted scope set for audit.
    fn accept(&self, token: TokenResponse) -> CachedToken {
        match token.scope.as_deref().map(str::trim) {
            Some(scopes) if !scopes.is_empty() => info!(%scopes, "granted scopes"),
            _ => warn!("token response carried no parsable scope list"),
        }
        CachedToken {
            expires_at: SystemTime::now() + Duration::from_secs(token.expires_in),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        }
    }
}
