use elp_common::Secret;
use log::*;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{config::EbayApiConfig, error::EbayApiError};

const OAUTH_TOKEN_PATH: &str = "/identity/v1/oauth2/token";
const OAUTH_SCOPES: &str =
    "https://api.ebay.com/oauth/api_scope/sell.fulfillment https://api.ebay.com/oauth/api_scope/sell.logistics";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Process-lifetime cache for the eBay user access token.
///
/// The token is minted lazily on first use from the long-lived refresh token.
/// Callers that receive a 401 from the API pass `force_refresh = true` to
/// mint exactly one replacement before giving up with an auth error.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    token: Mutex<Option<Secret<String>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self { token: Mutex::new(None) }
    }

    pub async fn access_token(
        &self,
        client: &Client,
        config: &EbayApiConfig,
        force_refresh: bool,
    ) -> Result<Secret<String>, EbayApiError> {
        let mut cached = self.token.lock().await;
        if !force_refresh {
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }
        let token = mint_access_token(client, config).await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Exchange the refresh token for a short-lived access token using eBay's
/// OAuth refresh grant. Client id and secret travel as HTTP basic auth.
async fn mint_access_token(client: &Client, config: &EbayApiConfig) -> Result<Secret<String>, EbayApiError> {
    let url = config.api_url(OAUTH_TOKEN_PATH);
    debug!("🔑 Requesting a new access token for the {} environment", config.environment);
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", config.refresh_token.reveal().as_str()),
        ("scope", OAUTH_SCOPES),
    ];
    let response = client
        .post(url)
        .basic_auth(&config.client_id, Some(config.client_secret.reveal()))
        .form(&form)
        .send()
        .await
        .map_err(EbayApiError::from_reqwest)?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_else(|e| e.to_string());
        warn!("🔑 eBay token endpoint rejected the refresh token. {status}");
        return Err(EbayApiError::Auth(format!("Token endpoint returned {status}. {message}")));
    }
    let token = response.json::<TokenResponse>().await.map_err(|e| EbayApiError::Json(e.to_string()))?;
    info!("🔑 Minted a new eBay access token. Expires in {}s", token.expires_in);
    Ok(Secret::new(token.access_token))
}
