use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{AuthRequest, CredentialStore, OAuthToken, TokenResponse, obtain_code, random_state};
use crate::config::{AuthMode, OAuthClientConfig};
use crate::error::{AppError, Result};
use crate::service::Service;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Read and manage the user's playlists.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

pub fn authorize_url(config: &OAuthClientConfig, state: &str) -> Result<String> {
    let mut url = Url::parse(config.auth_uri.as_deref().unwrap_or(GOOGLE_AUTH_URL))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", YOUTUBE_SCOPE)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("state", state);
    Ok(url.into())
}

/// Returns a usable token: the cached one, a refreshed one, or a new one from the
/// browser flow. Every token obtained from the network is written back to the store.
pub async fn authorize(
    http_client: &Client,
    config: &OAuthClientConfig,
    store: &CredentialStore,
    mode: AuthMode,
) -> Result<OAuthToken> {
    if let Some(cached) = store.load::<OAuthToken>(Service::YouTube)? {
        if !cached.covers_scope(YOUTUBE_SCOPE) {
            debug!("Cached YouTube token lacks the required scope");
        } else if !cached.is_expired() {
            debug!("Using cached YouTube token");
            return Ok(cached);
        } else if let Some(refresh) = cached.refresh_token.clone() {
            match refresh_token(http_client, config, &refresh).await {
                Ok(token) => {
                    store.save(Service::YouTube, &token)?;
                    return Ok(token);
                }
                Err(e) => warn!("Could not refresh cached YouTube token: {}", e),
            }
        }
    }

    let state = random_state();
    let auth_url = authorize_url(config, &state)?;
    let request = AuthRequest {
        service: Service::YouTube,
        authorize_url: &auth_url,
        redirect_uri: &config.redirect_uri,
        state: &state,
    };

    let code = obtain_code(mode, &request).await?;
    let token = exchange_code(http_client, config, &code).await?;
    store.save(Service::YouTube, &token)?;

    info!("Successfully authenticated with YouTube");
    Ok(token)
}

async fn exchange_code(http_client: &Client, config: &OAuthClientConfig, code: &str) -> Result<OAuthToken> {
    let response = request_token(
        http_client,
        config,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
            ("redirect_uri", &config.redirect_uri),
        ],
    )
    .await?;

    Ok(OAuthToken::from_response(response, None, Utc::now()))
}

async fn refresh_token(
    http_client: &Client,
    config: &OAuthClientConfig,
    refresh_token: &str,
) -> Result<OAuthToken> {
    let response = request_token(
        http_client,
        config,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
        ],
    )
    .await?;

    debug!("Refreshed YouTube token");
    Ok(OAuthToken::from_response(
        response,
        Some(refresh_token.to_string()),
        Utc::now(),
    ))
}

async fn request_token(
    http_client: &Client,
    config: &OAuthClientConfig,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http_client
        .post(config.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URL))
        .form(form)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(AppError::Auth(format!(
            "Token request failed ({}): {}",
            status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
}
