use async_trait::async_trait;
use rspotify::{
    AuthCodeSpotify, Credentials, OAuth, Token,
    model::{PlayableId, PlaylistId, SearchResult, SearchType, TrackId, UserId},
    prelude::*,
    scopes,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::auth::{AuthRequest, CredentialStore, obtain_code};
use crate::config::{AuthMode, OAuthClientConfig};
use crate::error::{AppError, Result};
use crate::playlist::SearchHit;
use crate::service::Service;
use crate::spotify::models::{TrackPage, search_hit, source_track};

/// The Spotify Web API calls the transfer needs.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// One window of playlist items starting at `offset`.
    async fn playlist_page(&self, playlist_id: &str, limit: u32, offset: u32) -> Result<TrackPage>;

    /// First track result for `query`.
    async fn search_track(&self, query: &str) -> Result<Option<SearchHit>>;

    /// Creates a private playlist for the current user and returns its ID.
    async fn create_playlist(&self, name: &str, description: &str) -> Result<String>;

    /// Appends tracks to a playlist in one request.
    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;
}

fn required_scopes() -> HashSet<String> {
    scopes!(
        "playlist-read-private",
        "playlist-read-collaborative",
        "playlist-modify-private",
        "playlist-modify-public"
    )
}

/// [`SpotifyApi`] backed by an authorized rspotify client.
pub struct RspotifyApi {
    client: AuthCodeSpotify,
    user_id: UserId<'static>,
}

impl RspotifyApi {
    pub async fn connect(
        config: &OAuthClientConfig,
        store: &CredentialStore,
        mode: AuthMode,
    ) -> Result<Self> {
        let creds = Credentials::new(&config.client_id, &config.client_secret);

        let oauth = OAuth {
            redirect_uri: config.redirect_uri.clone(),
            scopes: required_scopes(),
            ..Default::default()
        };

        let client = AuthCodeSpotify::new(creds, oauth);

        if !restore_token(&client, store).await? {
            let auth_url = client.get_authorize_url(false)?;
            let request = AuthRequest {
                service: Service::Spotify,
                authorize_url: &auth_url,
                redirect_uri: &config.redirect_uri,
                state: &client.oauth.state,
            };

            let code = obtain_code(mode, &request).await?;
            client.request_token(&code).await?;
            persist_token(&client, store).await?;
        }

        // Get current user
        let user = client.current_user().await?;
        let display_name = user
            .display_name
            .clone()
            .unwrap_or_else(|| user.id.to_string());

        info!("Successfully authenticated as Spotify user: {}", display_name);

        Ok(Self {
            client,
            user_id: user.id,
        })
    }
}

/// Installs a cached token on the client, refreshing it when expired. Returns
/// `false` when the browser flow is needed instead.
async fn restore_token(client: &AuthCodeSpotify, store: &CredentialStore) -> Result<bool> {
    let Some(token) = store.load::<Token>(Service::Spotify)? else {
        return Ok(false);
    };

    if !required_scopes().is_subset(&token.scopes) {
        debug!("Cached Spotify token lacks required scopes");
        return Ok(false);
    }

    let expired = token.is_expired();
    if expired && token.refresh_token.is_none() {
        debug!("Cached Spotify token expired and cannot be refreshed");
        return Ok(false);
    }

    *client
        .token
        .lock()
        .await
        .map_err(|_| AppError::Auth("Spotify token lock is unavailable".into()))? = Some(token);

    if expired {
        if let Err(e) = client.refresh_token().await {
            warn!("Could not refresh cached Spotify token: {}", e);
            return Ok(false);
        }
        persist_token(client, store).await?;
    }

    Ok(true)
}

async fn persist_token(client: &AuthCodeSpotify, store: &CredentialStore) -> Result<()> {
    let token = client
        .token
        .lock()
        .await
        .map_err(|_| AppError::Auth("Spotify token lock is unavailable".into()))?
        .clone();

    match token {
        Some(token) => store.save(Service::Spotify, &token),
        None => Err(AppError::Auth("Spotify returned no token".into())),
    }
}

fn playlist_id(id: &str) -> Result<PlaylistId<'_>> {
    PlaylistId::from_id(id).map_err(|e| AppError::Config(format!("Invalid playlist ID: {}", e)))
}

#[async_trait]
impl SpotifyApi for RspotifyApi {
    async fn playlist_page(&self, playlist_id_str: &str, limit: u32, offset: u32) -> Result<TrackPage> {
        let page = self
            .client
            .playlist_items_manual(playlist_id(playlist_id_str)?, None, None, Some(limit), Some(offset))
            .await?;

        let mut tracks = Vec::with_capacity(page.items.len());
        for item in &page.items {
            match item.track.as_ref().and_then(source_track) {
                Some(track) => tracks.push(track),
                None => debug!("Skipping unavailable item at offset {}", offset),
            }
        }

        Ok(TrackPage {
            total: page.total,
            returned: page.items.len(),
            tracks,
        })
    }

    async fn search_track(&self, query: &str) -> Result<Option<SearchHit>> {
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(1), None)
            .await?;

        match result {
            SearchResult::Tracks(page) => Ok(page.items.iter().find_map(search_hit)),
            _ => Ok(None),
        }
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Result<String> {
        let playlist = self
            .client
            .user_playlist_create(self.user_id.clone(), name, Some(false), None, Some(description))
            .await?;

        info!("Created Spotify playlist: {}", name);
        Ok(playlist.id.id().to_string())
    }

    async fn add_tracks(&self, playlist_id_str: &str, track_ids: &[String]) -> Result<()> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let items = track_ids
            .iter()
            .map(|id| TrackId::from_id(id.as_str()).map(PlayableId::Track))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Config(format!("Invalid track ID: {}", e)))?;

        self.client
            .playlist_add_items(playlist_id(playlist_id_str)?, items, None)
            .await?;

        info!("Added {} tracks to playlist", track_ids.len());
        Ok(())
    }
}
