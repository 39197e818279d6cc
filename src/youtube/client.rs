use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::auth::CredentialStore;
use crate::config::{AuthMode, OAuthClientConfig};
use crate::error::{AppError, Result};
use crate::playlist::SearchHit;
use crate::youtube::auth;
use crate::youtube::models::{
    ItemPage, PlaylistInsert, PlaylistItemInsert, PlaylistItemInsertSnippet,
    PlaylistItemListResponse, PlaylistResource, PlaylistSnippet, PlaylistStatus, ResourceId,
    SearchListResponse,
};

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const ITEMS_PER_PAGE: &str = "50";

/// The YouTube Data API calls the transfer needs.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// One page of playlist items. `None` requests the first page.
    async fn playlist_items(&self, playlist_id: &str, page_token: Option<&str>) -> Result<ItemPage>;

    /// First video result for `query`.
    async fn search_video(&self, query: &str) -> Result<Option<SearchHit>>;

    /// Creates a private playlist and returns its ID.
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String>;

    /// Appends a single video; the API has no bulk insert.
    async fn add_video(&self, playlist_id: &str, video_id: &str) -> Result<()>;
}

/// [`YouTubeApi`] over the REST endpoints with a bearer token.
pub struct YouTubeClient {
    http_client: Client,
    access_token: String,
}

impl YouTubeClient {
    pub async fn new(
        config: &OAuthClientConfig,
        store: &CredentialStore,
        mode: AuthMode,
    ) -> Result<Self> {
        let http_client = Client::new();
        let token = auth::authorize(&http_client, config, store, mode).await?;

        Ok(Self {
            http_client,
            access_token: token.access_token,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http_client
            .get(format!("{}/{}", YOUTUBE_API_BASE, path))
            .bearer_auth(&self.access_token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http_client
            .post(format!("{}/{}", YOUTUBE_API_BASE, path))
            .bearer_auth(&self.access_token)
    }
}

async fn parse<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(AppError::YouTubeApi(format!(
            "Failed to {} ({}): {}",
            action, status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::YouTubeApi(format!("Failed to parse response to {}: {}", action, e)))
}

#[async_trait]
impl YouTubeApi for YouTubeClient {
    async fn playlist_items(&self, playlist_id: &str, page_token: Option<&str>) -> Result<ItemPage> {
        let mut request = self.get("playlistItems").query(&[
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", ITEMS_PER_PAGE),
        ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        let page: PlaylistItemListResponse = parse(response, "list playlist items").await?;
        debug!("Fetched {} playlist items", page.items.len());

        Ok(page.into())
    }

    async fn search_video(&self, query: &str) -> Result<Option<SearchHit>> {
        let response = self
            .get("search")
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", "1"),
                ("q", query),
            ])
            .send()
            .await?;

        let results: SearchListResponse = parse(response, "search videos").await?;
        Ok(results.first_video())
    }

    async fn create_playlist(&self, title: &str, description: &str) -> Result<String> {
        let body = PlaylistInsert {
            snippet: PlaylistSnippet { title, description },
            status: PlaylistStatus {
                privacy_status: "private",
            },
        };

        let response = self
            .post("playlists")
            .query(&[("part", "snippet,status")])
            .json(&body)
            .send()
            .await?;

        let playlist: PlaylistResource = parse(response, "create playlist").await?;
        info!("Created YouTube playlist: {}", title);
        Ok(playlist.id)
    }

    async fn add_video(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let body = PlaylistItemInsert {
            snippet: PlaylistItemInsertSnippet {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id,
                },
            },
        };

        let response = self
            .post("playlistItems")
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await?;

        let _: serde_json::Value = parse(response, "add video").await?;
        Ok(())
    }
}
