use async_trait::async_trait;
use tracing::{debug, info};

use crate::batch;
use crate::config::TransferLimits;
use crate::error::Result;
use crate::normalize;
use crate::playlist::{NormalizedTrack, PlaylistId, PlaylistSink, PlaylistSource, SearchHit};
use crate::service::Service;
use crate::youtube::client::YouTubeApi;

const DESCRIPTION: &str = "Converted with playlist-converter";

/// YouTube as a playlist source and destination.
pub struct YouTubeService<A> {
    api: A,
    limits: TransferLimits,
    playlist_title: String,
}

impl<A: YouTubeApi> YouTubeService<A> {
    pub fn new(api: A, limits: TransferLimits, playlist_title: impl Into<String>) -> Self {
        Self {
            api,
            limits,
            playlist_title: playlist_title.into(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

#[async_trait]
impl<A: YouTubeApi> PlaylistSource for YouTubeService<A> {
    fn service(&self) -> Service {
        Service::YouTube
    }

    /// Follows continuation tokens until the API stops returning one.
    async fn fetch(&self, playlist_id: &PlaylistId) -> Result<Vec<NormalizedTrack>> {
        info!("Fetching YouTube playlist {}", playlist_id);

        let mut tracks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .api
                .playlist_items(playlist_id.as_str(), page_token.as_deref())
                .await?;

            tracks.extend(page.tracks.iter().map(|t| normalize::video_query(&t.title)));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!("Fetched {} videos from playlist", tracks.len());
        Ok(tracks)
    }
}

#[async_trait]
impl<A: YouTubeApi> PlaylistSink for YouTubeService<A> {
    fn service(&self) -> Service {
        Service::YouTube
    }

    async fn search(&self, query: &NormalizedTrack) -> Result<Option<SearchHit>> {
        self.api.search_video(query.as_str()).await
    }

    /// Fills playlists up to `youtube_playlist_capacity` videos each. A single
    /// playlist keeps the configured title; overflow produces "Playlist #1",
    /// "Playlist #2" and so on.
    async fn publish(&self, hits: &[SearchHit]) -> Result<Vec<String>> {
        let capacity = self.limits.youtube_playlist_capacity.max(1);
        let rollover = hits.len() > capacity;
        let api = &self.api;
        let title = self.playlist_title.as_str();

        let playlist_ids = batch::flush_in_batches(hits, capacity, move |index, chunk| async move {
            let name = if rollover {
                format!("Playlist #{}", index + 1)
            } else {
                title.to_string()
            };

            let playlist_id = api.create_playlist(&name, DESCRIPTION).await?;
            for hit in chunk {
                api.add_video(&playlist_id, &hit.id).await?;
            }

            debug!("Filled {} with {} videos", name, chunk.len());
            Ok(playlist_id)
        })
        .await?;

        info!(
            "Added {} videos across {} YouTube playlist(s)",
            hits.len(),
            playlist_ids.len()
        );
        Ok(playlist_ids)
    }
}
