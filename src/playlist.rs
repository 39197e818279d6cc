use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::matcher::{self, MatchOutcome};
use crate::service::Service;

/// A track as read from a source playlist page, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTrack {
    pub title: String,
    /// First listed artist, or the uploading channel for videos.
    pub artist: Option<String>,
}

impl SourceTrack {
    pub fn new(title: impl Into<String>, artist: Option<&str>) -> Self {
        Self {
            title: title.into(),
            artist: artist.map(str::to_string),
        }
    }
}

/// Search-ready text for one track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedTrack(String);

impl NormalizedTrack {
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-specific playlist identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First search result for a track on the destination service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Track or video ID on the destination service.
    pub id: String,
    /// Human readable description of the hit, used for match confidence.
    pub label: String,
}

/// Playlists created on the destination together with the matching outcome.
#[derive(Debug)]
pub struct SinkOutcome {
    pub matches: MatchOutcome,
    pub playlist_ids: Vec<String>,
}

/// A service playlists can be read from.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    fn service(&self) -> Service;

    /// Every track of the playlist in source order.
    async fn fetch(&self, playlist_id: &PlaylistId) -> Result<Vec<NormalizedTrack>>;
}

/// A service playlists can be created on.
#[async_trait]
pub trait PlaylistSink: Send + Sync {
    fn service(&self) -> Service;

    /// Text search restricted to tracks/videos, returning only the first hit.
    async fn search(&self, query: &NormalizedTrack) -> Result<Option<SearchHit>>;

    /// Creates destination playlist(s) containing `hits` in order and returns their IDs.
    async fn publish(&self, hits: &[SearchHit]) -> Result<Vec<String>>;

    /// Searches every track, skipping the ones without a result, then publishes the
    /// matches. Nothing is created when no track matched.
    async fn create(&self, tracks: &[NormalizedTrack]) -> Result<SinkOutcome> {
        let matches = matcher::match_tracks(self, tracks).await;
        let hits = matches.hits();

        let playlist_ids = if hits.is_empty() {
            Vec::new()
        } else {
            self.publish(&hits).await?
        };

        Ok(SinkOutcome {
            matches,
            playlist_ids,
        })
    }
}
