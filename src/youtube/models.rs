use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::playlist::{SearchHit, SourceTrack};

/// One page of playlist items plus the continuation token, if any.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub tracks: Vec<SourceTrack>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItemSnippet {
    pub title: String,
    #[serde(rename = "videoOwnerChannelTitle")]
    pub video_owner_channel_title: Option<String>,
}

// Titles YouTube shows in place of videos that can no longer be played.
const UNAVAILABLE_TITLES: &[&str] = &["Deleted video", "Private video"];

impl PlaylistItemSnippet {
    fn is_unavailable(&self) -> bool {
        self.video_owner_channel_title.is_none()
            && UNAVAILABLE_TITLES.contains(&self.title.as_str())
    }
}

impl From<PlaylistItemListResponse> for ItemPage {
    fn from(response: PlaylistItemListResponse) -> Self {
        Self {
            tracks: response
                .items
                .into_iter()
                .filter_map(|item| {
                    if item.snippet.is_unavailable() {
                        debug!("Skipping unavailable video: {}", item.snippet.title);
                        return None;
                    }
                    Some(SourceTrack::new(
                        item.snippet.title,
                        item.snippet.video_owner_channel_title.as_deref(),
                    ))
                })
                .collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResultId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchSnippet {
    pub title: String,
}

impl SearchListResponse {
    pub fn first_video(self) -> Option<SearchHit> {
        self.items.into_iter().find_map(|item| {
            let id = item.id.video_id?;
            let label = item.snippet.map(|s| s.title).unwrap_or_default();
            Some(SearchHit { id, label })
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistInsert<'a> {
    pub snippet: PlaylistSnippet<'a>,
    pub status: PlaylistStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistSnippet<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistStatus {
    #[serde(rename = "privacyStatus")]
    pub privacy_status: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistResource {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistItemInsert<'a> {
    pub snippet: PlaylistItemInsertSnippet<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistItemInsertSnippet<'a> {
    #[serde(rename = "playlistId")]
    pub playlist_id: &'a str,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceId<'a> {
    pub kind: &'static str,
    #[serde(rename = "videoId")]
    pub video_id: &'a str,
}
