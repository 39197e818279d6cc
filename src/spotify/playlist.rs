use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::batch;
use crate::config::TransferLimits;
use crate::error::Result;
use crate::normalize;
use crate::playlist::{NormalizedTrack, PlaylistId, PlaylistSink, PlaylistSource, SearchHit};
use crate::service::Service;
use crate::spotify::client::SpotifyApi;

const DESCRIPTION: &str = "Converted with playlist-converter";

/// Spotify as a playlist source and destination.
pub struct SpotifyService<A> {
    api: A,
    limits: TransferLimits,
    playlist_title: String,
}

impl<A: SpotifyApi> SpotifyService<A> {
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
impl<A: SpotifyApi> PlaylistSource for SpotifyService<A> {
    fn service(&self) -> Service {
        Service::Spotify
    }

    /// Pages through the playlist in fixed windows. The first response carries
    /// the total, which fixes the number of further requests.
    async fn fetch(&self, playlist_id: &PlaylistId) -> Result<Vec<NormalizedTrack>> {
        let page_size = self.limits.spotify_page_size.max(1);

        let first = self.api.playlist_page(playlist_id.as_str(), page_size, 0).await?;
        let total = first.total as usize;
        let pages = total.div_ceil(page_size as usize);

        info!(
            "Fetching Spotify playlist {} ({} tracks, {} pages)",
            playlist_id, total, pages
        );

        let mut tracks: Vec<NormalizedTrack> = Vec::with_capacity(total);
        tracks.extend(first.tracks.iter().map(normalize::track_query));

        for page in 1..pages {
            let offset = page as u32 * page_size;
            let next = self.api.playlist_page(playlist_id.as_str(), page_size, offset).await?;

            if next.returned == 0 {
                warn!(
                    "Spotify returned an empty page at offset {} of {}; stopping",
                    offset, total
                );
                break;
            }

            debug!("Fetched {} tracks at offset {}", next.tracks.len(), offset);
            tracks.extend(next.tracks.iter().map(normalize::track_query));
        }

        info!("Fetched {} tracks from playlist", tracks.len());
        Ok(tracks)
    }
}

#[async_trait]
impl<A: SpotifyApi> PlaylistSink for SpotifyService<A> {
    fn service(&self) -> Service {
        Service::Spotify
    }

    async fn search(&self, query: &NormalizedTrack) -> Result<Option<SearchHit>> {
        self.api.search_track(query.as_str()).await
    }

    /// One playlist; track IDs are added in batches of at most `spotify_add_batch`.
    async fn publish(&self, hits: &[SearchHit]) -> Result<Vec<String>> {
        let playlist_id = self
            .api
            .create_playlist(&self.playlist_title, DESCRIPTION)
            .await?;

        let track_ids: Vec<String> = hits.iter().map(|hit| hit.id.clone()).collect();
        let api = &self.api;
        let target = playlist_id.as_str();

        let flushed = batch::flush_in_batches(
            &track_ids,
            self.limits.spotify_add_batch,
            move |index, chunk| async move {
                debug!("Adding batch {} ({} tracks)", index + 1, chunk.len());
                api.add_tracks(target, chunk).await
            },
        )
        .await?;

        info!(
            "Added {} tracks to Spotify playlist {} in {} batches",
            track_ids.len(),
            playlist_id,
            flushed.len()
        );

        Ok(vec![playlist_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::playlist::SourceTrack;
    use crate::spotify::models::TrackPage;
    use std::sync::Mutex;

    /// In-memory Spotify account recording every call.
    #[derive(Default)]
    struct FakeSpotify {
        playlist: Vec<SourceTrack>,
        unknown: Vec<String>,
        page_requests: Mutex<Vec<(u32, u32)>>,
        created: Mutex<Vec<String>>,
        add_calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeSpotify {
        fn with_tracks(n: usize) -> Self {
            Self {
                playlist: (0..n)
                    .map(|i| SourceTrack::new(format!("Song {}", i), Some(format!("Artist {}", i).as_str())))
                    .collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SpotifyApi for FakeSpotify {
        async fn playlist_page(&self, _playlist_id: &str, limit: u32, offset: u32) -> Result<TrackPage> {
            self.page_requests.lock().unwrap().push((limit, offset));
            let tracks: Vec<SourceTrack> = self
                .playlist
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Ok(TrackPage {
                total: self.playlist.len() as u32,
                returned: tracks.len(),
                tracks,
            })
        }

        async fn search_track(&self, query: &str) -> Result<Option<SearchHit>> {
            if self.unknown.iter().any(|u| u == query) {
                return Ok(None);
            }
            Ok(Some(SearchHit {
                id: format!("id-{}", query),
                label: query.to_string(),
            }))
        }

        async fn create_playlist(&self, name: &str, _description: &str) -> Result<String> {
            let mut created = self.created.lock().unwrap();
            created.push(name.to_string());
            Ok(format!("playlist-{}", created.len()))
        }

        async fn add_tracks(&self, _playlist_id: &str, track_ids: &[String]) -> Result<()> {
            if track_ids.len() > 100 {
                return Err(AppError::Config("too many tracks in one request".into()));
            }
            self.add_calls.lock().unwrap().push(track_ids.to_vec());
            Ok(())
        }
    }

    fn service(api: FakeSpotify) -> SpotifyService<FakeSpotify> {
        SpotifyService::new(api, TransferLimits::default(), "Converted Playlist")
    }

    async fn fetch_len(n: usize) -> (Vec<NormalizedTrack>, Vec<(u32, u32)>) {
        let spotify = service(FakeSpotify::with_tracks(n));
        let tracks = spotify.fetch(&PlaylistId::new("p")).await.unwrap();
        let requests = spotify.api().page_requests.lock().unwrap().clone();
        (tracks, requests)
    }

    #[tokio::test]
    async fn test_fetch_small_playlists_return_every_track() {
        for n in [0, 1, 49, 50] {
            let (tracks, requests) = fetch_len(n).await;
            assert_eq!(tracks.len(), n, "playlist of {}", n);
            assert_eq!(requests, vec![(50, 0)], "playlist of {}", n);
        }
    }

    #[tokio::test]
    async fn test_fetch_pages_across_boundaries_exactly_once() {
        for n in [51, 100, 101, 120, 250] {
            let (tracks, requests) = fetch_len(n).await;

            let expected: Vec<NormalizedTrack> = (0..n)
                .map(|i| NormalizedTrack::new(format!("Song {} - Artist {}", i, i)))
                .collect();
            assert_eq!(tracks, expected, "playlist of {}", n);
            assert_eq!(requests.len(), n.div_ceil(50), "playlist of {}", n);
            assert!(requests.iter().enumerate().all(|(i, r)| *r == (50, i as u32 * 50)));
        }
    }

    #[tokio::test]
    async fn test_fetch_stops_when_playlist_shrinks() {
        struct Shrinking;

        #[async_trait]
        impl SpotifyApi for Shrinking {
            async fn playlist_page(&self, _: &str, _: u32, offset: u32) -> Result<TrackPage> {
                // claims 120 tracks but only the first page has any
                let tracks: Vec<SourceTrack> = if offset == 0 {
                    (0..50).map(|i| SourceTrack::new(format!("t{}", i), None)).collect()
                } else {
                    Vec::new()
                };
                Ok(TrackPage {
                    total: 120,
                    returned: tracks.len(),
                    tracks,
                })
            }
            async fn search_track(&self, _: &str) -> Result<Option<SearchHit>> {
                Ok(None)
            }
            async fn create_playlist(&self, _: &str, _: &str) -> Result<String> {
                Ok(String::new())
            }
            async fn add_tracks(&self, _: &str, _: &[String]) -> Result<()> {
                Ok(())
            }
        }

        let spotify = SpotifyService::new(Shrinking, TransferLimits::default(), "x");
        let tracks = spotify.fetch(&PlaylistId::new("p")).await.unwrap();
        assert_eq!(tracks.len(), 50);
    }

    #[tokio::test]
    async fn test_fetch_continues_past_page_of_unavailable_items() {
        struct GappedPlaylist;

        #[async_trait]
        impl SpotifyApi for GappedPlaylist {
            async fn playlist_page(&self, _: &str, _: u32, offset: u32) -> Result<TrackPage> {
                // second window holds 50 removed tracks the API still lists
                let (returned, tracks): (usize, Vec<SourceTrack>) = match offset {
                    0 => (50, (0..50).map(|i| SourceTrack::new(format!("a{}", i), None)).collect()),
                    50 => (50, Vec::new()),
                    _ => (20, (0..20).map(|i| SourceTrack::new(format!("c{}", i), None)).collect()),
                };
                Ok(TrackPage {
                    total: 120,
                    returned,
                    tracks,
                })
            }
            async fn search_track(&self, _: &str) -> Result<Option<SearchHit>> {
                Ok(None)
            }
            async fn create_playlist(&self, _: &str, _: &str) -> Result<String> {
                Ok(String::new())
            }
            async fn add_tracks(&self, _: &str, _: &[String]) -> Result<()> {
                Ok(())
            }
        }

        let spotify = SpotifyService::new(GappedPlaylist, TransferLimits::default(), "x");
        let tracks = spotify.fetch(&PlaylistId::new("p")).await.unwrap();

        assert_eq!(tracks.len(), 70);
        assert_eq!(tracks[50], NormalizedTrack::new("c0"));
    }

    #[tokio::test]
    async fn test_publish_flushes_every_hundred() {
        let spotify = service(FakeSpotify::default());
        let hits: Vec<SearchHit> = (0..120)
            .map(|i| SearchHit {
                id: format!("t{}", i),
                label: String::new(),
            })
            .collect();

        let ids = spotify.publish(&hits).await.unwrap();

        assert_eq!(ids, vec!["playlist-1"]);
        let calls = spotify.api().add_calls.lock().unwrap();
        assert_eq!(calls.iter().map(Vec::len).collect::<Vec<_>>(), vec![100, 20]);
        assert_eq!(calls.concat(), hits.iter().map(|h| h.id.clone()).collect::<Vec<_>>());
        assert_eq!(*spotify.api().created.lock().unwrap(), vec!["Converted Playlist"]);
    }

    #[tokio::test]
    async fn test_create_skips_unmatched_track() {
        let mut api = FakeSpotify::default();
        api.unknown.push("b".into());
        let spotify = service(api);
        let tracks = vec![
            NormalizedTrack::new("a"),
            NormalizedTrack::new("b"),
            NormalizedTrack::new("c"),
        ];

        let outcome = spotify.create(&tracks).await.unwrap();

        assert_eq!(outcome.matches.skipped, vec![NormalizedTrack::new("b")]);
        let calls = spotify.api().add_calls.lock().unwrap();
        assert_eq!(*calls, vec![vec!["id-a".to_string(), "id-c".to_string()]]);
    }
}
