use rspotify::model::{FullTrack, PlayableItem};

use crate::playlist::{SearchHit, SourceTrack};

/// One window of a playlist's tracks plus the playlist's total length.
#[derive(Debug, Clone, Default)]
pub struct TrackPage {
    pub total: u32,
    /// Items the API returned for this window, including unavailable ones
    /// that were dropped from `tracks`.
    pub returned: usize,
    pub tracks: Vec<SourceTrack>,
}

pub(crate) fn source_track(item: &PlayableItem) -> Option<SourceTrack> {
    match item {
        PlayableItem::Track(track) => Some(SourceTrack::new(
            track.name.clone(),
            track.artists.first().map(|a| a.name.as_str()),
        )),
        PlayableItem::Episode(episode) => Some(SourceTrack::new(
            episode.name.clone(),
            Some(episode.show.publisher.as_str()),
        )),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Tracks without an ID (local files) cannot be added to a playlist.
pub(crate) fn search_hit(track: &FullTrack) -> Option<SearchHit> {
    use rspotify::prelude::Id;

    let id = track.id.as_ref()?;
    let artists = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Some(SearchHit {
        id: id.id().to_string(),
        label: if artists.is_empty() {
            track.name.clone()
        } else {
            format!("{} - {}", track.name, artists)
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn artist(name: &str) -> Value {
        json!({"external_urls": {}, "href": null, "id": null, "name": name})
    }

    fn track_json(id: Option<&str>, name: &str, artists: &[&str]) -> Value {
        json!({
            "album": {
                "album_type": "album",
                "artists": [],
                "external_urls": {},
                "href": null,
                "id": null,
                "images": [],
                "name": "Album"
            },
            "artists": artists.iter().map(|a| artist(a)).collect::<Vec<_>>(),
            "disc_number": 1,
            "duration_ms": 215000,
            "explicit": false,
            "external_ids": {},
            "external_urls": {},
            "href": null,
            "id": id,
            "is_local": id.is_none(),
            "name": name,
            "popularity": 50,
            "preview_url": null,
            "track_number": 3
        })
    }

    #[test]
    fn test_source_track_uses_first_artist() {
        let item: PlayableItem = serde_json::from_value(track_json(
            Some("4uLU6hMCjMI75M1A2tKUQC"),
            "Under Pressure",
            &["Queen", "David Bowie"],
        ))
        .unwrap();

        let track = source_track(&item).unwrap();

        assert_eq!(track, SourceTrack::new("Under Pressure", Some("Queen")));
    }

    #[test]
    fn test_source_track_without_artists() {
        let item: PlayableItem =
            serde_json::from_value(track_json(Some("4uLU6hMCjMI75M1A2tKUQC"), "Untitled", &[])).unwrap();

        assert_eq!(source_track(&item), Some(SourceTrack::new("Untitled", None)));
    }

    #[test]
    fn test_search_hit_labels_all_artists() {
        let track: FullTrack = serde_json::from_value(track_json(
            Some("4uLU6hMCjMI75M1A2tKUQC"),
            "Under Pressure",
            &["Queen", "David Bowie"],
        ))
        .unwrap();

        assert_eq!(
            search_hit(&track),
            Some(SearchHit {
                id: "4uLU6hMCjMI75M1A2tKUQC".into(),
                label: "Under Pressure - Queen, David Bowie".into(),
            })
        );
    }

    #[test]
    fn test_local_file_is_not_a_hit() {
        let track: FullTrack =
            serde_json::from_value(track_json(None, "demo.mp3", &["Me"])).unwrap();

        assert_eq!(search_hit(&track), None);
    }
}
