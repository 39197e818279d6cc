use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::playlist::PlaylistId;
use crate::prompt::Prompter;
use crate::service::Service;

// Spotify playlist IDs are 22 base62 characters.
static SPOTIFY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:open\.spotify\.com/(?:intl-[a-z]{2}/)?playlist/|spotify:playlist:)([A-Za-z0-9]{22})(?:[?&#/\s]|$)",
    )
    .expect("valid Spotify link pattern")
});

static SPOTIFY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{22}$").expect("valid Spotify id pattern"));

// YouTube playlist IDs handled here are 34 characters ("PL" + 32).
static YOUTUBE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"youtube\.com/(?:playlist|watch)\?(?:[^#\s]*&)?list=([A-Za-z0-9_-]{34})(?:[&#\s]|$)",
    )
    .expect("valid YouTube link pattern")
});

static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{34}$").expect("valid YouTube id pattern"));

/// Extracts the playlist ID from a pasted link or bare ID.
///
/// Supports:
/// - https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=...
/// - spotify:playlist:37i9dQZF1DXcBWIGoYBM5M
/// - https://www.youtube.com/playlist?list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI
/// - https://www.youtube.com/watch?v=...&list=PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI
/// - the bare ID for either service
pub fn extract_playlist_id(service: Service, input: &str) -> Result<PlaylistId> {
    let input = input.trim();

    let (link, bare) = match service {
        Service::Spotify => (&*SPOTIFY_LINK, &*SPOTIFY_ID),
        Service::YouTube => (&*YOUTUBE_LINK, &*YOUTUBE_ID),
    };

    if bare.is_match(input) {
        return Ok(PlaylistId::new(input));
    }

    link.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|id| PlaylistId::new(id.as_str()))
        .ok_or_else(|| AppError::InvalidPlaylistUrl {
            service: service.to_string(),
            input: input.to_string(),
        })
}

/// Asks for a playlist link until one parses, at most `max_attempts` times.
pub fn prompt_playlist_id<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    service: Service,
    max_attempts: usize,
) -> Result<PlaylistId> {
    for attempt in 1..=max_attempts {
        let answer = prompter.ask(&format!(
            "Please input a link to your {} playlist or the playlist ID",
            service
        ))?;

        match extract_playlist_id(service, &answer) {
            Ok(id) => return Ok(id),
            Err(e) => {
                debug!("Rejected playlist link (attempt {}/{}): {}", attempt, max_attempts, e);
                prompter.say(&e.to_string())?;
            }
        }
    }

    Err(AppError::TooManyAttempts(max_attempts))
}
