use crate::playlist::{NormalizedTrack, SourceTrack};

/// Qualifiers stripped from video titles before searching. Matched as plain
/// lower-case substrings.
pub const NOISE_PHRASES: &[&str] = &[
    "[official music video]",
    "[official lyric video]",
    "[official video]",
    "[official audio]",
    "[audio]",
    "[video]",
    "[animated music video]",
    "(official music video)",
    "(official lyric video)",
    "(official video)",
    "(official audio)",
    "(audio)",
    "(video)",
    "(animated music video)",
];

/// `"<title> - <artist>"`, or just the title when no artist is listed.
pub fn track_query(track: &SourceTrack) -> NormalizedTrack {
    match track.artist.as_deref().map(str::trim) {
        Some(artist) if !artist.is_empty() => {
            NormalizedTrack::new(format!("{} - {}", track.title, artist))
        }
        _ => NormalizedTrack::new(track.title.clone()),
    }
}

/// Lower-cases a video title and removes every known noise phrase.
///
/// Titles without a noise phrase come back lower-cased and otherwise untouched.
/// A title made only of noise keeps its lower-cased form so the result is never
/// empty for a non-empty title.
pub fn video_query(title: &str) -> NormalizedTrack {
    let lowered = title.to_lowercase();

    let mut cleaned = lowered.clone();
    for phrase in NOISE_PHRASES {
        if cleaned.contains(phrase) {
            cleaned = cleaned.replace(phrase, "");
        }
    }

    if cleaned == lowered {
        return NormalizedTrack::new(lowered);
    }

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        NormalizedTrack::new(lowered)
    } else {
        NormalizedTrack::new(collapsed)
    }
}
