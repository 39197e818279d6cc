use indicatif::{ProgressBar, ProgressStyle};
use strsim::jaro_winkler;
use tracing::{debug, warn};

use crate::playlist::{NormalizedTrack, PlaylistSink, SearchHit};

const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Similarity between the search text and the hit the destination returned.
/// Case-insensitive Jaro-Winkler in `[0, 1]`.
pub fn similarity(query: &str, label: &str) -> f64 {
    jaro_winkler(&query.to_lowercase(), &label.to_lowercase())
}

/// Check if a similarity score is high enough to trust the first search hit
pub fn is_confident(score: f64) -> bool {
    score >= CONFIDENCE_THRESHOLD
}

#[derive(Debug, Clone)]
pub struct TrackMatch {
    pub query: NormalizedTrack,
    pub hit: SearchHit,
    pub score: f64,
}

#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// Matches in source order.
    pub matched: Vec<TrackMatch>,
    /// Tracks the destination returned nothing for, in source order.
    pub skipped: Vec<NormalizedTrack>,
}

impl MatchOutcome {
    pub fn hits(&self) -> Vec<SearchHit> {
        self.matched.iter().map(|m| m.hit.clone()).collect()
    }

    pub fn low_confidence(&self) -> usize {
        self.matched.iter().filter(|m| !is_confident(m.score)).count()
    }

    pub fn attempted(&self) -> usize {
        self.matched.len() + self.skipped.len()
    }
}

/// Searches the destination for every track, one request at a time.
///
/// A track with no result, or whose search call fails, is skipped and recorded;
/// it never aborts the run.
pub async fn match_tracks<S>(sink: &S, tracks: &[NormalizedTrack]) -> MatchOutcome
where
    S: PlaylistSink + ?Sized,
{
    let mut outcome = MatchOutcome::default();

    let pb = ProgressBar::new(tracks.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for track in tracks {
        pb.set_message(track.to_string());

        match sink.search(track).await {
            Ok(Some(hit)) => {
                let score = similarity(track.as_str(), &hit.label);
                debug!("Matched {} -> {} ({:.2})", track, hit.label, score);
                outcome.matched.push(TrackMatch {
                    query: track.clone(),
                    hit,
                    score,
                });
            }
            Ok(None) => {
                warn!("{}: not found on {}", track, sink.service());
                outcome.skipped.push(track.clone());
            }
            Err(e) => {
                warn!("{}: search on {} failed: {}", track, sink.service(), e);
                outcome.skipped.push(track.clone());
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    outcome
}
