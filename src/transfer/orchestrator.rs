use colored::Colorize;
use tracing::info;

use crate::error::Result;
use crate::matcher::{self, MatchOutcome};
use crate::playlist::{PlaylistId, PlaylistSink, PlaylistSource};
use crate::transfer::report::TransferReport;

/// Copies one playlist from a source service to a destination service.
pub struct PlaylistTransfer<'a> {
    source: &'a dyn PlaylistSource,
    sink: &'a dyn PlaylistSink,
}

impl<'a> PlaylistTransfer<'a> {
    pub fn new(source: &'a dyn PlaylistSource, sink: &'a dyn PlaylistSink) -> Self {
        Self { source, sink }
    }

    /// Fetches the whole source playlist, matches every track on the destination and,
    /// unless `dry_run`, creates the destination playlist(s) from the matches.
    ///
    /// Tracks without a match are skipped and reported. Fetch, create and add
    /// failures abort the run.
    pub async fn run(&self, playlist_id: &PlaylistId, dry_run: bool) -> Result<TransferReport> {
        info!(
            "Transferring playlist {} from {} to {} (dry_run={})",
            playlist_id,
            self.source.service(),
            self.sink.service(),
            dry_run
        );

        let tracks = self.source.fetch(playlist_id).await?;
        let mut report = TransferReport::new(
            self.source.service(),
            self.sink.service(),
            tracks.len(),
            dry_run,
        );

        let matches = if dry_run {
            matcher::match_tracks(self.sink, &tracks).await
        } else {
            let outcome = self.sink.create(&tracks).await?;
            report.playlist_ids = outcome.playlist_ids;
            outcome.matches
        };

        record_matches(&mut report, matches);

        info!(
            "Playlist transfer completed: {}/{} tracks matched ({:.1}% success rate)",
            report.successful_matches, report.total_tracks, report.success_rate
        );

        Ok(report)
    }
}

fn record_matches(report: &mut TransferReport, matches: MatchOutcome) {
    report.successful_matches = matches.matched.len();
    report.failed_matches = matches.skipped.len();
    report.low_confidence = matches.low_confidence();
    report.skipped_tracks = matches.skipped;
    report.calculate_success_rate();
}

pub fn print_summary(report: &TransferReport) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", "TRANSFER SUMMARY".bold());
    println!("{}", "=".repeat(60));
    println!("From {} to {}", report.source, report.destination);
    println!("Total tracks processed: {}", report.total_tracks);
    println!(
        "Successfully matched: {}",
        report.successful_matches.to_string().green()
    );
    println!("Failed to match: {}", report.failed_matches.to_string().red());

    let rate = format!("{:.1}%", report.success_rate);
    let rate = if report.success_rate >= 90.0 {
        rate.green()
    } else if report.success_rate >= 70.0 {
        rate.yellow()
    } else {
        rate.red()
    };
    println!("Success rate: {}", rate);
    println!("{}", "=".repeat(60));

    if report.low_confidence > 0 {
        println!(
            "\n{}",
            format!(
                "{} matches look unlike the original title; check them by hand.",
                report.low_confidence
            )
            .yellow()
        );
    }

    if !report.skipped_tracks.is_empty() {
        println!("\nTracks not found on {}:", report.destination);
        for track in &report.skipped_tracks {
            println!("  - {}", track);
        }
    }

    if report.dry_run {
        println!("\n{}", "Dry run completed - no playlists were created".yellow());
    } else if report.playlist_ids.is_empty() {
        println!("\n{}", "Nothing matched - no playlist was created".yellow());
    } else {
        println!("\nCreated {} playlist(s):", report.destination);
        for id in &report.playlist_ids {
            println!("  {}", id.cyan());
        }
    }
}
