use crate::playlist::NormalizedTrack;
use crate::service::Service;

/// Outcome of one playlist transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub source: Service,
    pub destination: Service,
    pub total_tracks: usize,
    pub successful_matches: usize,
    pub failed_matches: usize,
    /// Matches whose hit looks unlike the query; kept, but worth a manual check.
    pub low_confidence: usize,
    pub success_rate: f64,
    pub skipped_tracks: Vec<NormalizedTrack>,
    pub playlist_ids: Vec<String>,
    pub dry_run: bool,
}

impl TransferReport {
    pub fn new(source: Service, destination: Service, total_tracks: usize, dry_run: bool) -> Self {
        Self {
            source,
            destination,
            total_tracks,
            successful_matches: 0,
            failed_matches: 0,
            low_confidence: 0,
            success_rate: 0.0,
            skipped_tracks: Vec::new(),
            playlist_ids: Vec::new(),
            dry_run,
        }
    }

    pub fn calculate_success_rate(&mut self) {
        if self.total_tracks > 0 {
            self.success_rate = (self.successful_matches as f64 / self.total_tracks as f64) * 100.0;
        }
    }
}
