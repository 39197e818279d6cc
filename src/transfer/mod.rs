pub mod orchestrator;
pub mod report;

pub use orchestrator::{PlaylistTransfer, print_summary};
pub use report::TransferReport;
