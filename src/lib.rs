pub mod auth;
pub mod batch;
pub mod config;
pub mod error;
pub mod factory;
pub mod flow;
pub mod matcher;
pub mod normalize;
pub mod parser;
pub mod playlist;
pub mod prompt;
pub mod service;
pub mod spotify;
pub mod transfer;
pub mod youtube;

pub use config::{AuthMode, Config, TransferLimits};
pub use error::{AppError, Result};
pub use factory::ClientFactory;
pub use playlist::{NormalizedTrack, PlaylistId, PlaylistSink, PlaylistSource, SearchHit, SourceTrack};
pub use prompt::Prompter;
pub use service::Service;
pub use transfer::{PlaylistTransfer, TransferReport};
