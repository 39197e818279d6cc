pub mod client;
pub mod models;
pub mod playlist;

pub use client::{RspotifyApi, SpotifyApi};
pub use models::TrackPage;
pub use playlist::SpotifyService;
