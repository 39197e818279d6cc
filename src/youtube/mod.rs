pub mod auth;
pub mod client;
pub mod models;
pub mod playlist;

pub use client::{YouTubeApi, YouTubeClient};
pub use models::ItemPage;
pub use playlist::YouTubeService;
