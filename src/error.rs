use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spotify API error: {0}")]
    SpotifyApi(#[from] rspotify::ClientError),

    #[error("YouTube API error: {0}")]
    YouTubeApi(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Not a {service} playlist link: {input}")]
    InvalidPlaylistUrl { service: String, input: String },

    #[error("Gave up after {0} invalid attempts")]
    TooManyAttempts(usize),
}

pub type Result<T> = std::result::Result<T, AppError>;
