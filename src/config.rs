use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::CredentialStore;
use crate::error::{AppError, Result};
use crate::service::Service;

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const DEFAULT_PLAYLIST_TITLE: &str = "Converted Playlist";
pub const DEFAULT_MAX_PROMPT_ATTEMPTS: usize = 5;

/// How the authorization code is captured when no cached token is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Open the browser and capture the redirect on a local listener.
    #[default]
    Loopback,
    /// Print the authorization URL and read the code (or redirected URL) from stdin.
    Prompt,
}

/// Per-request and per-playlist caps imposed by the providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLimits {
    /// Tracks requested per Spotify playlist page.
    pub spotify_page_size: u32,
    /// Track IDs sent per Spotify "add items" call.
    pub spotify_add_batch: usize,
    /// Videos placed in one YouTube playlist before rolling over to a new one.
    pub youtube_playlist_capacity: usize,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            spotify_page_size: 50,
            spotify_add_batch: 100,
            youtube_playlist_capacity: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
}

impl Default for OAuthClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            auth_uri: None,
            token_uri: None,
        }
    }
}

impl OAuthClientConfig {
    /// Reads `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET` and `<PREFIX>_REDIRECT_URI`,
    /// layered over an optional client secrets file.
    fn from_env(prefix: &str, default_secrets_file: &str) -> Result<Self> {
        let secrets_file = std::env::var(format!("{}_CLIENT_SECRET_FILE", prefix))
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                let path = PathBuf::from(default_secrets_file);
                path.exists().then_some(path)
            });

        let mut client = match secrets_file {
            Some(path) => Self::from_secrets_file(&path)?,
            None => Self::default(),
        };

        if let Ok(client_id) = std::env::var(format!("{}_CLIENT_ID", prefix)) {
            client.client_id = client_id;
        }
        if let Ok(client_secret) = std::env::var(format!("{}_CLIENT_SECRET", prefix)) {
            client.client_secret = client_secret;
        }
        if let Ok(redirect_uri) = std::env::var(format!("{}_REDIRECT_URI", prefix)) {
            client.redirect_uri = redirect_uri;
        }

        Ok(client)
    }

    pub fn from_secrets_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|e| {
            AppError::Config(format!("Unable to read {}: {}", path.display(), e))
        })?;
        Self::from_secrets_json(&raw)
    }

    /// Parses a client secrets document with a `web` or `installed` section,
    /// as downloaded from the provider's developer console.
    pub fn from_secrets_json(raw: &[u8]) -> Result<Self> {
        #[derive(Deserialize)]
        struct Section {
            client_id: String,
            client_secret: String,
            #[serde(default)]
            redirect_uris: Vec<String>,
            auth_uri: Option<String>,
            token_uri: Option<String>,
        }

        #[derive(Deserialize)]
        struct Document {
            web: Option<Section>,
            installed: Option<Section>,
        }

        let document: Document = serde_json::from_slice(raw)?;
        let section = document
            .web
            .or(document.installed)
            .ok_or_else(|| AppError::Config("No credentials found in client secrets".into()))?;

        let redirect_uri = section
            .redirect_uris
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            redirect_uri,
            auth_uri: section.auth_uri,
            token_uri: section.token_uri,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify: OAuthClientConfig,
    pub youtube: OAuthClientConfig,
    pub credentials_dir: PathBuf,
    pub auth_mode: AuthMode,
    pub limits: TransferLimits,
    pub playlist_title: String,
    pub max_prompt_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spotify: OAuthClientConfig::default(),
            youtube: OAuthClientConfig::default(),
            credentials_dir: CredentialStore::default_dir(),
            auth_mode: AuthMode::default(),
            limits: TransferLimits::default(),
            playlist_title: DEFAULT_PLAYLIST_TITLE.to_string(),
            max_prompt_attempts: DEFAULT_MAX_PROMPT_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let spotify = OAuthClientConfig::from_env("SPOTIFY", "spotifyClientSecret.json")?;
        let youtube = OAuthClientConfig::from_env("YOUTUBE", "googleClientSecret.json")?;

        let credentials_dir = std::env::var("CREDENTIALS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| CredentialStore::default_dir());

        let playlist_title = std::env::var("PLAYLIST_TITLE")
            .unwrap_or_else(|_| DEFAULT_PLAYLIST_TITLE.to_string());

        let max_prompt_attempts = match std::env::var("MAX_PROMPT_ATTEMPTS") {
            Ok(raw) => parse_attempts(&raw)?,
            Err(_) => DEFAULT_MAX_PROMPT_ATTEMPTS,
        };

        Ok(Self {
            spotify,
            youtube,
            credentials_dir,
            playlist_title,
            max_prompt_attempts,
            ..Default::default()
        })
    }

    pub fn client(&self, service: Service) -> &OAuthClientConfig {
        match service {
            Service::Spotify => &self.spotify,
            Service::YouTube => &self.youtube,
        }
    }

    /// Names of the settings that still need a value before `service` can be used.
    pub fn missing_for(&self, service: Service) -> Vec<String> {
        let client = self.client(service);
        let prefix = service.credential_key().to_uppercase();
        let mut missing = Vec::new();

        if client.client_id.is_empty() {
            missing.push(format!("{}_CLIENT_ID", prefix));
        }
        if client.client_secret.is_empty() {
            missing.push(format!("{}_CLIENT_SECRET", prefix));
        }

        missing
    }
}

fn parse_attempts(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::Config(format!(
            "MAX_PROMPT_ATTEMPTS must be a positive integer, got {:?}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = TransferLimits::default();
        assert_eq!(limits.spotify_page_size, 50);
        assert_eq!(limits.spotify_add_batch, 100);
        assert_eq!(limits.youtube_playlist_capacity, 200);
    }

    #[test]
    fn test_parse_installed_client_secrets() {
        let raw = br#"{
            "installed": {
                "client_id": "abc.apps.googleusercontent.com",
                "client_secret": "shh",
                "redirect_uris": ["http://localhost:8080"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let client = OAuthClientConfig::from_secrets_json(raw).unwrap();
        assert_eq!(client.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(client.client_secret, "shh");
        assert_eq!(client.redirect_uri, "http://localhost:8080");
        assert_eq!(
            client.token_uri.as_deref(),
            Some("https://oauth2.googleapis.com/token")
        );
    }

    #[test]
    fn test_web_section_without_redirects_uses_default() {
        let raw = br#"{"web": {"client_id": "id", "client_secret": "secret"}}"#;
        let client = OAuthClientConfig::from_secrets_json(raw).unwrap();
        assert_eq!(client.redirect_uri, DEFAULT_REDIRECT_URI);
    }

    #[test]
    fn test_secrets_without_section_rejected() {
        let raw = br#"{"other": {}}"#;
        assert!(matches!(
            OAuthClientConfig::from_secrets_json(raw),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_for_only_checks_requested_service() {
        let config = Config {
            spotify: OAuthClientConfig {
                client_id: "id".into(),
                client_secret: "secret".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(config.missing_for(Service::Spotify).is_empty());
        assert_eq!(
            config.missing_for(Service::YouTube),
            vec!["YOUTUBE_CLIENT_ID", "YOUTUBE_CLIENT_SECRET"]
        );
    }

    #[test]
    fn test_parse_attempts() {
        assert_eq!(parse_attempts("3").unwrap(), 3);
        assert!(parse_attempts("0").is_err());
        assert!(parse_attempts("many").is_err());
    }
}
