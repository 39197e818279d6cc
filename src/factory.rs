use tracing::debug;

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::playlist::{PlaylistSink, PlaylistSource};
use crate::service::Service;
use crate::spotify::{RspotifyApi, SpotifyService};
use crate::youtube::{YouTubeClient, YouTubeService};

/// Builds authenticated service clients from configuration and cached credentials.
pub struct ClientFactory {
    config: Config,
    store: CredentialStore,
}

impl ClientFactory {
    pub fn new(config: Config) -> Self {
        let store = CredentialStore::new(config.credentials_dir.clone());
        Self { config, store }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn ensure_configured(&self, service: Service) -> Result<()> {
        let missing = self.config.missing_for(service);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "{} is not configured, missing: {}",
                service,
                missing.join(", ")
            )))
        }
    }

    pub async fn source(&self, service: Service) -> Result<Box<dyn PlaylistSource>> {
        self.ensure_configured(service)?;
        debug!("Connecting to {} as source", service);

        let source: Box<dyn PlaylistSource> = match service {
            Service::Spotify => Box::new(self.spotify().await?),
            Service::YouTube => Box::new(self.youtube().await?),
        };
        Ok(source)
    }

    pub async fn sink(&self, service: Service) -> Result<Box<dyn PlaylistSink>> {
        self.ensure_configured(service)?;
        debug!("Connecting to {} as destination", service);

        let sink: Box<dyn PlaylistSink> = match service {
            Service::Spotify => Box::new(self.spotify().await?),
            Service::YouTube => Box::new(self.youtube().await?),
        };
        Ok(sink)
    }

    async fn spotify(&self) -> Result<SpotifyService<RspotifyApi>> {
        let api = RspotifyApi::connect(&self.config.spotify, &self.store, self.config.auth_mode).await?;
        Ok(SpotifyService::new(
            api,
            self.config.limits,
            self.config.playlist_title.clone(),
        ))
    }

    async fn youtube(&self) -> Result<YouTubeService<YouTubeClient>> {
        let api = YouTubeClient::new(&self.config.youtube, &self.store, self.config.auth_mode).await?;
        Ok(YouTubeService::new(
            api,
            self.config.limits,
            self.config.playlist_title.clone(),
        ))
    }

    /// Deletes the cached tokens of `services`. Missing files are not an error.
    pub fn logout(&self, services: &[Service]) -> Result<()> {
        for &service in services {
            if !self.store.remove(service)? {
                debug!("No cached {} credentials to remove", service);
            }
        }
        Ok(())
    }
}
