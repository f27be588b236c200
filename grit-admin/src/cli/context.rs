//! Shared state built once per invocation

use anyhow::{Context, Result, bail};
use log::debug;
use std::sync::Arc;

use crate::api::{ApiClient, AuthManager, HttpTransport, ResourceCache};
use crate::config::{Config, Preferences, SessionFile};
use crate::page::{Notifier, ResourceService, TerminalNotifier};
use crate::resource::{ResourceDefinition, ResourceRegistry};

pub struct AppContext {
    pub config: Config,
    pub registry: ResourceRegistry,
    pub client: ApiClient,
    pub cache: Arc<ResourceCache>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let registry = ResourceRegistry::with_directory(&config.resources_dir())?
            .with_default_page_size(config.default_page_size);
        let transport = HttpTransport::new(&config.api_url, config.timeout())
            .context("Failed to build HTTP client")?;
        let store = Arc::new(SessionFile::new(config.session_path(), config.is_secure()));
        let client = ApiClient::new(Arc::new(transport), Arc::new(AuthManager::new(store)));
        debug!("Using API at {}", config.api_url);

        Ok(Self {
            config,
            registry,
            client,
            cache: Arc::new(ResourceCache::new()),
            notifier: Arc::new(TerminalNotifier),
        })
    }

    pub fn resource(&self, slug: &str) -> Result<&ResourceDefinition> {
        self.registry.require(slug)
    }

    pub fn service<'a>(&self, resource: &'a ResourceDefinition) -> ResourceService<'a> {
        ResourceService::new(
            resource,
            self.client.clone(),
            self.cache.clone(),
            self.notifier.clone(),
        )
    }

    pub fn preferences(&self) -> Result<Preferences> {
        Preferences::load(self.config.preferences_path())
    }

    pub fn require_login(&self) -> Result<()> {
        if !self.client.auth().is_authenticated() {
            bail!("Not signed in. Run 'grit-admin auth login' first.");
        }
        Ok(())
    }
}
