use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{Config, EngineSettings};
use crate::models::site::Hub;
use crate::observability::metrics::Metrics;
use crate::providers::nominatim::NominatimGeocoder;
use crate::providers::openrouteservice::{OpenRouteServiceClient, OpenRouteServiceConfig};
use crate::providers::{Geocoder, RoadGeometryProvider};
use crate::store::{
    demo, Datastore, InMemoryStore, SqliteStore, StoreError, UnavailableStore,
};

pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub road_geometry: Option<Arc<dyn RoadGeometryProvider>>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub settings: EngineSettings,
    pub metrics: Metrics,
}

impl AppState {
    /// State with no external providers and default engine settings.
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            store,
            road_geometry: None,
            geocoder: None,
            settings: EngineSettings::default(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_road_geometry(mut self, provider: Arc<dyn RoadGeometryProvider>) -> Self {
        self.road_geometry = Some(provider);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Wires the store and providers named by `config`.
    ///
    /// Nothing here is fatal. A configured database that cannot be opened is
    /// replaced by a store that reports itself unavailable, so the service
    /// runs degraded; providers that fail to build are left out.
    pub fn from_config(config: &Config) -> Self {
        let mut state = Self::new(open_store(config)).with_settings(config.engine.clone());

        match &config.routing_api_key {
            Some(api_key) => {
                let ors = OpenRouteServiceConfig::new(api_key.clone())
                    .with_base_url(config.routing_base_url.clone())
                    .with_timeout(config.engine.provider_timeout);
                match OpenRouteServiceClient::new(ors) {
                    Ok(client) => state = state.with_road_geometry(Arc::new(client)),
                    Err(err) => error!(error = %err, "road geometry provider disabled"),
                }
            }
            None => info!("ROUTING_API_KEY not set; routes use straight-line geometry"),
        }

        match &config.geocode_provider_url {
            Some(url) => match NominatimGeocoder::new(url.clone(), config.engine.provider_timeout) {
                Ok(geocoder) => state = state.with_geocoder(Arc::new(geocoder)),
                Err(err) => error!(error = %err, "geocoder disabled"),
            },
            None => info!(
                "GEOCODE_PROVIDER_URL not set; orders without coordinates use the default point"
            ),
        }

        state
    }

    /// Runs `call` against the store on the blocking thread pool.
    ///
    /// The SQLite backend does synchronous I/O behind a mutex, which must not
    /// stall the async workers.
    pub async fn store_call<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Datastore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || call(store.as_ref()))
            .await
            .map_err(|err| StoreError::Unavailable(format!("store task failed: {err}")))?
    }

    /// Depot used when the store has no hubs.
    pub fn fallback_depot(&self) -> Hub {
        Hub {
            id: 0,
            name: "Default Depot".to_string(),
            location: self.settings.default_point,
        }
    }
}

fn open_store(config: &Config) -> Arc<dyn Datastore> {
    let Some(url) = &config.database_url else {
        info!(seeded = config.seed_demo_data, "DATABASE_URL not set; using in-memory store");
        return Arc::new(in_memory(config.seed_demo_data));
    };

    let path = SqliteStore::path_from_url(url);
    match SqliteStore::open(path) {
        Ok(store) => {
            if config.seed_demo_data {
                if let Err(err) = store.seed_if_empty(&demo::dataset()) {
                    warn!(error = %err, "failed to seed sqlite store");
                }
            }
            info!(path, "sqlite store opened");
            Arc::new(store)
        }
        Err(err) => {
            error!(path, error = %err, "cannot open database; running degraded");
            Arc::new(UnavailableStore::new(format!("cannot open {path}: {err}")))
        }
    }
}

fn in_memory(seed: bool) -> InMemoryStore {
    if seed {
        InMemoryStore::seeded(demo::dataset())
    } else {
        InMemoryStore::new()
    }
}
