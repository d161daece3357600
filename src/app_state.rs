use std::sync::Arc;

use crate::{
    config::Config,
    controllers::{Confirmation, ResultsCatalogController, UserDirectoryController},
    errors::AppResult,
    logging,
    repositories::{
        CredentialRepository, InMemoryKeyValueStore, JsonFileKeyValueStore, KeyValueStore,
        ResultsCacheRepository,
    },
    services::{CertificateService, DocumentRenderer, HttpAccountApi},
};

/// Wiring for a host shell: one store shared by the credential and results
/// repositories, and both controllers built over it.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<UserDirectoryController>,
    pub catalog: Arc<ResultsCatalogController>,
    pub cache: ResultsCacheRepository,
    pub credentials: CredentialRepository,
    pub config: Arc<Config>,
}

impl AppState {
    /// Installs logging, then opens the file store at `STORAGE_PATH` or keeps
    /// everything in memory when none is configured.
    pub async fn new(
        config: Config,
        confirmation: Arc<dyn Confirmation>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> AppResult<Self> {
        logging::init(&config);

        let store: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(JsonFileKeyValueStore::open(path.clone()).await?),
            None => {
                log::warn!("STORAGE_PATH not set, credentials and results will not persist");
                Arc::new(InMemoryKeyValueStore::new())
            }
        };
        Self::with_store(config, store, confirmation, renderer)
    }

    pub fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        confirmation: Arc<dyn Confirmation>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> AppResult<Self> {
        let credentials = CredentialRepository::new(Arc::clone(&store));
        let cache = ResultsCacheRepository::new(store, &config);

        let account_api = Arc::new(HttpAccountApi::new(&config)?);
        let directory = Arc::new(UserDirectoryController::new(
            account_api,
            credentials.clone(),
            confirmation,
        ));

        let catalog = Arc::new(ResultsCatalogController::new(
            cache.clone(),
            CertificateService::new(renderer),
            &config,
        ));

        Ok(Self {
            directory,
            catalog,
            cache,
            credentials,
            config: Arc::new(config),
        })
    }
}
