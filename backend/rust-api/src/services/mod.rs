use std::{sync::Arc, time::Instant};

use crate::config::Config;
use mongodb::Client as MongoClient;

use self::{
    function_registry::FunctionRegistry,
    user_count_service::ActiveUserCounter,
    user_store::{MongoUserStore, UserStore},
};

pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub registry: FunctionRegistry,
    pub start_time: Instant,
}

impl AppState {
    pub async fn new(config: Config, mongo_client: MongoClient) -> anyhow::Result<Self> {
        let mongo = mongo_client.database(&config.mongo_database);
        let store = MongoUserStore::new(mongo, config.users_collection.clone());

        tracing::info!("Checking MongoDB connectivity...");
        tokio::time::timeout(std::time::Duration::from_secs(5), store.ping())
            .await
            .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;
        tracing::info!("MongoDB connection established successfully");

        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Builds state around an already constructed store.
    pub fn with_store(config: Config, users: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            users,
            registry: FunctionRegistry::new(),
            start_time: Instant::now(),
        }
    }

    pub fn user_counter(&self) -> ActiveUserCounter {
        ActiveUserCounter::new(self.users.clone())
    }
}

pub mod function_registry;
pub mod user_count_service;
pub mod user_store;
