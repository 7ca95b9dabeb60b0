use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::{DynamoMealStore, MealStore, MemoryMealStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn MealStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(DynamoMealStore::new(&config).await?) as Arc<dyn MealStore>;
        Ok(Self { config, store })
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn MealStore>) -> Self {
        Self { config, store }
    }

    /// In-memory state for tests; no network access.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            aws_region: "us-east-1".into(),
            dynamodb_table: "kbju_meals_test".into(),
            environment: "test".into(),
            dynamodb_endpoint: None,
        });
        let store = Arc::new(MemoryMealStore::default()) as Arc<dyn MealStore>;
        Self { config, store }
    }
}
