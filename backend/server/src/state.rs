use std::sync::Arc;

use super::{
    config::Config,
    database::{Store, init_store},
    error::AppError,
};

pub struct State {
    pub config: Config,
    pub store: Store,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let store = init_store(&config)?;

        Ok(Arc::new(Self { config, store }))
    }

    pub fn with_store(config: Config, store: Store) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
