pub mod api;
pub mod collectibles;
pub mod config;
pub mod lookup;
pub mod metrics;
pub mod render;
pub mod server;

pub use config::{Config, ConfigError};
pub use metrics::Metrics;

/// Everything a lookup needs, shared between all requests.
pub struct App {
    pub config: Config,
    pub client: api::Client,
    pub metrics: Metrics,
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Creating HTTP client: {0}")]
    Client(#[from] api::ApiError),
    #[error("Registering metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl App {
    pub fn new(config: Config, registry: prometheus::Registry) -> Result<Self, SetupError> {
        config.validate()?;

        let client = api::Client::new(&config)?;
        let metrics = Metrics::new(registry)?;

        Ok(Self {
            config,
            client,
            metrics,
        })
    }
}
