// lib.rs - Zuckky chat assistant: conversation core, simulated processing, and the HTTP/WebSocket server
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod gemini_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod presentation;
pub mod processing;
pub mod services;
pub mod utils;

use std::sync::Arc;

// Re-export commonly used types for convenience
pub use config::Config;
pub use conversation::Conversation;
pub use gateway::{Gateway, GatewayError};

// AppState holds the backend services and the gateway WebSocket sessions talk through
pub struct AppState {
    pub config: Config,
    pub responder: services::ChatResponder,
    pub uploads: services::UploadStore,
    pub gateway: Arc<dyn Gateway>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, GatewayError> {
        let gemini = config.gemini_api_key.clone().map(gemini_client::GeminiClient::new);
        let responder = services::ChatResponder::new(gemini);
        let uploads = services::UploadStore::new(config.upload_dir.clone());

        let gateway: Arc<dyn Gateway> = match &config.gateway_url {
            Some(url) => {
                tracing::info!("🔗 Sessions use remote backend at {}", url);
                Arc::new(gateway::HttpGateway::new(url.clone())?)
            }
            None => Arc::new(gateway::LocalGateway::new(responder.clone(), uploads.clone())),
        };

        Ok(Self {
            config,
            responder,
            uploads,
            gateway,
        })
    }

    /// Fresh conversation for one WebSocket connection
    pub fn conversation(&self, presenter: Arc<dyn presentation::Presenter>) -> Conversation {
        Conversation::new(self.gateway.clone(), presenter, self.config.simulator)
    }
}
