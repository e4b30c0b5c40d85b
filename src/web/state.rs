use std::sync::Arc;

use crate::{Config, ai::Assistant, auth::TokenIssuer, model::ModelManager};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    config: Arc<Config>,
    issuer: TokenIssuer,
    assistant: Assistant,
}

impl AppState {
    pub fn new(mm: ModelManager, config: Arc<Config>, assistant: Assistant) -> Self {
        let issuer = TokenIssuer::from_config(config.app());
        Self {
            mm,
            config,
            issuer,
            assistant,
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }
}
