use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::history::HistoryStore;
use crate::core::llm::LlmRelay;
use crate::core::zego::{AgentService, ZegoClient};
use crate::core::zego::agent::AgentRegistration;
use crate::errors::app_error::{AppError, AppResult};

/// State shared by every handler
pub struct AppState {
    pub config: ServerConfig,
    /// `None` when ZEGO credentials are not configured
    pub agent: Option<AgentService>,
    pub relay: LlmRelay,
    pub history: HistoryStore,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> AppResult<Arc<Self>> {
        let agent = match ZegoClient::from_config(&config) {
            Some(client) => {
                info!(
                    app_id = client.app_id(),
                    base_url = %client.base_url(),
                    agent_id = %config.agent.id,
                    "ZEGO agent service configured"
                );
                Some(AgentService::new(
                    client,
                    AgentRegistration::from_config(&config),
                ))
            }
            None => {
                warn!("ZEGO credentials not configured, agent endpoints will fail");
                None
            }
        };

        let relay = LlmRelay::from_config(&config)?;
        if config.llm_api_key.is_none() {
            warn!("LLM API key not configured, relayed requests are sent without credentials");
        }

        let history = HistoryStore::from_config(&config).await?;

        Ok(Arc::new(Self {
            config,
            agent,
            relay,
            history,
            started_at: Instant::now(),
        }))
    }

    /// The agent service, or the "not configured" error handlers return
    pub fn agent(&self) -> AppResult<&AgentService> {
        self.agent.as_ref().ok_or_else(AppError::zego_not_configured)
    }
}
