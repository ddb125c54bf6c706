//! Agent registration and instance lifecycle.
//!
//! An agent is registered once per process (lazily, before the first
//! instance is created). Each room gets its own agent instance whose RTC
//! user and stream ids are derived from the room id.

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::client::ZegoClient;
use super::messages::{
    ACTION_CREATE_AGENT_INSTANCE, ACTION_DELETE_AGENT_INSTANCE, ACTION_REGISTER_AGENT,
    ACTION_SEND_AGENT_INSTANCE_LLM, CreateAgentInstanceData, CreateAgentInstanceRequest,
    DeleteAgentInstanceRequest, LlmSettings, MessageHistory, RegisterAgentRequest, RtcInfo,
    SendAgentInstanceLlmRequest,
};
use super::{AGENT_ALREADY_EXISTS, ZegoError, ZegoResult};
use crate::config::ServerConfig;

/// Everything the vendor needs to register the agent
#[derive(Debug, Clone)]
pub struct AgentRegistration {
    pub agent_id: String,
    pub name: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub llm_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub tts: serde_json::Value,
    pub asr: Option<serde_json::Value>,
}

impl AgentRegistration {
    pub fn from_config(config: &ServerConfig) -> Self {
        // When the agent is pointed at the relay it must present the relay key
        let llm_api_key = match (&config.llm_agent_url, &config.llm_relay_api_key) {
            (Some(_), Some(relay_key)) => relay_key.clone(),
            _ => config.llm_api_key.clone().unwrap_or_default(),
        };

        Self {
            agent_id: config.agent.id.clone(),
            name: config.agent.name.clone(),
            system_prompt: config.agent.system_prompt.clone(),
            temperature: config.agent.temperature,
            top_p: config.agent.top_p,
            llm_url: config.llm_agent_url(),
            llm_api_key,
            llm_model: config.llm_model.clone(),
            tts: config.agent.tts.clone(),
            asr: config.agent.asr.clone(),
        }
    }

    fn to_request(&self) -> RegisterAgentRequest {
        RegisterAgentRequest {
            agent_id: self.agent_id.clone(),
            name: self.name.clone(),
            llm: LlmSettings {
                url: self.llm_url.clone(),
                api_key: self.llm_api_key.clone(),
                model: self.llm_model.clone(),
                system_prompt: self.system_prompt.clone(),
                temperature: self.temperature,
                top_p: self.top_p,
            },
            tts: self.tts.clone(),
            asr: self.asr.clone(),
        }
    }
}

/// An active agent instance bound to a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSession {
    pub agent_instance_id: String,
    pub agent_user_id: String,
    pub agent_stream_id: String,
    pub room_id: String,
    pub user_id: String,
}

/// RTC user id the agent joins `room_id` with
pub fn agent_user_id(room_id: &str) -> String {
    format!("agent_{room_id}")
}

/// Stream id the agent publishes its audio on in `room_id`
pub fn agent_stream_id(room_id: &str) -> String {
    format!("agent_stream_{room_id}")
}

/// Agent operations on top of the signed client
pub struct AgentService {
    client: ZegoClient,
    registration: AgentRegistration,
    registered: OnceCell<()>,
}

impl AgentService {
    pub fn new(client: ZegoClient, registration: AgentRegistration) -> Self {
        Self {
            client,
            registration,
            registered: OnceCell::new(),
        }
    }

    pub fn client(&self) -> &ZegoClient {
        &self.client
    }

    pub fn agent_id(&self) -> &str {
        &self.registration.agent_id
    }

    /// Whether registration has succeeded in this process
    pub fn is_registered(&self) -> bool {
        self.registered.initialized()
    }

    /// Register the agent unless that already happened
    ///
    /// Concurrent callers share one in-flight registration. A failed attempt
    /// leaves the cell empty so the next caller retries.
    pub async fn ensure_registered(&self) -> ZegoResult<()> {
        self.registered
            .get_or_try_init(|| self.register_agent())
            .await
            .map(|_| ())
    }

    /// Issue `RegisterAgent`; an already-registered agent counts as success
    pub async fn register_agent(&self) -> ZegoResult<()> {
        let request = self.registration.to_request();
        match self.client.call(ACTION_REGISTER_AGENT, &request).await {
            Ok(_) => {
                info!(agent_id = %self.registration.agent_id, "Agent registered");
                Ok(())
            }
            Err(ZegoError::Api { code, .. }) if code == AGENT_ALREADY_EXISTS => {
                info!(agent_id = %self.registration.agent_id, "Agent already registered");
                Ok(())
            }
            Err(e) => {
                warn!(agent_id = %self.registration.agent_id, error = %e, "Agent registration failed");
                Err(e)
            }
        }
    }

    /// Create an agent instance that joins `room_id` and listens to `user_stream_id`
    pub async fn create_instance(
        &self,
        room_id: &str,
        user_id: &str,
        user_stream_id: &str,
    ) -> ZegoResult<AgentSession> {
        self.ensure_registered().await?;

        let agent_user_id = agent_user_id(room_id);
        let agent_stream_id = agent_stream_id(room_id);

        let request = CreateAgentInstanceRequest {
            agent_id: self.registration.agent_id.clone(),
            user_id: user_id.to_string(),
            rtc: RtcInfo {
                room_id: room_id.to_string(),
                agent_stream_id: agent_stream_id.clone(),
                agent_user_id: agent_user_id.clone(),
                user_stream_id: user_stream_id.to_string(),
            },
            message_history: MessageHistory::default(),
        };

        let data = self
            .client
            .call(ACTION_CREATE_AGENT_INSTANCE, &request)
            .await?;
        let data: CreateAgentInstanceData = serde_json::from_value(data)
            .map_err(|e| ZegoError::InvalidResponse(format!("missing AgentInstanceId: {e}")))?;

        info!(
            room_id = %room_id,
            user_id = %user_id,
            agent_instance_id = %data.agent_instance_id,
            "Agent instance created"
        );

        Ok(AgentSession {
            agent_instance_id: data.agent_instance_id,
            agent_user_id,
            agent_stream_id,
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    /// Push a text turn into the instance's LLM conversation
    pub async fn send_message(&self, agent_instance_id: &str, text: &str) -> ZegoResult<()> {
        let request = SendAgentInstanceLlmRequest {
            agent_instance_id: agent_instance_id.to_string(),
            text: text.to_string(),
            add_question_to_history: true,
            add_answer_to_history: true,
        };
        self.client
            .call(ACTION_SEND_AGENT_INSTANCE_LLM, &request)
            .await?;
        info!(agent_instance_id = %agent_instance_id, chars = text.chars().count(), "Message sent to agent");
        Ok(())
    }

    /// Tear down an agent instance
    pub async fn delete_instance(&self, agent_instance_id: &str) -> ZegoResult<()> {
        let request = DeleteAgentInstanceRequest {
            agent_instance_id: agent_instance_id.to_string(),
        };
        self.client
            .call(ACTION_DELETE_AGENT_INSTANCE, &request)
            .await?;
        info!(agent_instance_id = %agent_instance_id, "Agent instance deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registration() -> AgentRegistration {
        AgentRegistration::from_config(&ServerConfig::default())
    }

    fn service(base_url: &str) -> AgentService {
        let client = ZegoClient::new(
            reqwest::Client::new(),
            base_url,
            1234567890,
            "0123456789abcdef0123456789abcdef",
        );
        AgentService::new(client, registration())
    }

    fn ok(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "Code": 0, "Message": "success", "Data": data }))
    }

    #[test]
    fn test_derived_ids() {
        assert_eq!(agent_user_id("room-1"), "agent_room-1");
        assert_eq!(agent_stream_id("room-1"), "agent_stream_room-1");
    }

    #[test]
    fn test_registration_uses_relay_key_when_pointed_at_relay() {
        let mut config = ServerConfig::default();
        config.llm_api_key = Some("upstream".to_string());
        assert_eq!(AgentRegistration::from_config(&config).llm_api_key, "upstream");

        config.llm_agent_url = Some("https://gw.example.com/api/chat/completions".to_string());
        config.llm_relay_api_key = Some("relay".to_string());
        let registration = AgentRegistration::from_config(&config);
        assert_eq!(registration.llm_api_key, "relay");
        assert_eq!(
            registration.llm_url,
            "https://gw.example.com/api/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_create_instance_registers_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("Action", "RegisterAgent"))
            .and(body_partial_json(json!({ "AgentId": "ai_agent_default" })))
            .respond_with(ok(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("Action", "CreateAgentInstance"))
            .and(body_partial_json(json!({
                "UserId": "alice",
                "RTC": { "RoomId": "room-1", "AgentUserId": "agent_room-1", "UserStreamId": "alice_main" }
            })))
            .respond_with(ok(json!({ "AgentInstanceId": "inst-1" })))
            .expect(2)
            .mount(&server)
            .await;

        let service = service(&server.uri());
        assert!(!service.is_registered());

        let session = service
            .create_instance("room-1", "alice", "alice_main")
            .await
            .unwrap();
        assert_eq!(session.agent_instance_id, "inst-1");
        assert_eq!(session.agent_stream_id, "agent_stream_room-1");
        assert!(service.is_registered());

        // Second instance does not register again
        service
            .create_instance("room-1", "alice", "alice_main")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_already_registered_code_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("Action", "RegisterAgent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Code": AGENT_ALREADY_EXISTS,
                "Message": "agent already exists"
            })))
            .mount(&server)
            .await;

        let service = service(&server.uri());
        service.ensure_registered().await.unwrap();
        assert!(service.is_registered());
    }

    #[tokio::test]
    async fn test_failed_registration_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("Action", "RegisterAgent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Code": 400000001,
                "Message": "bad llm config"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("Action", "RegisterAgent"))
            .respond_with(ok(json!({})))
            .mount(&server)
            .await;

        let service = service(&server.uri());
        assert!(service.ensure_registered().await.is_err());
        assert!(!service.is_registered());
        service.ensure_registered().await.unwrap();
        assert!(service.is_registered());
    }

    #[tokio::test]
    async fn test_create_instance_missing_id_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok(json!({})))
            .mount(&server)
            .await;

        let err = service(&server.uri())
            .create_instance("room", "bob", "bob_main")
            .await
            .unwrap_err();
        assert!(matches!(err, ZegoError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_send_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("Action", "SendAgentInstanceLLM"))
            .and(body_partial_json(json!({
                "AgentInstanceId": "inst-1",
                "Text": "hello",
                "AddQuestionToHistory": true,
                "AddAnswerToHistory": true
            })))
            .respond_with(ok(json!(null)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("Action", "DeleteAgentInstance"))
            .and(body_partial_json(json!({ "AgentInstanceId": "inst-1" })))
            .respond_with(ok(json!(null)))
            .expect(1)
            .mount(&server)
            .await;

        let service = service(&server.uri());
        service.send_message("inst-1", "hello").await.unwrap();
        service.delete_instance("inst-1").await.unwrap();
    }
}
