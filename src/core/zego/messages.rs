//! Request and response payloads for the ZEGO agent API.
//!
//! The vendor uses PascalCase keys throughout, with a few all-caps
//! acronyms (`LLM`, `TTS`, `ASR`, `RTC`) that need explicit renames.

use serde::{Deserialize, Serialize};

pub const ACTION_REGISTER_AGENT: &str = "RegisterAgent";
pub const ACTION_CREATE_AGENT_INSTANCE: &str = "CreateAgentInstance";
pub const ACTION_SEND_AGENT_INSTANCE_LLM: &str = "SendAgentInstanceLLM";
pub const ACTION_DELETE_AGENT_INSTANCE: &str = "DeleteAgentInstance";

/// Envelope wrapped around every vendor response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZegoEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LlmSettings {
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterAgentRequest {
    pub agent_id: String,
    pub name: String,
    #[serde(rename = "LLM")]
    pub llm: LlmSettings,
    #[serde(rename = "TTS")]
    pub tts: serde_json::Value,
    #[serde(rename = "ASR", skip_serializing_if = "Option::is_none")]
    pub asr: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RtcInfo {
    pub room_id: String,
    pub agent_stream_id: String,
    pub agent_user_id: String,
    pub user_stream_id: String,
}

/// How the vendor keeps conversation context for an instance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageHistory {
    pub sync_mode: u8,
    pub messages: Vec<serde_json::Value>,
    pub window_size: u32,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self {
            sync_mode: 1,
            messages: Vec::new(),
            window_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateAgentInstanceRequest {
    pub agent_id: String,
    pub user_id: String,
    #[serde(rename = "RTC")]
    pub rtc: RtcInfo,
    pub message_history: MessageHistory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateAgentInstanceData {
    pub agent_instance_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendAgentInstanceLlmRequest {
    pub agent_instance_id: String,
    pub text: String,
    pub add_question_to_history: bool,
    pub add_answer_to_history: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteAgentInstanceRequest {
    pub agent_instance_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let envelope: ZegoEnvelope = serde_json::from_value(json!({
            "Code": 0,
            "Message": "success",
            "RequestId": "req-1",
            "Data": { "AgentInstanceId": "inst-1" }
        }))
        .unwrap();

        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.request_id.as_deref(), Some("req-1"));
        let data: CreateAgentInstanceData =
            serde_json::from_value(envelope.data.unwrap()).unwrap();
        assert_eq!(data.agent_instance_id, "inst-1");
    }

    #[test]
    fn test_envelope_minimal() {
        let envelope: ZegoEnvelope = serde_json::from_value(json!({ "Code": 410001008 })).unwrap();
        assert_eq!(envelope.code, 410001008);
        assert!(envelope.message.is_empty());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_create_instance_request_keys() {
        let request = CreateAgentInstanceRequest {
            agent_id: "agent".to_string(),
            user_id: "alice".to_string(),
            rtc: RtcInfo {
                room_id: "room-1".to_string(),
                agent_stream_id: "agent_stream_room-1".to_string(),
                agent_user_id: "agent_room-1".to_string(),
                user_stream_id: "alice_stream".to_string(),
            },
            message_history: MessageHistory::default(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["AgentId"], "agent");
        assert_eq!(value["RTC"]["RoomId"], "room-1");
        assert_eq!(value["RTC"]["UserStreamId"], "alice_stream");
        assert_eq!(value["MessageHistory"]["SyncMode"], 1);
        assert_eq!(value["MessageHistory"]["WindowSize"], 10);
    }

    #[test]
    fn test_register_request_skips_missing_asr() {
        let request = RegisterAgentRequest {
            agent_id: "agent".to_string(),
            name: "Helper".to_string(),
            llm: LlmSettings {
                url: "https://llm.example.com/chat/completions".to_string(),
                api_key: "key".to_string(),
                model: "qwen-plus".to_string(),
                system_prompt: "hi".to_string(),
                temperature: 0.8,
                top_p: 0.6,
            },
            tts: json!({ "Vendor": "ByteDance" }),
            asr: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["LLM"]["Model"], "qwen-plus");
        assert_eq!(value["LLM"]["SystemPrompt"], "hi");
        assert_eq!(value["TTS"]["Vendor"], "ByteDance");
        assert!(value.get("ASR").is_none());
    }

    #[test]
    fn test_send_message_request_keys() {
        let value = serde_json::to_value(SendAgentInstanceLlmRequest {
            agent_instance_id: "inst".to_string(),
            text: "hello".to_string(),
            add_question_to_history: true,
            add_answer_to_history: true,
        })
        .unwrap();
        assert_eq!(value["AgentInstanceId"], "inst");
        assert_eq!(value["Text"], "hello");
        assert_eq!(value["AddQuestionToHistory"], true);
    }
}
