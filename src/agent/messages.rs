//! Messages emitted by the agent runtime.
//!
//! The runtime prints one JSON object per line. Only the fields the collector
//! acts on are modelled; anything else is accepted and ignored so that new
//! message or block types never break a run.
//!
//! ```json
//! {"type":"system","subtype":"init","session_id":"…","model":"…"}
//! {"type":"assistant","message":{"content":[{"type":"text","text":"…"},{"type":"tool_use","name":"WebFetch","input":{}}]}}
//! {"type":"result","subtype":"success","num_turns":12,"total_cost_usd":0.04}
//! ```

use serde::Deserialize;

/// One line of the runtime's stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentMessage {
    System {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        session_id: Option<String>,
    },
    Assistant {
        message: AssistantBody,
    },
    Result {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        num_turns: Option<u64>,
        #[serde(default)]
        duration_ms: Option<u64>,
        #[serde(default)]
        total_cost_usd: Option<f64>,
    },
    /// Tool results echoed back as user turns, stream events, and anything newer.
    #[serde(other)]
    Other,
}

impl AgentMessage {
    /// Parse a single stream line.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// The session identifier if this is the runtime's `init` message.
    pub fn init_session_id(&self) -> Option<&str> {
        match self {
            AgentMessage::System {
                subtype,
                session_id: Some(id),
            } if subtype == "init" => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AssistantBody {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
    },
    #[serde(other)]
    Other,
}
