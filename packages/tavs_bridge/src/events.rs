//! Host event payloads and the line protocol the bridge reads them from.
//!
//! Each line on stdin is one JSON object tagged by `"event"`:
//!
//! ```text
//! {"event":"session_start","session":{"id":"s1","start_time":"2026-01-01T00:00:00Z"}}
//! {"event":"user_prompt","prompt":"fix the failing test"}
//! {"event":"tool_call","tool":{"name":"bash","input":{"command":"cargo test"}}}
//! {"event":"tool_result","result":{"name":"bash","output":"ok"}}
//! {"event":"agent_response","response":{"content":"Done.","done":true}}
//! {"event":"session_end","session":{"id":"s1","start_time":"2026-01-01T00:00:00Z"}}
//! ```
//!
//! Only the `event` tag and a response's `done` flag drive signals. Every other
//! field is optional, so `{"event":"session_end"}` is a complete event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A chunk of streamed agent output.
///
/// A chunk without a `done` flag is treated as an intermediate chunk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub done: bool,
}

/// One host lifecycle event with its payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    SessionStart {
        #[serde(default)]
        session: SessionInfo,
    },
    SessionEnd {
        #[serde(default)]
        session: SessionInfo,
    },
    UserPrompt {
        #[serde(default)]
        prompt: String,
    },
    ToolCall {
        #[serde(default)]
        tool: ToolCall,
    },
    ToolResult {
        #[serde(default)]
        result: ToolResult,
    },
    AgentResponse {
        #[serde(default)]
        response: AgentResponse,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse one protocol line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>, EventParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_start() {
        let event = parse_line(
            r#"{"event":"session_start","session":{"id":"abc","start_time":"2026-01-01T00:00:00Z","model":"sonnet"}}"#,
        )
        .unwrap()
        .unwrap();

        match &event {
            HostEvent::SessionStart { session } => {
                assert_eq!(session.id, "abc");
                assert_eq!(session.model.as_deref(), Some("sonnet"));
                assert!(session.start_time.is_some());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(event, HostEvent::SessionStart { .. }));
    }

    #[test]
    fn test_parse_tool_events() {
        let call = parse_line(r#"{"event":"tool_call","tool":{"name":"read","input":{"path":"a.rs"}}}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(call, HostEvent::ToolCall { ref tool } if tool.name == "read"));

        let result = parse_line(
            r#"{"event":"tool_result","result":{"name":"read","output":null,"error":"missing"}}"#,
        )
        .unwrap()
        .unwrap();
        match result {
            HostEvent::ToolResult { result } => {
                assert_eq!(result.error.as_deref(), Some("missing"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_response_without_done_is_intermediate() {
        let event = parse_line(r#"{"event":"agent_response","response":{"content":"partial"}}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            HostEvent::AgentResponse { ref response } if response.done == false
        ));
    }

    #[test]
    fn test_response_without_payload_is_intermediate() {
        let event = parse_line(r#"{"event":"agent_response"}"#).unwrap().unwrap();
        assert!(matches!(
            event,
            HostEvent::AgentResponse { ref response } if response.done == false
        ));
    }

    #[test]
    fn test_done_response() {
        let event = parse_line(r#"{"event":"agent_response","response":{"content":"","done":true}}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            HostEvent::AgentResponse { ref response } if response.done == true
        ));
    }

    #[test]
    fn test_user_prompt() {
        let event = parse_line(r#"{"event":"user_prompt","prompt":"fix bug"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            HostEvent::UserPrompt {
                prompt: "fix bug".to_string()
            }
        );
    }

    #[test]
    fn test_event_tag_alone_is_enough() {
        assert_eq!(
            parse_line(r#"{"event":"session_end"}"#).unwrap(),
            Some(HostEvent::SessionEnd {
                session: SessionInfo::default()
            })
        );
        assert_eq!(
            parse_line(r#"{"event":"user_prompt"}"#).unwrap(),
            Some(HostEvent::UserPrompt {
                prompt: String::new()
            })
        );
        assert!(matches!(
            parse_line(r#"{"event":"tool_call"}"#).unwrap(),
            Some(HostEvent::ToolCall { .. })
        ));
        assert!(matches!(
            parse_line(r#"{"event":"tool_result","result":{"output":1}}"#).unwrap(),
            Some(HostEvent::ToolResult { .. })
        ));
    }

    #[test]
    fn test_partial_session_is_accepted() {
        let event = parse_line(r#"{"event":"session_end","session":{"id":"s"}}"#)
            .unwrap()
            .unwrap();
        match event {
            HostEvent::SessionEnd { session } => {
                assert_eq!(session.id, "s");
                assert!(session.start_time.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   \t").unwrap().is_none());
    }

    #[test]
    fn test_malformed_lines_are_errors() {
        assert!(parse_line("not json").is_err());
        assert!(parse_line(r#"{"event":"permission_request"}"#).is_err());
        assert!(parse_line(r#"{"prompt":"no tag"}"#).is_err());
    }
}
