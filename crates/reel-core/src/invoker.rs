//! Agent invocation seam
//!
//! The orchestrator talks to agents only through [`AgentInvoker`]. Transport,
//! authentication and retries belong to the implementation; the orchestrator
//! makes exactly one call per invocation and never retries.

use crate::error::InvocationError;
use reel_stages::AgentId;
use serde_json::{Map, Value};

/// Outcome of one agent call
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    /// The agent produced a result
    Success {
        /// Raw result payload
        result: Value,
    },
    /// The call failed
    Failure {
        /// Failure text; may be empty
        error: String,
    },
}

impl AgentReply {
    /// Successful reply
    #[must_use]
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    /// Failed reply
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Decode the wire envelope
    ///
    /// `{"success": true, "response": {"result": ...}}` is a success; a missing
    /// or null result becomes `{}`. Anything else is a failure carrying the
    /// envelope's `error` text, if any.
    #[must_use]
    pub fn from_wire(envelope: &Value) -> Self {
        if envelope.get("success").and_then(Value::as_bool) == Some(true) {
            let result = envelope
                .pointer("/response/result")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            Self::Success { result }
        } else {
            let error = envelope
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Self::Failure { error }
        }
    }

    /// Result payload, or the failure as an [`InvocationError`]
    ///
    /// # Errors
    /// Returns the failure text, defaulted when blank.
    pub fn into_result(self) -> Result<Value, InvocationError> {
        match self {
            Self::Success { result } => Ok(result),
            Self::Failure { error } => Err(InvocationError::new(error)),
        }
    }
}

/// Calls an external agent with a composed prompt
///
/// Implementations must not panic on failure; report it as
/// [`AgentReply::Failure`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Invoke `agent` with `prompt`
    async fn invoke(&self, prompt: &str, agent: &AgentId) -> AgentReply;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_success() {
        let reply = AgentReply::from_wire(&json!({
            "success": true,
            "response": {"result": {"summary": "ok"}}
        }));
        assert_eq!(reply, AgentReply::success(json!({"summary": "ok"})));
    }

    #[test]
    fn wire_success_without_result() {
        assert_eq!(
            AgentReply::from_wire(&json!({"success": true})),
            AgentReply::success(json!({}))
        );
        assert_eq!(
            AgentReply::from_wire(&json!({"success": true, "response": {"result": null}})),
            AgentReply::success(json!({}))
        );
    }

    #[test]
    fn wire_failure() {
        assert_eq!(
            AgentReply::from_wire(&json!({"success": false, "error": "rate limited"})),
            AgentReply::failure("rate limited")
        );
        let err = AgentReply::from_wire(&json!({"oops": 1}))
            .into_result()
            .unwrap_err();
        assert_eq!(err.message, "Agent call failed");
    }

    #[tokio::test]
    async fn mocked_invoker() {
        let mut invoker = MockAgentInvoker::new();
        invoker
            .expect_invoke()
            .withf(|prompt, agent| prompt.starts_with("Research") && agent.as_str() == "a1")
            .times(1)
            .returning(|_, _| AgentReply::success(json!({"inspiration_briefs": []})));

        let reply = invoker.invoke("Research trends", &AgentId::new("a1")).await;
        assert!(matches!(reply, AgentReply::Success { .. }));
    }
}
