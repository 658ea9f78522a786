use serde::Deserialize;
use serde_json::Value;

/// Which record kinds reach the terminal. Resolved once per run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DisplayOptions {
    pub thinking: bool,
    pub tool_calls: bool,
    pub tool_results: bool,
    pub text: bool,
    pub user: bool,
}

impl DisplayOptions {
    pub fn all() -> Self {
        Self {
            thinking: true,
            tool_calls: true,
            tool_results: true,
            text: true,
            user: true,
        }
    }

    pub fn with_all(self, all: bool) -> Self {
        if all { Self::all() } else { self }
    }
}

/// `toolUseResult` sidecar stored next to `tool_result` blocks on user records.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ToolResultSidecar {
    #[serde(default)]
    pub stdout: Option<String>,

    #[serde(default)]
    pub stderr: Option<String>,

    #[serde(default)]
    pub is_error: bool,
}

impl ToolResultSidecar {
    /// Only object-shaped sidecars carry captured output; string sidecars are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayEvent {
    pub timestamp: Option<String>,
    pub body: EventBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventBody {
    Thinking {
        text: String,
    },
    ToolCall {
        name: String,
        input: Value,
    },
    ToolResult {
        content: Value,
        sidecar: Option<ToolResultSidecar>,
        is_error: bool,
    },
    TextResponse {
        text: String,
    },
    UserMessage {
        text: String,
    },
}

impl EventBody {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Thinking { .. } => "thinking",
            Self::ToolCall { .. } => "tool",
            Self::ToolResult { .. } => "result",
            Self::TextResponse { .. } => "response",
            Self::UserMessage { .. } => "user",
        }
    }
}
