pub mod gateway;
pub mod indicator;
pub mod instructions;
pub mod openai;

pub use gateway::ResponseGateway;
pub use openai::OpenAiBackend;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::conversation::Message;
use crate::core::{SettingsPatch, ShellKind};
use crate::error::ModelError;

/// Name and JSON schema of the shape the backend must answer in.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub name: &'static str,
    pub schema: Value,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub shape: &'a ShapeSpec,
}

/// A chat completion service. Returns the raw content of the reply.
pub trait ChatBackend {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ModelError>;
}

/// A structured reply the model can be asked for.
pub trait ResponseShape: DeserializeOwned {
    const NAME: &'static str;

    fn schema(shell: ShellKind) -> Value;

    /// Fixes up loosely typed values before deserializing.
    fn coerce(_value: &mut Value) {}
}

/// Answer to a chat request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestResponse {
    pub message: String,
    #[serde(default)]
    pub command_lines: Option<Vec<String>>,
    #[serde(default, alias = "settings")]
    pub settings_patch: Option<SettingsPatch>,
}

impl RequestResponse {
    pub fn command_lines(&self) -> &[String] {
        self.command_lines.as_deref().unwrap_or_default()
    }
}

impl ResponseShape for RequestResponse {
    const NAME: &'static str = "request_response";

    fn schema(shell: ShellKind) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "A response to the user's message"
                },
                "command_lines": {
                    "type": ["array", "null"],
                    "items": { "type": "string" },
                    "description": format!(
                        "A list of {shell} commands to execute if you deem they should be run \
                         (destructive operations require prior approval)"
                    )
                },
                "settings_patch": {
                    "type": ["object", "null"],
                    "description": "Settings the user asked to change. Leave unchanged fields null.",
                    "properties": {
                        "history_size": { "type": ["integer", "null"] },
                        "shell": { "type": ["string", "null"], "enum": ["bash", "powershell", null] },
                        "model": { "type": ["string", "null"] },
                        "explain": { "type": ["boolean", "null"] },
                        "autocomplete": { "type": ["boolean", "null"] }
                    },
                    "required": ["history_size", "shell", "model", "explain", "autocomplete"],
                    "additionalProperties": false
                }
            },
            "required": ["message", "command_lines", "settings_patch"],
            "additionalProperties": false
        })
    }

    fn coerce(value: &mut Value) {
        let Some(patch) = value
            .get_mut("settings_patch")
            .and_then(Value::as_object_mut)
        else {
            return;
        };

        for (key, target) in [
            ("history_size", "integer"),
            ("explain", "boolean"),
            ("autocomplete", "boolean"),
        ] {
            if let Some(field) = patch.get_mut(key) {
                *field = gateway::coerce_scalar(field, target);
            }
        }
    }
}

/// Narration of a command that just ran, or of a declined suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultResponse {
    pub message: String,
}

impl ResponseShape for ResultResponse {
    const NAME: &'static str = "result_response";

    fn schema(_shell: ShellKind) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "A brief explanation of the output of the command you just ran. \
                                    On errors, guide the user towards a solution."
                }
            },
            "required": ["message"],
            "additionalProperties": false
        })
    }
}
