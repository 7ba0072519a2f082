use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::indicator::BusyIndicator;
use super::instructions::system_instructions;
use super::{ChatBackend, CompletionRequest, ResponseShape, ShapeSpec};
use crate::conversation::Message;
use crate::core::{SessionContext, Settings};
use crate::error::ModelError;

/// Sends the conversation to the model and reads the reply back in a fixed
/// shape.
pub struct ResponseGateway {
    backend: Box<dyn ChatBackend>,
    context: Arc<SessionContext>,
}

impl ResponseGateway {
    pub fn new(backend: Box<dyn ChatBackend>, context: Arc<SessionContext>) -> Self {
        Self { backend, context }
    }

    pub fn request<R: ResponseShape>(
        &self,
        history: &[Message],
        settings: &Settings,
    ) -> Result<R, ModelError> {
        let messages = outbound_messages(history, settings);
        let shape = ShapeSpec {
            name: R::NAME,
            schema: R::schema(settings.shell),
        };
        let request = CompletionRequest {
            model: &settings.model,
            messages: &messages,
            shape: &shape,
        };

        debug!(
            model = %settings.model,
            shape = R::NAME,
            messages = messages.len(),
            "sending model request"
        );

        let content = {
            let _busy = BusyIndicator::start(Arc::clone(&self.context));
            self.backend.complete(&request)?
        };

        debug!(shape = R::NAME, bytes = content.len(), "model replied");
        coerce_response::<R>(&content)
    }
}

/// Instructions, then the current settings, then the conversation. Neither
/// of the first two is ever stored in history.
pub fn outbound_messages(history: &[Message], settings: &Settings) -> Vec<Message> {
    let mut messages = system_instructions(settings.shell);
    messages.reserve(history.len() + 1);
    messages.push(Message::system(settings.summary()));
    messages.extend_from_slice(history);
    messages
}

pub fn coerce_response<R: ResponseShape>(content: &str) -> Result<R, ModelError> {
    let mut value: Value =
        serde_json::from_str(strip_code_fence(content)).map_err(|e| ModelError::Coercion {
            shape: R::NAME,
            reason: e.to_string(),
        })?;

    R::coerce(&mut value);

    serde_json::from_value(value).map_err(|e| ModelError::Coercion {
        shape: R::NAME,
        reason: e.to_string(),
    })
}

/// Unwraps content the model put inside a markdown code fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Converts a string-typed value to the JSON type the schema declares.
/// Values that are not strings or that do not parse are returned unchanged.
pub(crate) fn coerce_scalar(value: &Value, target_type: &str) -> Value {
    let Value::String(s) = value else {
        return value.clone();
    };

    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        return Value::Null;
    }

    match target_type {
        "integer" => s
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| value.clone()),
        "boolean" => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" => Value::Bool(true),
            "false" | "0" | "no" => Value::Bool(false),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::core::{SettingsPatch, ShellKind};
    use crate::model::{RequestResponse, ResultResponse};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingBackend {
        reply: Result<String, fn() -> ModelError>,
        seen: Rc<RefCell<Vec<(Vec<Message>, &'static str)>>>,
        context: Arc<SessionContext>,
        busy_during_call: Rc<RefCell<bool>>,
    }

    impl ChatBackend for RecordingBackend {
        fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ModelError> {
            *self.busy_during_call.borrow_mut() = self.context.is_busy();
            self.seen
                .borrow_mut()
                .push((request.messages.to_vec(), request.shape.name));
            match &self.reply {
                Ok(content) => Ok(content.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    struct Harness {
        gateway: ResponseGateway,
        context: Arc<SessionContext>,
        seen: Rc<RefCell<Vec<(Vec<Message>, &'static str)>>>,
        busy_during_call: Rc<RefCell<bool>>,
    }

    fn harness(reply: Result<String, fn() -> ModelError>) -> Harness {
        let context = Arc::new(SessionContext::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let busy_during_call = Rc::new(RefCell::new(false));
        let backend = RecordingBackend {
            reply,
            seen: Rc::clone(&seen),
            context: Arc::clone(&context),
            busy_during_call: Rc::clone(&busy_during_call),
        };
        Harness {
            gateway: ResponseGateway::new(Box::new(backend), Arc::clone(&context)),
            context,
            seen,
            busy_during_call,
        }
    }

    #[test]
    fn outbound_order_is_instructions_settings_history() {
        let settings = Settings::default();
        let history = vec![Message::user("hi"), Message::assistant("hello")];

        let messages = outbound_messages(&history, &settings);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], Message::system(settings.summary()));
        assert_eq!(&messages[2..], &history[..]);
    }

    #[test]
    fn request_sends_shape_and_parses_reply() {
        let h = harness(Ok(
            r#"{"message": "Listing files", "command_lines": ["ls"], "settings_patch": null}"#
                .to_string(),
        ));
        let history = vec![Message::user("list files here")];

        let response: RequestResponse = h
            .gateway
            .request(&history, &Settings::default())
            .expect("response");

        assert_eq!(response.message, "Listing files");
        assert_eq!(response.command_lines(), ["ls".to_string()]);
        assert!(*h.busy_during_call.borrow());
        assert!(!h.context.is_busy());

        let seen = h.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, "request_response");
        assert_eq!(seen[0].0.last(), Some(&Message::user("list files here")));
    }

    #[test]
    fn backend_failure_releases_indicator() {
        let h = harness(Err(|| ModelError::EmptyResponse));

        let result: Result<ResultResponse, _> = h.gateway.request(&[], &Settings::default());

        assert!(matches!(result, Err(ModelError::EmptyResponse)));
        assert!(!h.context.is_busy());
    }

    #[test]
    fn unparseable_reply_is_a_coercion_error() {
        let h = harness(Ok("Sure! I'll list the files.".to_string()));

        let result: Result<RequestResponse, _> = h.gateway.request(&[], &Settings::default());

        assert!(matches!(
            result,
            Err(ModelError::Coercion {
                shape: "request_response",
                ..
            })
        ));
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let response: ResultResponse =
            coerce_response("```json\n{\"message\": \"done\"}\n```").expect("response");
        assert_eq!(response.message, "done");
    }

    #[test]
    fn result_shape_requires_message() {
        let result = coerce_response::<ResultResponse>(r#"{"text": "done"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn stringly_typed_patch_values_are_coerced() {
        let response: RequestResponse = coerce_response(
            r#"{
                "message": "Updated",
                "command_lines": null,
                "settings_patch": {
                    "history_size": "20",
                    "shell": "powershell",
                    "model": null,
                    "explain": "true",
                    "autocomplete": ""
                }
            }"#,
        )
        .expect("response");

        assert_eq!(
            response.settings_patch,
            Some(SettingsPatch {
                history_size: Some(20),
                shell: Some(ShellKind::Powershell),
                explain: Some(true),
                ..SettingsPatch::default()
            })
        );
    }

    #[test]
    fn coerce_scalar_leaves_unknown_values() {
        assert_eq!(coerce_scalar(&json!("maybe"), "boolean"), json!("maybe"));
        assert_eq!(coerce_scalar(&json!(7), "integer"), json!(7));
        assert_eq!(coerce_scalar(&json!("NULL"), "integer"), Value::Null);
    }
}
