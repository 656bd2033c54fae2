use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::document::{Message, Parameters};
use crate::error::BookError;

use super::credentials::{CredentialSource, CREDENTIAL_KEY};
use super::sse::sse_text_stream;
use super::{RunOutput, Runner};

/// Settings for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    /// Used when the document parameters do not name a model
    pub model: String,
    /// Used when the document parameters do not set `stream`
    pub stream: bool,
    pub timeout_seconds: Option<u64>,
    pub credential_key: String,
}

impl Default for ChatCompletionsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            stream: true,
            timeout_seconds: None,
            credential_key: CREDENTIAL_KEY.to_string(),
        }
    }
}

/// Runner backed by a chat completions HTTP endpoint.
///
/// The document parameters are merged into the request body as-is, so any
/// field the endpoint accepts (`temperature`, `max_tokens`, ...) can be set
/// from the parameter editor.
pub struct ChatCompletionsRunner {
    client: reqwest::Client,
    config: ChatCompletionsConfig,
    api_key: SecretString,
}

impl ChatCompletionsRunner {
    /// Build a runner, reading the credential from `credentials`.
    pub fn new(
        config: ChatCompletionsConfig,
        credentials: &dyn CredentialSource,
    ) -> Result<Self, BookError> {
        let api_key = credentials
            .credential(&config.credential_key)
            .ok_or_else(|| BookError::MissingCredential(config.credential_key.clone()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn wants_stream(&self, parameters: &Parameters) -> bool {
        parameters
            .get("stream")
            .and_then(Value::as_bool)
            .unwrap_or(self.config.stream)
    }

    pub(crate) fn request_body(&self, history: &[Message], parameters: &Parameters) -> Value {
        let mut body = Map::new();
        body.insert("model".into(), Value::String(self.config.model.clone()));
        for (key, value) in parameters {
            body.insert(key.clone(), value.clone());
        }
        body.insert("messages".into(), serde_json::json!(history));
        body.insert("stream".into(), Value::Bool(self.wants_stream(parameters)));
        Value::Object(body)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, BookError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(body);
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }
        let response = request.send().await?;
        log::debug!("chat completions HTTP status: {}", response.status());
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let raw_response = response.text().await?;
        Err(BookError::ResponseFormat {
            message: format!("chat completions returned error status: {status}"),
            raw_response,
        })
    }
}

#[async_trait]
impl Runner for ChatCompletionsRunner {
    async fn generate(
        &self,
        history: &[Message],
        parameters: &Parameters,
    ) -> Result<RunOutput, BookError> {
        let body = self.request_body(history, parameters);
        let response = self.send(&body).await?;
        if self.wants_stream(parameters) {
            return Ok(RunOutput::Stream(sse_text_stream(response, parse_stream_event)));
        }
        let raw = response.text().await?;
        let parsed: CompletionResponse =
            serde_json::from_str(&raw).map_err(|err| BookError::ResponseFormat {
                message: format!("failed to decode chat completion: {err}"),
                raw_response: raw.clone(),
            })?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(RunOutput::Complete(text))
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

/// Extract the text carried by one SSE event; `[DONE]` and empty deltas yield nothing.
fn parse_stream_event(event: &str) -> Result<Option<String>, BookError> {
    let mut text = String::new();
    for line in event.lines() {
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            continue;
        }
        let parsed: StreamEvent = serde_json::from_str(data)?;
        if let Some(content) = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
        {
            text.push_str(&content);
        }
    }
    Ok((!text.is_empty()).then_some(text))
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::runner::StaticCredentials;

    fn runner(base_url: &str, stream: bool) -> ChatCompletionsRunner {
        let config = ChatCompletionsConfig {
            base_url: base_url.to_string(),
            stream,
            ..ChatCompletionsConfig::default()
        };
        let credentials = StaticCredentials::new().with(CREDENTIAL_KEY, "sk-test");
        ChatCompletionsRunner::new(config, &credentials).expect("runner")
    }

    #[test]
    fn missing_credential_is_reported() {
        let err = ChatCompletionsRunner::new(ChatCompletionsConfig::default(), &StaticCredentials::new())
            .err()
            .expect("missing credential");
        assert!(matches!(err, BookError::MissingCredential(key) if key == CREDENTIAL_KEY));
    }

    #[test]
    fn parameters_override_defaults_in_body() {
        let runner = runner("http://localhost", true);
        let mut parameters = Parameters::new();
        parameters.insert("model".into(), json!("gpt-4o"));
        parameters.insert("temperature".into(), json!(0.2));
        parameters.insert("stream".into(), json!(false));
        let body = runner.request_body(&[Message::user("hi")], &parameters);
        assert_eq!(body["model"], json!("gpt-4o"));
        assert_eq!(body["temperature"], json!(0.2));
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hi"}]));
    }

    #[test]
    fn stream_events_yield_deltas() {
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n";
        assert_eq!(parse_stream_event(event).expect("parse"), Some("Hel".to_string()));
        assert_eq!(parse_stream_event("data: [DONE]\n\n").expect("parse"), None);
        assert_eq!(
            parse_stream_event("data: {\"choices\":[{\"delta\":{}}]}\n\n").expect("parse"),
            None
        );
        assert!(parse_stream_event("data: {oops\n\n").is_err());
    }

    #[tokio::test]
    async fn complete_response_is_returned() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#)
            .create_async()
            .await;

        let output = runner(&server.url(), false)
            .generate(&[Message::user("Bonjour")], &Parameters::new())
            .await
            .expect("generate");
        match output {
            RunOutput::Complete(text) => assert_eq!(text, "Hello"),
            other => panic!("unexpected output {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn streamed_response_yields_deltas_in_order() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n"
        );
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let output = runner(&server.url(), true)
            .generate(&[Message::user("Bonjour")], &Parameters::new())
            .await
            .expect("generate");
        let RunOutput::Stream(mut stream) = output else {
            panic!("expected a stream");
        };
        let mut deltas = Vec::new();
        while let Some(delta) = stream.next().await {
            deltas.push(delta.expect("delta"));
        }
        assert_eq!(deltas, vec!["Hel".to_string(), "lo".to_string()]);
    }

    #[tokio::test]
    async fn error_status_carries_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let err = runner(&server.url(), false)
            .generate(&[Message::user("x")], &Parameters::new())
            .await
            .expect_err("error status");
        assert!(matches!(err, BookError::ResponseFormat { raw_response, .. } if raw_response == "bad key"));
    }
}
