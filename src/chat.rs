//! Chat-completion client.
//!
//! Sends the question to an OpenAI-compatible `/chat/completions`
//! endpoint. Failures never escape: [`ChatClient::answer`] always
//! returns text, either the model's reply or an explanation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::retry::RetryPolicy;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct ChatClient {
    config: ChatConfig,
    client: Client,
    retry: RetryPolicy,
}

impl ChatClient {
    pub fn new(config: ChatConfig, retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            client,
            retry,
        }
    }

    /// Answer `question`, substituting an explanation on any failure.
    pub fn answer(&self, question: &str) -> String {
        match self.complete(question) {
            Ok(answer) => answer,
            Err(e) => {
                error!("Chat completion failed: {e}");
                e.to_answer()
            }
        }
    }

    /// Request a completion for `question`.
    pub fn complete(&self, question: &str) -> Result<String, ChatError> {
        if !self.config.has_api_key() {
            return Err(ChatError::MissingApiKey);
        }

        let user_prompt = self.config.render_user_prompt(question);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base);
        debug!("Sending to chat model '{}': {question}", self.config.model);

        let resp = self
            .retry
            .run("Chat API request", || {
                self.client
                    .post(&url)
                    .bearer_auth(&self.config.api_key)
                    .json(&body)
                    .send()
                    .and_then(|resp| resp.error_for_status())
            })
            .map_err(ChatError::Request)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ChatError::Status(status));
        }

        let text = resp.text().map_err(ChatError::Body)?;
        let data: ChatResponse = serde_json::from_str(&text)?;
        let choice = data.choices.into_iter().next().ok_or(ChatError::NoChoices)?;
        let answer = choice.message.content.trim().to_string();

        info!("Chat answer: {answer}");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::tests::RecordingSleeper;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;

    fn config(base: &str) -> ChatConfig {
        ChatConfig {
            base: base.to_string(),
            api_key: "sk-test".into(),
            model: "test-model".into(),
            system_prompt: "be brief".into(),
            user_prompt: "Q: {question}".into(),
            ..ChatConfig::default()
        }
    }

    fn client(config: ChatConfig) -> (ChatClient, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let retry = RetryPolicy::default().with_sleeper(sleeper.clone());
        (ChatClient::new(config, retry), sleeper)
    }

    #[test]
    fn sends_system_and_user_messages() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Json(json!({
                "model": "test-model",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "Q: 你好"}
                ],
                "temperature": 0.7
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"  你好呀 \n"}}]}"#)
            .create();

        let (chat, sleeper) = client(config(&server.url()));
        assert_eq!(chat.answer("你好"), "你好呀");
        mock.assert();
        assert_eq!(sleeper.count(), 0);
    }

    #[test]
    fn placeholder_key_skips_network() {
        let mut server = Server::new();
        let mock = server.mock("POST", Matcher::Any).expect(0).create();

        let mut cfg = config(&server.url());
        cfg.api_key = crate::config::API_KEY_PLACEHOLDER.into();
        let (chat, _) = client(cfg);

        assert_eq!(chat.answer("你好"), "请先在config.json中配置正确的Chat API密钥");
        mock.assert();
    }

    #[test]
    fn retries_three_times_then_degrades() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .expect(3)
            .create();

        let (chat, sleeper) = client(config(&server.url()));
        let answer = chat.answer("你好");

        mock.assert();
        assert_eq!(sleeper.count(), 2);
        assert!(answer.starts_with("抱歉，回答问题时出现错误"));
        assert!(answer.contains("500"));
    }

    #[test]
    fn empty_choices_is_malformed() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_body(r#"{"choices":[]}"#)
            .create();

        let (chat, _) = client(config(&server.url()));
        assert_eq!(chat.answer("你好"), "抱歉，获取回答失败，API返回结果异常");
    }

    #[test]
    fn invalid_json_is_explained() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_body("<html>oops</html>")
            .create();

        let (chat, sleeper) = client(config(&server.url()));
        let answer = chat.answer("你好");
        assert!(answer.starts_with("抱歉，获取回答时发生错误"));
        assert_eq!(sleeper.count(), 0);
    }

    #[test]
    fn non_200_success_status_is_reported() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(202)
            .create();

        let (chat, _) = client(config(&server.url()));
        assert_eq!(chat.answer("你好"), "抱歉，获取回答失败，API请求错误: 202");
    }
}
