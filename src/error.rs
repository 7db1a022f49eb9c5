//! Error types for the chat and speech clients.
//!
//! Neither error ever leaves the plugin: chat errors become a degraded
//! answer via [`ChatError::to_answer`], speech errors become "no audio".

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat API key is not configured")]
    MissingApiKey,

    /// Every attempt failed; holds the last failure.
    #[error("chat request failed: {0}")]
    Request(reqwest::Error),

    #[error("chat API returned status {0}")]
    Status(StatusCode),

    #[error("chat response has no choices")]
    NoChoices,

    #[error("failed to read chat response: {0}")]
    Body(reqwest::Error),

    #[error("failed to decode chat response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ChatError {
    /// Text spoken (or shown) in place of the answer.
    pub fn to_answer(&self) -> String {
        match self {
            Self::MissingApiKey => "请先在config.json中配置正确的Chat API密钥".to_string(),
            Self::Request(e) => format!("抱歉，回答问题时出现错误: {e}"),
            Self::Status(status) => format!("抱歉，获取回答失败，API请求错误: {}", status.as_u16()),
            Self::NoChoices => "抱歉，获取回答失败，API返回结果异常".to_string(),
            Self::Body(e) => format!("抱歉，获取回答时发生错误: {e}"),
            Self::Decode(e) => format!("抱歉，获取回答时发生错误: {e}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    /// `.` or `..` would be collapsed by URL normalization, even when
    /// percent-encoded.
    #[error("text {0:?} cannot be sent as a path segment")]
    DotSegment(String),

    /// Every attempt failed; holds the last failure.
    #[error("speech request failed: {0}")]
    Request(reqwest::Error),

    #[error("speech API returned status {0}")]
    Status(StatusCode),

    #[error("failed to read speech response: {0}")]
    Body(reqwest::Error),

    #[error("downloaded audio is empty")]
    EmptyAudio,

    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}
