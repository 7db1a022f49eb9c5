//! Configuration management for voice-reply-rs.
//!
//! Loads `config.json` from beside the plugin. A missing file is created
//! with defaults; an unreadable one falls back to defaults with a blank
//! API key so no request is ever sent with a stale credential.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Placeholder written into a freshly created config file.
pub const API_KEY_PLACEHOLDER: &str = "your_api_key_here";

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
    /// Template for the user message; `{question}` is replaced by the question.
    pub user_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base: "https://api.llingfei.com/v1".into(),
            api_key: API_KEY_PLACEHOLDER.into(),
            model: "hsdeepseek-chat".into(),
            temperature: 0.7,
            system_prompt: "你是一个友好的AI助手，请用简洁明了的语言回答问题。".into(),
            user_prompt: "{question}".into(),
        }
    }
}

impl ChatConfig {
    /// True when the key is neither blank nor the placeholder.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != API_KEY_PLACEHOLDER
    }

    pub fn render_user_prompt(&self, question: &str) -> String {
        self.user_prompt.replace("{question}", question)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub base: String,
    pub model: String,
    pub voice: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base: "https://text.pollinations.ai".into(),
            model: "openai-audio".into(),
            voice: "ballad".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    #[serde(rename = "pollinations")]
    pub speech: SpeechConfig,
}

impl Config {
    /// Defaults used when the config file exists but cannot be read or parsed.
    pub fn fallback() -> Self {
        let mut config = Self::default();
        config.chat.api_key.clear();
        config
    }

    /// `config.json` in the directory of the running executable, or the
    /// working directory if that cannot be determined.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default()
            .join(CONFIG_FILE_NAME)
    }

    /// Load configuration from `path`.
    ///
    /// - present and valid: returned as-is (missing fields take defaults)
    /// - absent: defaults are written to `path` and returned
    /// - unreadable or invalid: [`Config::fallback`]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            match config.save(path) {
                Ok(()) => info!("Created default config at {}", path.display()),
                Err(e) => warn!("Failed to write default config {}: {e}", path.display()),
            }
            return config;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::fallback()
                }
            },
            Err(e) => {
                error!("Failed to read {}: {e}, using defaults", path.display());
                Self::fallback()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let config = Config::load(&path);

        assert_eq!(config, Config::default());
        assert!(path.exists());
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["chat"]["api_key"], API_KEY_PLACEHOLDER);
        assert_eq!(written["pollinations"]["voice"], "ballad");
    }

    #[test]
    fn existing_file_is_loaded_and_gaps_filled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"chat": {"api_key": "sk-test", "temperature": 0.2}, "pollinations": {"voice": "nova"}}"#,
        )
        .unwrap();

        let config = Config::load(&path);

        assert_eq!(config.chat.api_key, "sk-test");
        assert_eq!(config.chat.temperature, 0.2);
        assert_eq!(config.chat.model, "hsdeepseek-chat");
        assert_eq!(config.speech.voice, "nova");
        assert_eq!(config.speech.model, "openai-audio");
    }

    #[test]
    fn invalid_file_falls_back_with_blank_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let config = Config::load(&path);

        assert_eq!(config, Config::fallback());
        assert!(config.chat.api_key.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn unwritable_default_path_still_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(CONFIG_FILE_NAME);

        let config = Config::load(&path);

        assert_eq!(config, Config::default());
        assert!(!config.chat.has_api_key());
        assert!(!path.exists());
    }

    #[test]
    fn api_key_presence_check() {
        let mut chat = ChatConfig::default();
        assert!(!chat.has_api_key());
        chat.api_key.clear();
        assert!(!chat.has_api_key());
        chat.api_key = "sk-real".into();
        assert!(chat.has_api_key());
    }

    #[test]
    fn user_prompt_substitutes_question() {
        let chat = ChatConfig {
            user_prompt: "请回答：{question}".into(),
            ..ChatConfig::default()
        };
        assert_eq!(chat.render_user_prompt("你好"), "请回答：你好");
    }
}
