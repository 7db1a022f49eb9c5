//! The voice Q&A plugin: `语音+question` → chat answer → spoken reply.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chat::ChatClient;
use crate::command::{self, Command};
use crate::config::Config;
use crate::host::{ContextType, EventAction, EventContext, Plugin, PluginMeta, Reply};
use crate::retry::RetryPolicy;
use crate::speech::SpeechClient;
use crate::temp_files::{PendingFiles, TmpDir};

pub const MISSING_QUESTION_PROMPT: &str = "请在'语音'后输入您的问题";
pub const TEXT_FALLBACK_PREFIX: &str = "语音生成失败，这是文字回答：\n";

pub const META: PluginMeta = PluginMeta {
    name: "VoiceReplyFree",
    desire_priority: 10,
    description: "语音问答插件：发送'语音+问题'、'语音 问题'或'语音问题'，机器人将以语音方式回答（使用Pollinations.ai免费语音服务）",
    version: env!("CARGO_PKG_VERSION"),
    author: "AI Assistant",
};

pub const HELP_TEXT: &str = "🎤 语音问答插件 (免费版) 🎤\n\n\
使用方法：\n\
- 发送 '语音+您的问题'、'语音 您的问题' 或 '语音您的问题' 获取AI的语音回答\n\
例如：语音+今天天气怎么样、语音 讲个笑话、语音你好啊\n\n\
注意：本插件使用Pollinations.ai的免费语音服务，无需额外配置TTS API";

pub struct VoiceReply {
    chat: ChatClient,
    speech: SpeechClient,
    pending: Arc<PendingFiles>,
}

impl VoiceReply {
    /// Load `config_path` (creating it if missing) and build the plugin.
    pub fn new(config_path: &Path, tmp_dir: TmpDir) -> Self {
        Self::with_config(Config::load(config_path), tmp_dir, RetryPolicy::default())
    }

    pub fn with_config(config: Config, tmp_dir: TmpDir, retry: RetryPolicy) -> Self {
        let pending = Arc::new(PendingFiles::new());
        let chat = ChatClient::new(config.chat, retry.clone());
        let speech = SpeechClient::new(config.speech, retry, tmp_dir, pending.clone());

        info!("Voice reply plugin initialized");
        Self {
            chat,
            speech,
            pending,
        }
    }

    /// Audio files generated so far and not yet cleaned up.
    pub fn pending_files(&self) -> &PendingFiles {
        &self.pending
    }

    /// Answer `question` with a voice reply, or the answer as text if
    /// speech synthesis fails.
    pub fn reply_to(&self, question: &str) -> Reply {
        let answer = self.chat.answer(question);

        match self.speech.synthesize(&answer) {
            Some(path) => {
                info!("Voice reply ready: {}", path.display());
                Reply::Voice(path)
            }
            None => {
                warn!("Speech generation failed, replying with text");
                Reply::Text(format!("{TEXT_FALLBACK_PREFIX}{answer}"))
            }
        }
    }
}

impl Plugin for VoiceReply {
    fn meta(&self) -> &PluginMeta {
        &META
    }

    fn on_handle_context(&self, event: &mut EventContext) {
        if event.context.kind != ContextType::Text {
            return;
        }

        let content = event.context.content.trim().to_string();
        info!("Handling content: {content}");

        match command::parse(&content) {
            None => {}
            Some(Command::MissingQuestion) => {
                event.resolve(
                    Reply::Text(MISSING_QUESTION_PROMPT.to_string()),
                    EventAction::Break,
                );
            }
            Some(Command::Ask(question)) => {
                info!("Voice question: {question}");
                let reply = self.reply_to(question);
                event.resolve(reply, EventAction::BreakPass);
            }
        }
    }

    fn help_text(&self) -> String {
        HELP_TEXT.to_string()
    }

    fn cleanup(&self) {
        let removed = self.pending.cleanup();
        info!("Cleaned up {removed} temp audio file(s)");
    }
}
