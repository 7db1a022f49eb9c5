//! voice-reply-rs: voice Q&A plugin for chat-bot hosts.
//!
//! Messages of the form `语音+question`, `语音 question` or
//! `语音question` are answered by a chat-completion model, spoken by the
//! free Pollinations.ai voice service and returned as a voice reply,
//! falling back to text when no audio can be produced.

pub mod chat;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod plugin;
pub mod retry;
pub mod speech;
pub mod temp_files;

pub use config::Config;
pub use host::{Context, ContextType, EventAction, EventContext, Plugin, Reply};
pub use plugin::VoiceReply;
pub use retry::{RetryPolicy, Sleeper};
pub use temp_files::TmpDir;
