//! Types shared with the chat-bot host: what it hands a plugin and what a
//! plugin hands back.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    Text,
    Voice,
    Image,
    File,
}

/// An inbound message as seen by plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub kind: ContextType,
    pub content: String,
}

impl Context {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ContextType::Text,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Path to an audio file the host should send as a voice message.
    Voice(PathBuf),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "TEXT: {text}"),
            Self::Voice(path) => write!(f, "VOICE: {}", path.display()),
        }
    }
}

/// What the host should do after a plugin has seen the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventAction {
    /// Pass the event on to the next plugin.
    #[default]
    Continue,
    /// Stop here; the host still runs its default reply handling.
    Break,
    /// Stop here and skip default handling; the reply is final.
    BreakPass,
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "CONTINUE"),
            Self::Break => write!(f, "BREAK"),
            Self::BreakPass => write!(f, "BREAK_PASS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    pub context: Context,
    pub reply: Option<Reply>,
    pub action: EventAction,
}

impl EventContext {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            reply: None,
            action: EventAction::Continue,
        }
    }

    pub fn resolve(&mut self, reply: Reply, action: EventAction) {
        self.reply = Some(reply);
        self.action = action;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMeta {
    pub name: &'static str,
    /// Higher runs earlier.
    pub desire_priority: i32,
    pub description: &'static str,
    pub version: &'static str,
    pub author: &'static str,
}

/// Hooks the host calls on a loaded plugin.
pub trait Plugin {
    fn meta(&self) -> &PluginMeta;

    fn on_handle_context(&self, event: &mut EventContext);

    fn help_text(&self) -> String;

    /// Release resources; called at shutdown.
    fn cleanup(&self) {}
}
