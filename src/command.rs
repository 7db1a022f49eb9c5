//! Command prefix matching.
//!
//! Rules are tried in order and the first match wins:
//! `语音+question`, `语音 question`, then `语音question`.

pub const TRIGGER: &str = "语音";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Trigger word followed by `+`.
    Plus,
    /// Trigger word followed by a space.
    Space,
    /// Trigger word directly followed by the question, or nothing.
    Bare,
}

pub const RULES: [Rule; 3] = [Rule::Plus, Rule::Space, Rule::Bare];

impl Rule {
    fn strip<'a>(self, trigger: &str, content: &'a str) -> Option<&'a str> {
        let rest = content.strip_prefix(trigger)?;
        match self {
            Self::Plus => rest.strip_prefix('+'),
            Self::Space => rest.strip_prefix(' '),
            Self::Bare => Some(rest),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Ask(&'a str),
    /// Trigger word with nothing after it.
    MissingQuestion,
}

/// Match `content` against `trigger`. `None` if this is not a command.
pub fn parse_with<'a>(trigger: &str, content: &'a str) -> Option<(Rule, Command<'a>)> {
    let content = content.trim();
    RULES.iter().find_map(|&rule| {
        let question = rule.strip(trigger, content)?.trim();
        let command = if question.is_empty() {
            Command::MissingQuestion
        } else {
            Command::Ask(question)
        };
        Some((rule, command))
    })
}

pub fn parse(content: &str) -> Option<Command<'_>> {
    parse_with(TRIGGER, content).map(|(_, command)| command)
}
