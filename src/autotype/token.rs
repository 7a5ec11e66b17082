use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Literal character or keystroke string such as `{Tab}`
    Key,
    /// Directive in `Name` or `Name:Argument` form
    Command,
}

/// One key or command of an auto-type sequence. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AutotypeToken {
    kind: TokenKind,
    content: String,
}

impl AutotypeToken {
    pub fn key(content: impl Into<String>) -> Self {
        Self { kind: TokenKind::Key, content: content.into() }
    }

    pub fn command(content: impl Into<String>) -> Self {
        Self { kind: TokenKind::Command, content: content.into() }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_command(&self) -> bool {
        self.kind == TokenKind::Command
    }

    /// Splits a command into name and optional argument. `None` for keys.
    pub fn command_parts(&self) -> Option<(&str, Option<&str>)> {
        if !self.is_command() {
            return None;
        }
        match self.content.split_once(':') {
            Some((name, arg)) => Some((name, Some(arg))),
            None => Some((&self.content, None)),
        }
    }
}

impl Display for AutotypeToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}
