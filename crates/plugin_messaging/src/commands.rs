//! Command surface: metadata, argument splitting and arity checks.

use crate::error::{MessagingError, MessagingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Me,
    Say,
    Msg,
    Reply,
    Afk,
    Mute,
    Unmute,
    Broadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
    pub min_args: usize,
    /// `None` means unbounded.
    pub max_args: Option<usize>,
    pub permission: &'static str,
}

pub const COMMANDS: [CommandSpec; 8] = [
    CommandSpec {
        kind: CommandKind::Me,
        aliases: &["me"],
        usage: "<message...>",
        description: "Send an action message",
        min_args: 1,
        max_args: None,
        permission: "commandbook.say.me",
    },
    CommandSpec {
        kind: CommandKind::Say,
        aliases: &["say"],
        usage: "<message...>",
        description: "Send a message",
        min_args: 1,
        max_args: None,
        permission: "commandbook.say",
    },
    CommandSpec {
        kind: CommandKind::Msg,
        aliases: &["msg"],
        usage: "<target> <message...>",
        description: "Private message a user",
        min_args: 2,
        max_args: None,
        permission: "commandbook.msg",
    },
    CommandSpec {
        kind: CommandKind::Reply,
        aliases: &["reply"],
        usage: "<message...>",
        description: "Reply to last user",
        min_args: 1,
        max_args: None,
        permission: "commandbook.msg",
    },
    CommandSpec {
        kind: CommandKind::Afk,
        aliases: &["afk"],
        usage: "[status...]",
        description: "Set yourself as away",
        min_args: 0,
        max_args: None,
        permission: "commandbook.away",
    },
    CommandSpec {
        kind: CommandKind::Mute,
        aliases: &["mute"],
        usage: "<target>",
        description: "Mute a player",
        min_args: 1,
        max_args: Some(1),
        permission: "commandbook.mute",
    },
    CommandSpec {
        kind: CommandKind::Unmute,
        aliases: &["unmute"],
        usage: "<target>",
        description: "Unmute a player",
        min_args: 1,
        max_args: Some(1),
        permission: "commandbook.mute",
    },
    CommandSpec {
        kind: CommandKind::Broadcast,
        aliases: &["broadcast"],
        usage: "<message...>",
        description: "Broadcast a message",
        min_args: 1,
        max_args: None,
        permission: "commandbook.broadcast",
    },
];

/// Looks a command up by any of its aliases, case-insensitively.
pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name)))
}

impl CommandSpec {
    pub fn check_arity(&self, input: &CommandInput) -> MessagingResult<()> {
        let reason = if input.args.len() < self.min_args {
            "Too few arguments."
        } else if self.max_args.is_some_and(|max| input.args.len() > max) {
            "Too many arguments."
        } else {
            return Ok(());
        };

        Err(MessagingError::InvalidUsage {
            command: input.name.clone(),
            usage: self.usage.to_string(),
            reason,
        })
    }
}

/// A command line split into its name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInput {
    /// Lower-cased, without the leading slash.
    pub name: String,
    pub args: Vec<String>,
}

impl CommandInput {
    /// Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        let name = name.strip_prefix('/').unwrap_or(name).to_lowercase();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Arguments from `from` onwards, joined by single spaces.
    pub fn joined(&self, from: usize) -> String {
        self.args.get(from..).map(|rest| rest.join(" ")).unwrap_or_default()
    }
}
