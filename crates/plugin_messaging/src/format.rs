//! Message formatting.
//!
//! Templates get their color macros expanded *before* the message is
//! substituted, so players cannot inject colors through message text.

use crate::color::{replace_color_macros, ChatColor};
use crate::config::PLACEHOLDER;
use crate::types::Identity;

/// Applies a configured template to a server-wide announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastFormatter {
    /// Template with color macros already expanded.
    template: String,
}

impl BroadcastFormatter {
    /// Creates a formatter, expanding the template's color macros once.
    pub fn new(template: &str) -> Self {
        Self {
            template: replace_color_macros(template),
        }
    }

    /// One-off form of [`BroadcastFormatter::render`].
    pub fn format(template: &str, message: &str) -> String {
        Self::new(template).render(message)
    }

    /// Substitutes `message` verbatim for every `%s` in the template.
    ///
    /// Color macros in `message` are left as typed.
    pub fn render(&self, message: &str) -> String {
        self.template.replace(PLACEHOLDER, message)
    }
}

/// `<Name> message` line for a player's `/say`.
pub fn player_say(sender: &Identity, message: &str) -> String {
    format!("<{}> {}", sender.colored_name(), message)
}

/// `* Name message` line for `/me`.
pub fn action(sender: &Identity, message: &str) -> String {
    format!("* {} {}", sender.name(), message)
}

/// Line delivered to the receiver of a private message.
///
/// Renders as gray `(From <sender>): ` followed by the message in white.
pub fn private_incoming(sender: &Identity, message: &str) -> String {
    format!(
        "{}(From {}): {}{}",
        ChatColor::Gray,
        sender.name(),
        ChatColor::White,
        message
    )
}

/// Confirmation echoed back to the sender of a private message.
///
/// Renders as gray `(To <receiver>): ` followed by the message in white.
pub fn private_outgoing(receiver: &Identity, message: &str) -> String {
    format!(
        "{}(To {}): {}{}",
        ChatColor::Gray,
        receiver.name(),
        ChatColor::White,
        message
    )
}

/// Advisory shown to a sender whose receiver is away.
pub fn away_hint(receiver: &Identity, status: &str) -> String {
    let mut hint = format!(
        "{}{} is afk. They might not see your message.",
        ChatColor::Gray,
        receiver.name()
    );
    if !status.is_empty() {
        hint.push_str(&format!(" ({status})"));
    }
    hint
}

/// Red notice for a failed command or a suppressed chat attempt.
pub fn error_notice(message: &str) -> String {
    format!("{}{}", ChatColor::Red, message)
}

/// Yellow notice for away-status and moderation changes.
pub fn status_notice(message: &str) -> String {
    format!("{}{}", ChatColor::Yellow, message)
}
