//! Suppresses raw chat from muted players.

use crate::error::MessagingError;
use crate::events::{ChatListener, PlayerChatEvent};
use crate::format;
use crate::host::Broadcaster;
use crate::session::SessionStore;
use crate::types::{Identity, SenderId};
use std::sync::Arc;
use tracing::debug;

/// Decision for one chat attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatDecision {
    Allowed,
    Suppressed,
}

pub struct ChatGate {
    sessions: Arc<dyn SessionStore>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl ChatGate {
    pub fn new(sessions: Arc<dyn SessionStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            sessions,
            broadcaster,
        }
    }

    /// Cancels the event and tells the player if they are muted.
    pub fn check(&self, event: &mut PlayerChatEvent) -> ChatDecision {
        if !self.sessions.is_muted(SenderId::Player(event.player.id)) {
            return ChatDecision::Allowed;
        }

        debug!("🔇 Suppressing chat from muted player {}", event.player.name);
        let player = Identity::Player(event.player.clone());
        self.broadcaster
            .send(&player, &format::error_notice(&MessagingError::Muted.to_string()));
        event.cancel();
        ChatDecision::Suppressed
    }
}

impl ChatListener for ChatGate {
    fn on_chat(&self, event: &mut PlayerChatEvent) {
        self.check(event);
    }
}
