//! Away status and moderation: `/afk`, `/mute`, `/unmute`.

use crate::error::{MessagingError, MessagingResult};
use crate::format;
use crate::host::Broadcaster;
use crate::resolver::IdentityResolver;
use crate::session::SessionStore;
use crate::types::Identity;
use std::sync::Arc;
use tracing::info;

pub struct StatusCommands {
    sessions: Arc<dyn SessionStore>,
    resolver: Arc<dyn IdentityResolver>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl StatusCommands {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        resolver: Arc<dyn IdentityResolver>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            sessions,
            resolver,
            broadcaster,
        }
    }

    /// Toggles the actor's away status. Only players can be away.
    pub fn afk(&self, actor: &Identity, status: Option<&str>) -> MessagingResult<()> {
        if !actor.is_player() {
            return Err(MessagingError::PlayerOnly);
        }

        let id = actor.id();
        if self.sessions.idle_status(id).is_some() {
            self.sessions.update(id, &mut |s| s.idle_status = None);
            self.broadcaster
                .send(actor, &format::status_notice("You are no longer away."));
            return Ok(());
        }

        let status = status.unwrap_or("").to_string();
        let notice = if status.is_empty() {
            "Set as away".to_string()
        } else {
            format!("Set away status to \"{status}\"")
        };

        let stored = status.clone();
        if !self
            .sessions
            .update(id, &mut |s| s.idle_status = Some(stored.clone()))
        {
            return Err(MessagingError::NoSession);
        }
        self.broadcaster.send(
            actor,
            &format::status_notice(&format!("{notice}. To return, type /afk again.")),
        );
        Ok(())
    }

    pub fn mute(&self, actor: &Identity, target: &str) -> MessagingResult<()> {
        self.set_muted(actor, target, true)
    }

    pub fn unmute(&self, actor: &Identity, target: &str) -> MessagingResult<()> {
        self.set_muted(actor, target, false)
    }

    fn set_muted(&self, actor: &Identity, target: &str, muted: bool) -> MessagingResult<()> {
        let player = self.resolver.resolve_player(target).into_result(target)?;
        // Online, but the host never opened a session for them.
        if !self.sessions.update(player.id(), &mut |s| s.muted = muted) {
            return Err(MessagingError::NoSuchTarget {
                query: target.to_string(),
            });
        }

        let verb = if muted { "muted" } else { "unmuted" };
        info!("🔇 {} {} {}", actor.name(), verb, player.name());

        self.broadcaster.send(
            &player,
            &format::status_notice(&format!("You've been {verb} by {}", actor.name())),
        );
        self.broadcaster.send(
            actor,
            &format::status_notice(&format!("You've {verb} {}", player.name())),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryServer;
    use crate::session::MemorySessionStore;
    use crate::types::SenderId;

    fn setup() -> (Arc<MemoryServer>, Arc<MemorySessionStore>, StatusCommands) {
        let server = Arc::new(MemoryServer::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let commands = StatusCommands::new(sessions.clone(), server.clone(), server.clone());
        (server, sessions, commands)
    }

    fn join(server: &MemoryServer, sessions: &MemorySessionStore, name: &str) -> Identity {
        let profile = server.join(name);
        sessions.open(SenderId::Player(profile.id));
        Identity::Player(profile)
    }

    #[test]
    fn test_afk_toggle_with_status() {
        let (server, sessions, commands) = setup();
        let alice = join(&server, &sessions, "alice");

        commands.afk(&alice, Some("fishing")).unwrap();
        assert_eq!(sessions.idle_status(alice.id()).as_deref(), Some("fishing"));

        commands.afk(&alice, Some("ignored")).unwrap();
        assert_eq!(sessions.idle_status(alice.id()), None);

        assert_eq!(
            server.inbox(alice.id()),
            vec![
                "\u{a7}eSet away status to \"fishing\". To return, type /afk again.".to_string(),
                "\u{a7}eYou are no longer away.".to_string(),
            ]
        );
    }

    #[test]
    fn test_afk_without_status_marks_away() {
        let (server, sessions, commands) = setup();
        let alice = join(&server, &sessions, "alice");

        commands.afk(&alice, None).unwrap();
        assert_eq!(sessions.idle_status(alice.id()).as_deref(), Some(""));
        assert_eq!(
            server.inbox(alice.id()),
            vec!["\u{a7}eSet as away. To return, type /afk again."]
        );
    }

    #[test]
    fn test_status_changes_without_session_are_rejected() {
        let (server, sessions, commands) = setup();
        let alice = Identity::Player(server.join("alice"));

        assert!(matches!(
            commands.mute(&Identity::Console, "alice"),
            Err(MessagingError::NoSuchTarget { .. })
        ));
        assert!(!sessions.is_muted(alice.id()));

        for _ in 0..2 {
            assert!(matches!(
                commands.afk(&alice, None),
                Err(MessagingError::NoSession)
            ));
        }
        assert!(server.take_deliveries().is_empty());
    }

    #[test]
    fn test_console_cannot_go_afk() {
        let (_server, sessions, commands) = setup();
        assert!(matches!(
            commands.afk(&Identity::Console, None),
            Err(MessagingError::PlayerOnly)
        ));
        assert_eq!(sessions.idle_status(SenderId::Console), None);
    }

    #[test]
    fn test_mute_and_unmute_notify_both_sides() {
        let (server, sessions, commands) = setup();
        let alice = join(&server, &sessions, "alice");

        commands.mute(&Identity::Console, "ali").unwrap();
        assert!(sessions.is_muted(alice.id()));

        commands.unmute(&Identity::Console, "@alice").unwrap();
        assert!(!sessions.is_muted(alice.id()));

        assert_eq!(
            server.inbox(alice.id()),
            vec![
                "\u{a7}eYou've been muted by *Console*".to_string(),
                "\u{a7}eYou've been unmuted by *Console*".to_string(),
            ]
        );
        assert_eq!(
            server.inbox(SenderId::Console),
            vec![
                "\u{a7}eYou've muted alice".to_string(),
                "\u{a7}eYou've unmuted alice".to_string(),
            ]
        );
    }

    #[test]
    fn test_mute_rejects_console_and_ambiguous_targets() {
        let (server, sessions, commands) = setup();
        let actor = join(&server, &sessions, "moderator");
        join(&server, &sessions, "alex");
        join(&server, &sessions, "alice");

        assert!(matches!(
            commands.mute(&actor, "#console"),
            Err(MessagingError::NoSuchTarget { .. })
        ));
        assert!(matches!(
            commands.mute(&actor, "al"),
            Err(MessagingError::AmbiguousTarget { .. })
        ));
        assert!(server.take_deliveries().is_empty());
    }
}
