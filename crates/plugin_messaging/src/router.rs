//! Mute-aware message routing and the reply protocol.
//!
//! Session fields are only written after a message has been delivered, so a
//! failed resolution leaves every session untouched.

use crate::config::MessagingConfig;
use crate::error::{MessagingError, MessagingResult};
use crate::events::{
    EventBus, PlayerChatEvent, SenderMessageEvent, SharedMessageEvent, SENDER_MESSAGE,
    SHARED_MESSAGE,
};
use crate::format::{self, BroadcastFormatter};
use crate::host::{AuditSink, Broadcaster, PrivateMessageRecord};
use crate::resolver::IdentityResolver;
use crate::session::SessionStore;
use crate::types::Identity;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes public, action and private messages between senders.
///
/// The router checks mutes, formats each line and delivers it through the
/// host [`Broadcaster`]. It also keeps the reply pointers in each sender's
/// session. It holds no state of its own beyond the two compiled templates;
/// everything else lives behind the injected capabilities.
pub struct MessageRouter {
    sessions: Arc<dyn SessionStore>,
    resolver: Arc<dyn IdentityResolver>,
    broadcaster: Arc<dyn Broadcaster>,
    events: Arc<dyn EventBus>,
    audit: Arc<dyn AuditSink>,
    console_say: BroadcastFormatter,
    announcement: BroadcastFormatter,
}

impl MessageRouter {
    /// Creates a router using the templates from `config`.
    ///
    /// The config is expected to be validated already; a template without
    /// `%s` simply renders without the message.
    pub fn new(
        config: &MessagingConfig,
        sessions: Arc<dyn SessionStore>,
        resolver: Arc<dyn IdentityResolver>,
        broadcaster: Arc<dyn Broadcaster>,
        events: Arc<dyn EventBus>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            sessions,
            resolver,
            broadcaster,
            events,
            audit,
            console_say: BroadcastFormatter::new(&config.console_say_format),
            announcement: BroadcastFormatter::new(&config.broadcast_format),
        }
    }

    /// Swaps in new templates.
    pub fn apply_config(&mut self, config: &MessagingConfig) {
        self.console_say = BroadcastFormatter::new(&config.console_say_format);
        self.announcement = BroadcastFormatter::new(&config.broadcast_format);
    }

    /// Sends a private message: `/msg <target> <message>`.
    ///
    /// # Arguments
    ///
    /// * `sender` - Identity running the command
    /// * `target` - Player query (`@exact`, `*substring` or a prefix) or a
    ///   console sentinel
    /// * `message` - Text to deliver, sent verbatim
    ///
    /// # Returns
    ///
    /// `Ok(())` once the message is delivered, or `NoSuchTarget` /
    /// `AmbiguousTarget` if `target` does not name exactly one recipient.
    ///
    /// # Message Flow
    ///
    /// 1. Resolve `target` against the online roster
    /// 2. Warn the sender if the receiver is away
    /// 3. Deliver to the receiver, echo to the sender and write the audit record
    /// 4. Point the sender's `last_recipient` at the receiver
    /// 5. Point the receiver's `pending_last_recipient` at the sender if unset
    pub fn send_private(
        &self,
        sender: &Identity,
        target: &str,
        message: &str,
    ) -> MessagingResult<()> {
        let receiver = self.resolver.resolve(target).into_result(target)?;

        self.deliver_private(sender, &receiver, message);

        let receiver_id = receiver.id();
        self.sessions
            .update(sender.id(), &mut |s| s.last_recipient = Some(receiver_id));
        self.remember_sender(&receiver, sender);
        Ok(())
    }

    /// Replies to the current conversation partner: `/reply <message>`.
    ///
    /// The partner is the sender's `last_recipient`, or failing that the
    /// first player who messaged them. The stored recipient is re-validated,
    /// so replying to someone who went offline fails instead of reaching a
    /// stale handle.
    ///
    /// # Returns
    ///
    /// `NoPriorRecipient` if there is no partner yet, `NoSuchTarget` if the
    /// partner is no longer online, otherwise `Ok(())`.
    pub fn reply(&self, sender: &Identity, message: &str) -> MessagingResult<()> {
        let target = self
            .sessions
            .session(sender.id())
            .and_then(|s| s.reply_target())
            .ok_or(MessagingError::NoPriorRecipient)?;

        let receiver = self
            .resolver
            .lookup(target)
            .ok_or_else(|| MessagingError::NoSuchTarget {
                query: target.to_string(),
            })?;

        self.deliver_private(sender, &receiver, message);
        self.remember_sender(&receiver, sender);
        Ok(())
    }

    /// Public chat: `/say <message>`.
    ///
    /// Player messages go through the chat listeners first; a veto drops
    /// the message without feedback. Players are shown as `<name> message`,
    /// the console through the configured console-say template.
    ///
    /// # Returns
    ///
    /// `Muted` if the sender is muted, otherwise `Ok(())`, including when a
    /// listener vetoed the message.
    pub fn say(&self, sender: &Identity, message: &str) -> MessagingResult<()> {
        self.ensure_not_muted(sender)?;

        if let Identity::Player(profile) = sender {
            let mut event = PlayerChatEvent::new(profile.clone(), message);
            self.events.call_chat(&mut event);
            if event.is_cancelled() {
                debug!("Chat listener vetoed /say from {}", profile.name);
                return Ok(());
            }
        }

        self.emit(
            SENDER_MESSAGE,
            &SenderMessageEvent {
                sender: sender.clone(),
                message: message.to_string(),
            },
        );

        let line = match sender {
            Identity::Player(_) => format::player_say(sender, message),
            Identity::Console => self.console_say.render(message),
        };
        self.broadcaster.broadcast(&line);
        Ok(())
    }

    /// Action message: `/me <message>`.
    ///
    /// Broadcasts `* name message` and emits it as a shared-message event
    /// for other plugins. Fails with `Muted` for a muted sender.
    pub fn me(&self, sender: &Identity, message: &str) -> MessagingResult<()> {
        self.ensure_not_muted(sender)?;

        self.emit(
            SHARED_MESSAGE,
            &SharedMessageEvent {
                message: format!("{} {}", sender.name(), message),
            },
        );
        self.broadcaster.broadcast(&format::action(sender, message));
        Ok(())
    }

    /// `/broadcast <message>`. Never mute-checked.
    pub fn broadcast(&self, message: &str) {
        self.broadcaster.broadcast(&self.announcement.render(message));
    }

    fn ensure_not_muted(&self, sender: &Identity) -> MessagingResult<()> {
        if self.sessions.is_muted(sender.id()) {
            debug!("🔇 Blocked message from muted sender {}", sender.name());
            return Err(MessagingError::Muted);
        }
        Ok(())
    }

    fn deliver_private(&self, sender: &Identity, receiver: &Identity, message: &str) {
        if let Some(status) = self.sessions.idle_status(receiver.id()) {
            self.broadcaster
                .send(sender, &format::away_hint(receiver, &status));
        }

        self.broadcaster
            .send(receiver, &format::private_incoming(sender, message));
        self.broadcaster
            .send(sender, &format::private_outgoing(receiver, message));

        self.audit
            .private_message(&PrivateMessageRecord::new(sender, receiver, message));
    }

    /// Lets the receiver `/reply` to the first sender that reached them.
    fn remember_sender(&self, receiver: &Identity, sender: &Identity) {
        let sender_id = sender.id();
        let open = self.sessions.update(receiver.id(), &mut |s| {
            if s.pending_last_recipient.is_none() {
                s.pending_last_recipient = Some(sender_id);
            }
        });
        if !open {
            debug!("No session open for {}, reply pointer not stored", receiver.name());
        }
    }

    fn emit<T: Serialize>(&self, event_name: &str, event: &T) {
        if let Err(e) = self.events.emit(event_name, event) {
            warn!("⚠️ Failed to emit {} event: {}", event_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LocalEventBus;
    use crate::host::TracingAuditSink;
    use crate::memory::MemoryServer;
    use crate::session::MemorySessionStore;
    use crate::types::SenderId;

    struct Fixture {
        server: Arc<MemoryServer>,
        sessions: Arc<MemorySessionStore>,
        router: MessageRouter,
    }

    fn fixture() -> Fixture {
        let server = Arc::new(MemoryServer::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let router = MessageRouter::new(
            &MessagingConfig::default(),
            sessions.clone(),
            server.clone(),
            server.clone(),
            Arc::new(LocalEventBus::new()),
            Arc::new(TracingAuditSink),
        );
        Fixture {
            server,
            sessions,
            router,
        }
    }

    impl Fixture {
        fn join(&self, name: &str) -> Identity {
            let profile = self.server.join(name);
            self.sessions.open(SenderId::Player(profile.id));
            Identity::Player(profile)
        }
    }

    #[test]
    fn test_private_message_delivery() {
        let f = fixture();
        let alice = f.join("alice");
        let bob = f.join("bob");

        f.router.send_private(&alice, "bob", "hello").unwrap();

        assert_eq!(
            f.server.inbox(bob.id()),
            vec!["\u{a7}7(From alice): \u{a7}fhello"]
        );
        assert_eq!(
            f.server.inbox(alice.id()),
            vec!["\u{a7}7(To bob): \u{a7}fhello"]
        );

        let alice_session = f.sessions.session(alice.id()).unwrap();
        assert_eq!(alice_session.last_recipient, Some(bob.id()));
        let bob_session = f.sessions.session(bob.id()).unwrap();
        assert_eq!(bob_session.pending_last_recipient, Some(alice.id()));
        assert_eq!(bob_session.last_recipient, None);
    }

    #[test]
    fn test_unknown_target_leaves_sessions_untouched() {
        let f = fixture();
        let alice = f.join("alice");

        let err = f.router.send_private(&alice, "nobody", "hello").unwrap_err();
        assert!(matches!(err, MessagingError::NoSuchTarget { .. }));
        assert_eq!(f.sessions.session(alice.id()).unwrap().last_recipient, None);
        assert!(f.server.take_deliveries().is_empty());
    }

    #[test]
    fn test_away_hint_precedes_delivery() {
        let f = fixture();
        let alice = f.join("alice");
        let bob = f.join("bob");
        f.sessions
            .update(bob.id(), &mut |s| s.idle_status = Some("dinner".to_string()));

        f.router.send_private(&alice, "bob", "you there?").unwrap();

        assert_eq!(
            f.server.inbox(alice.id()),
            vec![
                "\u{a7}7bob is afk. They might not see your message. (dinner)".to_string(),
                "\u{a7}7(To bob): \u{a7}fyou there?".to_string(),
            ]
        );
        assert_eq!(f.server.inbox(bob.id()).len(), 1);
    }

    #[test]
    fn test_message_to_console() {
        let f = fixture();
        let alice = f.join("alice");

        f.router.send_private(&alice, "#console", "help").unwrap();
        assert_eq!(
            f.server.inbox(SenderId::Console),
            vec!["\u{a7}7(From alice): \u{a7}fhelp"]
        );

        f.router.reply(&Identity::Console, "on my way").unwrap();
        assert_eq!(
            f.server.inbox(alice.id()).last().map(String::as_str),
            Some("\u{a7}7(From *Console*): \u{a7}fon my way")
        );
    }

    #[test]
    fn test_reply_to_offline_player_fails() {
        let f = fixture();
        let alice = f.join("alice");
        let bob = f.join("bob");
        f.router.send_private(&alice, "bob", "hi").unwrap();

        if let Identity::Player(profile) = &bob {
            f.server.leave(profile.id);
        }
        f.server.clear();

        let err = f.router.reply(&alice, "still there?").unwrap_err();
        assert!(matches!(err, MessagingError::NoSuchTarget { .. }));
        assert!(f.server.take_deliveries().is_empty());
    }

    #[test]
    fn test_console_say_uses_template() {
        let f = fixture();
        f.router.say(&Identity::Console, "`gstay calm").unwrap();
        assert_eq!(
            f.server.broadcasts(),
            vec!["<\u{a7}c*Console\u{a7}f> `gstay calm"]
        );
    }

    #[test]
    fn test_apply_config_changes_templates() {
        let mut f = fixture();
        f.router.apply_config(&MessagingConfig {
            console_say_format: "[Server] %s".to_string(),
            broadcast_format: "`y%s".to_string(),
        });

        f.router.say(&Identity::Console, "hi").unwrap();
        f.router.broadcast("restart soon");
        assert_eq!(
            f.server.broadcasts(),
            vec!["[Server] hi".to_string(), "\u{a7}erestart soon".to_string()]
        );
    }
}
