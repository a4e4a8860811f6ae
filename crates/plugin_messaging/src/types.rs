//! Identity and per-sender session types.
//!
//! Everything that can send a message is an [`Identity`]: either a connected
//! player or the server console. Sessions and stored reply pointers are keyed
//! by the lighter [`SenderId`], so a stored pointer never keeps a stale
//! player handle alive.

use crate::color::ChatColor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name shown for the console in private messages, logs and `/me`.
pub const CONSOLE_NAME: &str = "*Console*";

/// Unique identifier for a player in the game world.
///
/// Wraps a UUID so player IDs cannot be confused with other IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from its string form.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key identifying a sender independently of whether it is still online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SenderId {
    Console,
    Player(PlayerId),
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderId::Console => f.write_str("console"),
            SenderId::Player(id) => write!(f, "player:{id}"),
        }
    }
}

/// A connected player as seen by the messaging plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    /// Login name, used for matching and plain-text output.
    pub name: String,
    /// Optional decorated name used in public chat lines.
    pub display_name: Option<String>,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Anything that can send or receive a message.
///
/// Two identities are equal when they refer to the same sender, regardless
/// of any profile details that may have changed in between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Identity {
    Console,
    Player(PlayerProfile),
}

impl Identity {
    pub fn id(&self) -> SenderId {
        match self {
            Identity::Console => SenderId::Console,
            Identity::Player(profile) => SenderId::Player(profile.id),
        }
    }

    /// Plain name of the sender.
    pub fn name(&self) -> &str {
        match self {
            Identity::Console => CONSOLE_NAME,
            Identity::Player(profile) => &profile.name,
        }
    }

    /// Display name followed by a color reset, for public chat lines.
    pub fn colored_name(&self) -> String {
        match self {
            Identity::Console => format!("{CONSOLE_NAME}{}", ChatColor::White),
            Identity::Player(profile) => format!(
                "{}{}",
                profile.display_name.as_deref().unwrap_or(&profile.name),
                ChatColor::White
            ),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Identity::Player(_))
    }

    pub fn as_player(&self) -> Option<&PlayerProfile> {
        match self {
            Identity::Player(profile) => Some(profile),
            Identity::Console => None,
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Identity {}

impl From<PlayerProfile> for Identity {
    fn from(profile: PlayerProfile) -> Self {
        Identity::Player(profile)
    }
}

/// Mutable per-sender state. Owned and lifecycle-managed by a
/// [`SessionStore`](crate::session::SessionStore); never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Set only by `/mute` and cleared by `/unmute`.
    pub muted: bool,
    /// `None` when present, `Some("")` when away without a reason.
    pub idle_status: Option<String>,
    /// Last sender this one explicitly messaged with `/msg`.
    pub last_recipient: Option<SenderId>,
    /// First sender that messaged this one. Written only while unset.
    pub pending_last_recipient: Option<SenderId>,
}

impl Session {
    pub fn is_away(&self) -> bool {
        self.idle_status.is_some()
    }

    /// Where `/reply` goes: an explicit recipient wins over the first
    /// incoming conversation.
    pub fn reply_target(&self) -> Option<SenderId> {
        self.last_recipient.or(self.pending_last_recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality_ignores_profile_changes() {
        let profile = PlayerProfile::new("Steve");
        let renamed = PlayerProfile {
            display_name: Some("Sir Steve".to_string()),
            ..profile.clone()
        };

        assert_eq!(Identity::Player(profile.clone()), Identity::Player(renamed));
        assert_ne!(Identity::Player(profile), Identity::Console);
    }

    #[test]
    fn test_console_name() {
        assert_eq!(Identity::Console.name(), "*Console*");
        assert_eq!(Identity::Console.id(), SenderId::Console);
    }

    #[test]
    fn test_colored_name_prefers_display_name() {
        let plain = Identity::Player(PlayerProfile::new("alex"));
        assert_eq!(plain.colored_name(), "alex\u{a7}f");

        let decorated = Identity::Player(PlayerProfile::new("alex").with_display_name("\u{a7}cAlex"));
        assert_eq!(decorated.colored_name(), "\u{a7}cAlex\u{a7}f");
    }

    #[test]
    fn test_reply_target_prefers_explicit_recipient() {
        let first = SenderId::Player(PlayerId::new());
        let explicit = SenderId::Player(PlayerId::new());

        let mut session = Session {
            pending_last_recipient: Some(first),
            ..Session::default()
        };
        assert_eq!(session.reply_target(), Some(first));

        session.last_recipient = Some(explicit);
        assert_eq!(session.reply_target(), Some(explicit));
    }

    #[test]
    fn test_player_id_parse_roundtrip() {
        let id = PlayerId::new();
        assert_eq!(PlayerId::from_str(&id.to_string()).ok(), Some(id));
        assert!(PlayerId::from_str("not-a-uuid").is_err());
    }
}
