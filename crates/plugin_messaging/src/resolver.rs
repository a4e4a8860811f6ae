//! Target resolution.
//!
//! Hosts only list who is online; matching rules live in the provided
//! methods of [`IdentityResolver`]:
//!
//! - `@name` matches one player by exact (case-insensitive) name
//! - `*frag` matches every player whose name contains `frag`
//! - anything else matches every player whose name starts with it
//! - `#console`, `*console*` and `!` name the console where allowed

use crate::error::MessagingError;
use crate::types::{Identity, PlayerProfile, SenderId};

const CONSOLE_SENTINELS: [&str; 3] = ["#console", "*console*", "!"];

/// Outcome of resolving a textual target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Identity),
    /// More than one player matched; carries their names.
    Ambiguous(Vec<String>),
    NotFound,
}

impl Resolution {
    /// Converts into the user-facing error for `query` on failure.
    pub fn into_result(self, query: &str) -> Result<Identity, MessagingError> {
        match self {
            Resolution::Found(identity) => Ok(identity),
            Resolution::Ambiguous(candidates) => Err(MessagingError::AmbiguousTarget {
                query: query.to_string(),
                candidates,
            }),
            Resolution::NotFound => Err(MessagingError::NoSuchTarget {
                query: query.to_string(),
            }),
        }
    }
}

pub trait IdentityResolver: Send + Sync {
    /// Players currently connected.
    fn online_players(&self) -> Vec<PlayerProfile>;

    /// Resolves a player or the console.
    fn resolve(&self, query: &str) -> Resolution {
        if is_console_sentinel(query) {
            return Resolution::Found(Identity::Console);
        }
        self.resolve_player(query)
    }

    /// Resolves exactly one online player.
    fn resolve_player(&self, query: &str) -> Resolution {
        let mut matched = match_players(&self.online_players(), query);
        match matched.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Found(Identity::Player(matched.remove(0))),
            _ => Resolution::Ambiguous(matched.into_iter().map(|p| p.name).collect()),
        }
    }

    /// Re-validates a stored sender; `None` if it is no longer online.
    fn lookup(&self, id: SenderId) -> Option<Identity> {
        match id {
            SenderId::Console => Some(Identity::Console),
            SenderId::Player(player_id) => self
                .online_players()
                .into_iter()
                .find(|p| p.id == player_id)
                .map(Identity::Player),
        }
    }
}

pub fn is_console_sentinel(query: &str) -> bool {
    CONSOLE_SENTINELS
        .iter()
        .any(|sentinel| query.eq_ignore_ascii_case(sentinel))
}

/// Applies the name matching rules to a player list.
pub fn match_players(players: &[PlayerProfile], filter: &str) -> Vec<PlayerProfile> {
    let filter = filter.to_lowercase();

    if let Some(exact) = filter.strip_prefix('@').filter(|rest| !rest.is_empty()) {
        return players
            .iter()
            .find(|p| p.name.to_lowercase() == exact)
            .cloned()
            .into_iter()
            .collect();
    }

    if let Some(fragment) = filter.strip_prefix('*').filter(|rest| !rest.is_empty()) {
        return players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(fragment))
            .cloned()
            .collect();
    }

    if filter.is_empty() {
        return Vec::new();
    }

    players
        .iter()
        .filter(|p| p.name.to_lowercase().starts_with(&filter))
        .cloned()
        .collect()
}
